//! Question flow rendering
//!
//! Walks a service's branching question flow one question at a time. The
//! only persistent flow state is the per-session cursor held in the
//! [`SessionStore`]; everything else (visibility, totals, validation) is
//! recomputed on demand against the current answers.
//!
//! States: no flow, active flow (cursor), exhausted flow. `start_flow`
//! moves any state to an active flow at cursor 0. `current_question` pins
//! the cursor to the first visible question at or after it; advancing past
//! an answered question is the caller's move, via [`QuestionRenderer::advance`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use nujmooz_config::{Question, QuestionType, ServiceCatalog};
use nujmooz_core::{EmotionSignal, Language, SessionContext};

use crate::memory::{FlowState, SessionStore};

static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid placeholder regex"));

/// Validation rules after merging declared bounds with type-implied rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Whether an answer is mandatory
    pub required: bool,
    /// Allowed values (choice questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<String>>,
    /// Allowed values per element (multi-choice questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub each_one_of: Option<Vec<String>>,
    /// Minimum numeric value (scale questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value (scale questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Minimum text length (text questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum text length (text questions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Where the flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMetadata {
    /// 1-based position among currently visible questions
    pub position: usize,
    /// Count of currently visible questions. Shrinks as answers rule out
    /// branches; that is observable, intended behavior.
    pub total: usize,
    /// Estimated minutes to finish the flow from here
    pub estimated_minutes_left: u32,
}

/// A question ready for display: localized, substituted, validated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedQuestion {
    /// The underlying catalog question
    pub question: Question,
    /// Localized prompt with `{{variable}}` placeholders resolved
    pub text: String,
    /// Merged validation rules
    pub validation: ValidationRules,
    /// Flow progress metadata
    pub metadata: FlowMetadata,
}

/// Renders the next question of a service's flow
pub struct QuestionRenderer {
    catalog: Arc<ServiceCatalog>,
    store: Arc<SessionStore>,
}

impl QuestionRenderer {
    pub fn new(catalog: Arc<ServiceCatalog>, store: Arc<SessionStore>) -> Self {
        Self { catalog, store }
    }

    /// Begin (or restart) the flow for a service
    ///
    /// Returns false when the service is unknown or has no questions; the
    /// session's flow state is left untouched in that case.
    pub fn start_flow(&self, session_id: &str, service_key: &str) -> bool {
        let has_questions = self
            .catalog
            .get(service_key)
            .map(|s| s.question_count() > 0)
            .unwrap_or(false);
        if !has_questions {
            tracing::debug!(service = %service_key, "No question flow to start");
            return false;
        }

        self.store.with_session(session_id, |state| {
            state.flow = Some(FlowState::new(service_key));
        });
        tracing::debug!(session = %session_id, service = %service_key, "Flow started");
        true
    }

    /// Whether the session has a flow that can still produce questions
    pub fn has_active_flow(&self, session_id: &str) -> bool {
        self.store.with_session(session_id, |state| {
            state.flow.as_ref().map(|f| !f.exhausted).unwrap_or(false)
        })
    }

    /// Move past the currently pinned question
    ///
    /// Called after an answer is recorded; `current_question` alone never
    /// advances.
    pub fn advance(&self, session_id: &str) {
        self.store.with_session(session_id, |state| {
            if let Some(flow) = state.flow.as_mut() {
                if !flow.exhausted {
                    flow.cursor += 1;
                }
            }
        });
    }

    /// The next question of the active flow, or None once exhausted
    ///
    /// Scans forward from the stored cursor for the first question whose
    /// conditional-display rule passes against the recorded answers, pins
    /// the cursor there and renders it. Finding none moves the flow to its
    /// terminal exhausted state.
    pub fn current_question(
        &self,
        session_id: &str,
        context: &SessionContext,
        emotion: Option<&EmotionSignal>,
        language: Language,
    ) -> Option<RenderedQuestion> {
        let (service_key, cursor) = self.store.with_session(session_id, |state| {
            state
                .flow
                .as_ref()
                .filter(|flow| !flow.exhausted)
                .map(|flow| (flow.service_key.clone(), flow.cursor))
        })?;

        let service = self.catalog.get(&service_key)?;
        let questions: Vec<&Question> = service.questions().collect();

        let visible = |question: &Question| {
            question
                .conditional_display
                .as_ref()
                .map(|rule| rule.is_satisfied(&context.answers))
                .unwrap_or(true)
        };

        let pinned = questions
            .iter()
            .enumerate()
            .skip(cursor)
            .find(|(_, q)| visible(q))
            .map(|(idx, _)| idx);

        let Some(pinned) = pinned else {
            self.store.with_session(session_id, |state| {
                if let Some(flow) = state.flow.as_mut() {
                    flow.exhausted = true;
                }
            });
            tracing::debug!(session = %session_id, service = %service_key, "Flow exhausted");
            return None;
        };

        self.store.with_session(session_id, |state| {
            if let Some(flow) = state.flow.as_mut() {
                flow.cursor = pinned;
            }
        });

        let question = questions[pinned];

        let visible_indices: Vec<usize> = questions
            .iter()
            .enumerate()
            .filter(|(_, q)| visible(q))
            .map(|(idx, _)| idx)
            .collect();
        let position = visible_indices
            .iter()
            .position(|&idx| idx == pinned)
            .map(|p| p + 1)
            .unwrap_or(1);

        let question_count = questions.len();
        let remaining = 1.0 - pinned as f32 / question_count as f32;
        let estimated_minutes_left =
            (service.estimated_minutes() as f32 * remaining).ceil() as u32;

        Some(RenderedQuestion {
            question: question.clone(),
            text: self.render_text(question, context, emotion, language),
            validation: merge_validation(question),
            metadata: FlowMetadata {
                position,
                total: visible_indices.len(),
                estimated_minutes_left,
            },
        })
    }

    /// Localize the prompt and resolve `{{emotion}}` plus any `{{answer}}`
    /// placeholder; unknown tokens pass through untouched.
    fn render_text(
        &self,
        question: &Question,
        context: &SessionContext,
        emotion: Option<&EmotionSignal>,
        language: Language,
    ) -> String {
        let template = question.prompt.get(language);
        VAR_PATTERN
            .replace_all(template, |caps: &Captures<'_>| {
                let key = &caps[1];
                if key == "emotion" {
                    return emotion
                        .map(|signal| signal.emotion.clone())
                        .unwrap_or_else(|| "neutral".to_string());
                }
                match context.answers.get(key) {
                    Some(answer) => answer_display(answer),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Human-readable form of a recorded answer
fn answer_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(answer_display)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Merge declared validation with rules implied by the question type
fn merge_validation(question: &Question) -> ValidationRules {
    let declared = question.validation.clone().unwrap_or_default();
    let mut rules = ValidationRules {
        required: declared.required,
        ..Default::default()
    };

    let option_values =
        || -> Vec<String> { question.options.iter().map(|o| o.value.clone()).collect() };

    match question.question_type {
        QuestionType::Text => {
            rules.min_length = declared.min_length;
            rules.max_length = declared.max_length;
        }
        QuestionType::Choice => {
            rules.one_of = Some(option_values());
        }
        QuestionType::MultiChoice => {
            rules.each_one_of = Some(option_values());
        }
        QuestionType::Scale => {
            rules.min = declared.min;
            rules.max = declared.max;
        }
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> (QuestionRenderer, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(16));
        (
            QuestionRenderer::new(Arc::new(ServiceCatalog::builtin()), store.clone()),
            store,
        )
    }

    #[test]
    fn test_start_flow_unknown_service() {
        let (renderer, _) = renderer();
        assert!(!renderer.start_flow("s-1", "no_such_service"));
        assert!(!renderer.has_active_flow("s-1"));
    }

    #[test]
    fn test_first_question() {
        let (renderer, _) = renderer();
        let context = SessionContext::new("s-first");
        assert!(renderer.start_flow("s-first", "branding_identity"));

        let rendered = renderer
            .current_question("s-first", &context, None, Language::En)
            .expect("a question");
        assert_eq!(rendered.question.id, "logo_business_name");
        assert_eq!(rendered.metadata.position, 1);
        assert_eq!(rendered.metadata.total, 7);
        assert!(rendered.validation.required);
        // Full flow ahead: the whole estimate remains
        assert_eq!(rendered.metadata.estimated_minutes_left, 9);
    }

    #[test]
    fn test_pinned_without_advance() {
        let (renderer, _) = renderer();
        let context = SessionContext::new("s-pin");
        renderer.start_flow("s-pin", "branding_identity");

        let first = renderer
            .current_question("s-pin", &context, None, Language::En)
            .unwrap();
        let again = renderer
            .current_question("s-pin", &context, None, Language::En)
            .unwrap();
        assert_eq!(first.question.id, again.question.id);
    }

    #[test]
    fn test_conditional_branch_skipped() {
        let (renderer, _) = renderer();
        let mut context = SessionContext::new("s-branch");
        renderer.start_flow("s-branch", "branding_identity");

        // Answer "no": the assets question disappears and totals shrink.
        context.record_answer("logo_has_brand", serde_json::json!("no"));
        renderer.advance("s-branch"); // past business name
        renderer.advance("s-branch"); // past has_brand

        let next = renderer
            .current_question("s-branch", &context, None, Language::En)
            .unwrap();
        assert_eq!(next.question.id, "logo_style");
        assert_eq!(next.metadata.total, 6);
    }

    #[test]
    fn test_conditional_branch_taken() {
        let (renderer, _) = renderer();
        let mut context = SessionContext::new("s-branch-yes");
        renderer.start_flow("s-branch-yes", "branding_identity");

        context.record_answer("logo_has_brand", serde_json::json!("yes"));
        renderer.advance("s-branch-yes");
        renderer.advance("s-branch-yes");

        let next = renderer
            .current_question("s-branch-yes", &context, None, Language::En)
            .unwrap();
        assert_eq!(next.question.id, "logo_existing_assets");
        assert_eq!(next.metadata.total, 7);
    }

    #[test]
    fn test_answer_substitution() {
        let (renderer, _) = renderer();
        let mut context = SessionContext::new("s-subst");
        renderer.start_flow("s-subst", "branding_identity");
        context.record_answer("logo_business_name", serde_json::json!("Nadra Cafe"));
        context.record_answer("logo_has_brand", serde_json::json!("no"));

        for _ in 0..2 {
            renderer.advance("s-subst");
        }
        let styled = renderer
            .current_question("s-subst", &context, None, Language::En)
            .unwrap();
        assert_eq!(styled.question.id, "logo_style");
        assert_eq!(styled.text, "Which style suits Nadra Cafe?");
        assert_eq!(
            styled.validation.one_of.as_deref(),
            Some(["minimal".to_string(), "classic".to_string(), "playful".to_string()].as_slice())
        );
    }

    #[test]
    fn test_flow_exhaustion() {
        let (renderer, _) = renderer();
        let context = SessionContext::new("s-done");
        renderer.start_flow("s-done", "branding_identity");
        let total = ServiceCatalog::builtin()
            .get("branding_identity")
            .unwrap()
            .question_count();

        let mut served = 0;
        let mut positions = Vec::new();
        while let Some(q) = renderer.current_question("s-done", &context, None, Language::En) {
            positions.push(q.metadata.position);
            served += 1;
            renderer.advance("s-done");
            assert!(served <= total, "flow did not terminate");
        }
        assert_eq!(served, total);
        // Positions never go backwards
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        // Terminal state persists
        assert!(renderer
            .current_question("s-done", &context, None, Language::En)
            .is_none());
        assert!(!renderer.has_active_flow("s-done"));
    }

    #[test]
    fn test_restart_after_exhaustion() {
        let (renderer, _) = renderer();
        let context = SessionContext::new("s-restart");
        renderer.start_flow("s-restart", "social_media");
        while renderer
            .current_question("s-restart", &context, None, Language::En)
            .is_some()
        {
            renderer.advance("s-restart");
        }

        assert!(renderer.start_flow("s-restart", "social_media"));
        let first = renderer
            .current_question("s-restart", &context, None, Language::En)
            .unwrap();
        assert_eq!(first.metadata.position, 1);
    }

    #[test]
    fn test_scale_validation_merged() {
        let (renderer, _) = renderer();
        let context = SessionContext::new("s-scale");
        renderer.start_flow("s-scale", "ui_ux_design");
        renderer.advance("s-scale"); // past site goal

        let pages = renderer
            .current_question("s-scale", &context, None, Language::En)
            .unwrap();
        assert_eq!(pages.question.id, "site_pages");
        assert_eq!(pages.validation.min, Some(1.0));
        assert_eq!(pages.validation.max, Some(20.0));
    }

    #[test]
    fn test_emotion_placeholder_default() {
        let (renderer, _store) = renderer();
        let context = SessionContext::new("s-emotion");
        renderer.start_flow("s-emotion", "branding_identity");

        let rendered = renderer
            .current_question("s-emotion", &context, None, Language::Ar)
            .unwrap();
        // No placeholder in this prompt; text is the plain localized form.
        assert_eq!(rendered.text, "ما اسم مشروعك أو متجرك؟");
    }
}
