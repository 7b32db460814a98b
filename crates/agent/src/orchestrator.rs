//! Turn orchestration
//!
//! The composition root of the pipeline. One call per turn: intent and
//! emotion analysis (independent of each other, order-insensitive), prompt
//! composition, then question-flow handling when a service has been
//! selected. Everything runs synchronously; the returned prompt string is
//! the hand-off point to whatever model the caller talks to.
//!
//! Turns for the same session must not run concurrently; the caller
//! serializes them. Turns for different sessions are independent.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nujmooz_config::{
    Lexicon, PromptDefaults, ScoringConfig, ServiceCatalog, Settings,
};
use nujmooz_core::{Language, SessionContext, Turn, UserInput};

use crate::emotion::{EmotionAnalysis, EmotionProcessor};
use crate::intent::{IntentAnalysis, IntentAnalyzer};
use crate::memory::SessionStore;
use crate::prompt::{PromptManager, PromptRequest};
use crate::questions::{QuestionRenderer, RenderedQuestion};
use crate::AgentError;

/// Per-turn result metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// When the turn finished processing
    pub timestamp: DateTime<Utc>,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
    /// Language the turn was processed in
    pub language: Language,
    /// True when any analyzer fell back after an internal failure
    pub degraded: bool,
}

/// Everything the pipeline produced for one turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Composed system prompt for the downstream model
    pub prompt: String,
    /// Emotional state snapshot
    pub emotion: EmotionAnalysis,
    /// Service-match and buying-intent context
    pub intent: IntentAnalysis,
    /// Next brief question, when a flow is active and not exhausted
    pub next_question: Option<RenderedQuestion>,
    /// Timing and language metadata
    pub metadata: ResultMetadata,
}

/// Construction parameters for [`Orchestrator`]
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Session-store capacity before LRU eviction
    pub max_sessions: usize,
    /// Scoring constants shared by both analyzers
    pub scoring: ScoringConfig,
    /// Prompt generation defaults
    pub prompts: PromptDefaults,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1024,
            scoring: ScoringConfig::default(),
            prompts: PromptDefaults::default(),
        }
    }
}

/// Composition root: wires the analyzers, prompt manager and question
/// renderer around one shared session store
pub struct Orchestrator {
    store: Arc<SessionStore>,
    intent: IntentAnalyzer,
    emotion: EmotionProcessor,
    prompts: PromptManager,
    questions: QuestionRenderer,
    default_language: Language,
}

impl Orchestrator {
    /// Build the pipeline from a catalog, lexicon and config
    pub fn new(
        catalog: Arc<ServiceCatalog>,
        lexicon: Arc<Lexicon>,
        config: OrchestratorConfig,
    ) -> Self {
        let store = Arc::new(SessionStore::new(config.max_sessions));
        let default_language = config.prompts.default_language;

        Self {
            intent: IntentAnalyzer::new(
                catalog.clone(),
                lexicon.clone(),
                config.scoring.clone(),
                store.clone(),
            ),
            emotion: EmotionProcessor::new(
                lexicon,
                config.scoring.clone(),
                store.clone(),
                default_language,
            ),
            prompts: PromptManager::new(catalog.clone(), config.prompts),
            questions: QuestionRenderer::new(catalog, store.clone()),
            store,
            default_language,
        }
    }

    /// Build the pipeline from loaded [`Settings`], resolving catalog and
    /// lexicon overrides from disk when configured
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let catalog = match &settings.catalog_path {
            Some(path) => ServiceCatalog::load(path)?,
            None => ServiceCatalog::builtin(),
        };
        let lexicon = match &settings.lexicon_path {
            Some(path) => Lexicon::load(path)?,
            None => Lexicon::builtin(),
        };

        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(lexicon),
            OrchestratorConfig {
                max_sessions: settings.max_sessions,
                scoring: settings.scoring.clone(),
                prompts: settings.prompts.clone(),
            },
        ))
    }

    /// The shared session store (capacity checks, explicit removal)
    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Process one user turn
    ///
    /// Runs both analyzers, composes the prompt, starts the top service's
    /// question flow if none is active, and appends the turn to the session
    /// history. Never fails: analyzer errors surface as documented fallback
    /// values with `metadata.degraded` set.
    pub fn process_turn(
        &self,
        input: &UserInput,
        context: &mut SessionContext,
    ) -> ProcessingResult {
        let started = Instant::now();
        let language = input.language.unwrap_or(self.default_language);

        // Independent analyses; neither reads the other's output.
        let intent = self.intent.analyze(input, context);
        let emotion = self.emotion.analyze(input, context);

        let prompt = self.prompts.select_prompt(&PromptRequest {
            input,
            emotion: &emotion,
            intent: &intent,
            context,
        });

        if let Some(top) = intent.top_match() {
            if !self.questions.has_active_flow(&context.session_id) {
                self.questions
                    .start_flow(&context.session_id, &top.service_key);
            }
        }
        let next_question = self.questions.current_question(
            &context.session_id,
            context,
            Some(&emotion.primary),
            language,
        );

        context.push_turn(Turn::user(&input.content));

        let processing_time_ms = started.elapsed().as_millis() as u64;
        let degraded = intent.degraded || emotion.degraded;
        tracing::debug!(
            session = %context.session_id,
            elapsed_ms = processing_time_ms,
            degraded,
            has_question = next_question.is_some(),
            "Turn processed"
        );

        ProcessingResult {
            prompt,
            emotion,
            intent,
            next_question,
            metadata: ResultMetadata {
                timestamp: Utc::now(),
                processing_time_ms,
                language,
                degraded,
            },
        }
    }

    /// Record an answer to the current question and advance the flow
    pub fn record_answer(
        &self,
        context: &mut SessionContext,
        question_id: impl Into<String>,
        value: serde_json::Value,
    ) {
        context.record_answer(question_id, value);
        self.questions.advance(&context.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            Arc::new(ServiceCatalog::builtin()),
            Arc::new(Lexicon::builtin()),
            OrchestratorConfig::default(),
        )
    }

    #[test]
    fn test_turn_appends_history() {
        let orchestrator = orchestrator();
        let mut context = SessionContext::new("s-hist");

        orchestrator.process_turn(&UserInput::text("hello"), &mut context);
        assert_eq!(context.user_turn_count(), 1);
        orchestrator.process_turn(&UserInput::text("again"), &mut context);
        assert_eq!(context.user_turn_count(), 2);
    }

    #[test]
    fn test_flow_starts_on_match() {
        let orchestrator = orchestrator();
        let mut context = SessionContext::new("s-flow");

        let result = orchestrator.process_turn(&UserInput::text("أحتاج شعار لمتجري"), &mut context);
        assert_eq!(
            result.intent.top_match().map(|m| m.service_key.as_str()),
            Some("branding_identity")
        );
        let question = result.next_question.expect("flow started");
        assert_eq!(question.question.id, "logo_business_name");
    }

    #[test]
    fn test_no_question_without_match() {
        let orchestrator = orchestrator();
        let mut context = SessionContext::new("s-nomatch");

        let result = orchestrator.process_turn(&UserInput::text("hello there"), &mut context);
        assert!(result.intent.matched_services.is_empty());
        assert!(result.next_question.is_none());
        assert!(!result.metadata.degraded);
    }

    #[test]
    fn test_record_answer_advances_flow() {
        let orchestrator = orchestrator();
        let mut context = SessionContext::new("s-advance");

        let first = orchestrator
            .process_turn(&UserInput::text("I need a logo"), &mut context)
            .next_question
            .expect("first question");
        orchestrator.record_answer(&mut context, first.question.id, serde_json::json!("Nadra"));

        let second = orchestrator
            .process_turn(&UserInput::text("done, what else?"), &mut context)
            .next_question
            .expect("second question");
        assert_eq!(second.question.id, "logo_has_brand");
        assert_eq!(second.metadata.position, 2);
    }

    #[test]
    fn test_degraded_flag_on_empty_input() {
        let orchestrator = orchestrator();
        let mut context = SessionContext::new("s-degraded");

        let result = orchestrator.process_turn(&UserInput::text(""), &mut context);
        assert!(result.metadata.degraded);
        assert!(result.intent.degraded);
        assert!(result.emotion.degraded);
        // Still a fully-formed, user-presentable prompt
        assert!(!result.prompt.is_empty());
    }

    #[test]
    fn test_from_settings_builtin() {
        let settings = Settings::new();
        let orchestrator = Orchestrator::from_settings(&settings).unwrap();
        let mut context = SessionContext::new("s-settings");
        let result = orchestrator.process_turn(&UserInput::text("مرحبا"), &mut context);
        assert_eq!(result.metadata.language, Language::Ar);
    }
}
