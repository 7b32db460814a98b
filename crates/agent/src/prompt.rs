//! Prompt composition
//!
//! Builds the system prompt handed to the downstream language model. A
//! strict pipeline: service base prompt (precomputed per service at
//! startup), emotional adjustment, service focus line, then `{{variable}}`
//! substitution. The manager itself never calls a model.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use nujmooz_config::{PromptDefaults, ServiceCatalog};
use nujmooz_core::{Language, Localized, SessionContext, UserInput};

use crate::emotion::EmotionAnalysis;
use crate::intent::IntentAnalysis;

/// `{{variable}}` placeholder, optional inner whitespace
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid placeholder regex"));

/// Everything the manager needs to compose one prompt
pub struct PromptRequest<'a> {
    pub input: &'a UserInput,
    pub emotion: &'a EmotionAnalysis,
    pub intent: &'a IntentAnalysis,
    pub context: &'a SessionContext,
}

/// Composes system prompts from catalog and per-turn analyses
pub struct PromptManager {
    defaults: PromptDefaults,
    /// Per-service base prompts, generated once at construction
    base_prompts: HashMap<String, Localized>,
    greeting: Localized,
    empathy: Localized,
    enthusiasm: Localized,
    focus: Localized,
    apology: Localized,
}

impl PromptManager {
    pub fn new(catalog: Arc<ServiceCatalog>, defaults: PromptDefaults) -> Self {
        let base_prompts = catalog
            .iter()
            .map(|service| {
                let ar_subs: Vec<String> = service
                    .sub_services
                    .iter()
                    .map(|s| format!("- {}", s.label.ar))
                    .collect();
                let en_subs: Vec<String> = service
                    .sub_services
                    .iter()
                    .map(|s| format!("- {}", s.label.en))
                    .collect();
                let prompt = Localized::new(
                    format!(
                        "أنا متخصص في {} لدى نجموز. أساعدك في:\n{}\nالنبرة: {}.",
                        service.label.ar,
                        ar_subs.join("\n"),
                        service.tone.ar
                    ),
                    format!(
                        "I'm a Nujmooz specialist in {}. I can help you with:\n{}\nTone: {}.",
                        service.label.en,
                        en_subs.join("\n"),
                        service.tone.en
                    ),
                );
                (service.key.clone(), prompt)
            })
            .collect();

        Self {
            defaults,
            base_prompts,
            greeting: Localized::new(
                "مرحباً بك في نجموز! أخبرني عن مشروعك وسنجد الخدمة المناسبة لك.",
                "Welcome to Nujmooz! Tell me about your project and we'll find the right service for you.",
            ),
            empathy: Localized::new(
                "أفهم أن الأمر كان محبطاً، وأنا هنا لمساعدتك خطوة بخطوة.",
                "I understand this has been frustrating, and I'm here to help you step by step.",
            ),
            enthusiasm: Localized::new(
                "حماسك يسعدنا! لنبدأ فوراً.",
                "Love the enthusiasm! Let's dive right in.",
            ),
            focus: Localized::new(
                "بناءً على احتياجك، لنركّز على {{service}}.",
                "Based on your needs, let's focus on {{service}}.",
            ),
            apology: Localized::new(
                "عذراً، حدث خلل بسيط من جهتنا. أخبرني عن مشروعك وسأساعدك من جديد.",
                "Apologies, something went wrong on our side. Tell me about your project and I'll pick it up from here.",
            ),
        }
    }

    /// Advisory generation defaults that travel with the prompt
    pub fn defaults(&self) -> &PromptDefaults {
        &self.defaults
    }

    /// Compose the prompt for one turn. Total: never panics or propagates an
    /// error; any internal failure becomes the localized apology prompt.
    pub fn select_prompt(&self, request: &PromptRequest<'_>) -> String {
        let language = request
            .input
            .language
            .unwrap_or(self.defaults.default_language);
        match self.try_select(request, language) {
            Ok(prompt) => prompt,
            Err(err) => {
                tracing::warn!(
                    session = %request.context.session_id,
                    error = %err,
                    "Prompt composition failed, returning fallback"
                );
                self.apology.get(language).to_string()
            }
        }
    }

    fn try_select(&self, request: &PromptRequest<'_>, language: Language) -> Result<String> {
        let top = request.intent.top_match();

        // Stage 1: base prompt
        let mut prompt = match top.and_then(|m| self.base_prompts.get(&m.service_key)) {
            Some(base) => base.get(language).to_string(),
            None => self.greeting.get(language).to_string(),
        };

        // Stage 2: emotional adjustment, first match wins, frustration
        // checked before excitement
        match request.emotion.primary.emotion.as_str() {
            "frustrated" => {
                prompt = format!("{}\n\n{}", self.empathy.get(language), prompt);
            }
            "excited" => {
                prompt = format!("{}\n\n{}", self.enthusiasm.get(language), prompt);
            }
            _ => {}
        }

        // Stage 3: service focus line
        if top.is_some() {
            prompt = format!("{}\n\n{}", prompt, self.focus.get(language));
        }

        // Stage 4: variable substitution
        Ok(self.substitute(&prompt, request))
    }

    /// Replace `{{service}}` (top match's key) and `{{emotion}}`; unknown
    /// tokens pass through untouched.
    fn substitute(&self, text: &str, request: &PromptRequest<'_>) -> String {
        let service_key = request.intent.top_match().map(|m| m.service_key.clone());

        VAR_PATTERN
            .replace_all(text, |caps: &Captures<'_>| match &caps[1] {
                "service" => service_key
                    .clone()
                    .unwrap_or_else(|| caps[0].to_string()),
                "emotion" => request.emotion.primary.emotion.clone(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SessionStore;
    use crate::{EmotionProcessor, IntentAnalyzer};
    use nujmooz_config::{Lexicon, ScoringConfig};

    fn pipeline() -> (IntentAnalyzer, EmotionProcessor, PromptManager) {
        let catalog = Arc::new(ServiceCatalog::builtin());
        let lexicon = Arc::new(Lexicon::builtin());
        let store = Arc::new(SessionStore::new(16));
        (
            IntentAnalyzer::new(
                catalog.clone(),
                lexicon.clone(),
                ScoringConfig::default(),
                store.clone(),
            ),
            EmotionProcessor::new(lexicon, ScoringConfig::default(), store, Language::Ar),
            PromptManager::new(catalog, PromptDefaults::default()),
        )
    }

    fn compose(text: &str, language: Language) -> String {
        let (intent, emotion, prompts) = pipeline();
        let context = SessionContext::new("s-prompt");
        let input = UserInput::text(text).with_language(language);
        let intent_analysis = intent.analyze(&input, &context);
        let emotion_analysis = emotion.analyze(&input, &context);
        prompts.select_prompt(&PromptRequest {
            input: &input,
            emotion: &emotion_analysis,
            intent: &intent_analysis,
            context: &context,
        })
    }

    #[test]
    fn test_service_base_prompt() {
        let prompt = compose("I need a logo for my brand", Language::En);
        assert!(prompt.contains("specialist in Branding & Identity"));
        assert!(prompt.contains("- Logo design"));
        // Focus line substituted with the service key
        assert!(prompt.contains("let's focus on branding_identity"));
        assert!(!prompt.contains("{{service}}"));
    }

    #[test]
    fn test_generic_greeting_without_match() {
        let prompt = compose("hello there", Language::En);
        assert!(prompt.contains("Welcome to Nujmooz"));
        assert!(!prompt.contains("let's focus on"));
    }

    #[test]
    fn test_empathy_before_service_line() {
        let prompt = compose(
            "I'm frustrated, my logo is not working at all",
            Language::En,
        );
        let empathy_at = prompt
            .find("I understand this has been frustrating")
            .expect("empathy sentence present");
        let focus_at = prompt
            .find("let's focus on")
            .expect("focus sentence present");
        assert!(empathy_at < focus_at);
    }

    #[test]
    fn test_enthusiasm_adjustment() {
        let prompt = compose("I'm excited about a new logo", Language::En);
        assert!(prompt.contains("Love the enthusiasm"));
    }

    #[test]
    fn test_arabic_output() {
        let prompt = compose("أحتاج شعار لمتجري", Language::Ar);
        assert!(prompt.contains("أنا متخصص في"));
        assert!(prompt.contains("نجموز"));
    }

    #[test]
    fn test_unknown_token_passes_through() {
        let (_, _, prompts) = pipeline();
        let context = SessionContext::new("s-token");
        let input = UserInput::text("hi").with_language(Language::En);
        let intent_analysis = IntentAnalysis::fallback(context.phase());
        let emotion_analysis = EmotionAnalysis::fallback(Language::En);
        let out = prompts.substitute(
            "Keep {{unknown_thing}} and fill {{emotion}}",
            &PromptRequest {
                input: &input,
                emotion: &emotion_analysis,
                intent: &intent_analysis,
                context: &context,
            },
        );
        assert_eq!(out, "Keep {{unknown_thing}} and fill neutral");
    }
}
