//! Conversation orchestration pipeline for Nujmooz
//!
//! Turns free-form bilingual chat into a structured project brief:
//! - Intent analysis: scores the service catalog against each turn and
//!   detects buying-intent signals
//! - Emotion analysis: keyword-driven signal extraction with a bounded
//!   per-session history
//! - Prompt composition: context-aware system prompts for the downstream
//!   model
//! - Question rendering: branching, conditionally-displayed brief questions
//! - Orchestration: one synchronous entry point per turn
//!
//! All analyzer entry points are total functions: internal failures become
//! documented fallback values, never propagated errors.

pub mod emotion;
pub mod intent;
pub mod memory;
pub mod orchestrator;
pub mod prompt;
pub mod questions;

pub use emotion::{EmotionAnalysis, EmotionProcessor, EmotionalContext};
pub use intent::{BuyingIntent, IntentAnalysis, IntentAnalyzer, ServiceMatch};
pub use memory::{FlowState, SessionState, SessionStore};
pub use orchestrator::{
    Orchestrator, OrchestratorConfig, ProcessingResult, ResultMetadata,
};
pub use prompt::{PromptManager, PromptRequest};
pub use questions::{
    FlowMetadata, QuestionRenderer, RenderedQuestion, ValidationRules,
};

use thiserror::Error;

/// Agent errors
///
/// Analysis itself never surfaces here; analyzers convert their failures to
/// fallback values at the component boundary. What remains is construction:
/// configuration and catalog/lexicon loading.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] nujmooz_config::ConfigError),

    #[error("Analysis error: {0}")]
    Analysis(String),
}
