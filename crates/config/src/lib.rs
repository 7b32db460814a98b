//! Configuration for the Nujmooz conversation engine
//!
//! Everything the pipeline treats as static data lives here:
//! - the service catalog (services, sub-services, question flows)
//! - the bilingual keyword lexicons (tags, buying intent, emotions)
//! - named scoring constants and prompt defaults
//! - layered application settings (file + `NUJMOOZ_` env vars)
//!
//! Compiled-in defaults ship for the catalog and lexicons; YAML files with
//! the same shape can replace either at startup.

pub mod catalog;
pub mod lexicon;
pub mod scoring;
pub mod settings;

pub use catalog::{
    ConditionalDisplay, Question, QuestionOption, QuestionType, QuestionValidation,
    ServiceCatalog, ServiceComplexity, ServiceDefinition, ShowWhen, SubService,
};
pub use lexicon::{BuyingLexicon, EmotionEntry, Lexicon, PhraseTiers};
pub use scoring::{PromptDefaults, ScoringConfig};
pub use settings::{load_settings, RuntimeEnvironment, Settings};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
