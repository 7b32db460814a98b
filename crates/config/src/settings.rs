//! Application settings
//!
//! Layered configuration: optional file, then environment variables with
//! the `NUJMOOZ_` prefix (`NUJMOOZ_MAX_SESSIONS=2048`,
//! `NUJMOOZ_SCORING__BASE_WEIGHT=0.8`).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use nujmooz_core::Language;

use crate::{ConfigError, PromptDefaults, ScoringConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode, relaxed validation
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode, all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Runtime environment
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Default conversation language when the input declares none
    #[serde(default)]
    pub language: Language,

    /// Maximum sessions retained in memory before LRU eviction
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Scoring constants
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Prompt generation defaults
    #[serde(default)]
    pub prompts: PromptDefaults,

    /// Optional path to a YAML service catalog replacing the builtin
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Optional path to a YAML lexicon replacing the builtin
    #[serde(default)]
    pub lexicon_path: Option<String>,
}

fn default_max_sessions() -> usize {
    1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            language: Language::default(),
            max_sessions: default_max_sessions(),
            scoring: ScoringConfig::default(),
            prompts: PromptDefaults::default(),
            catalog_path: None,
            lexicon_path: None,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;

        if self.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.prompts.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "prompts.temperature".to_string(),
                message: format!(
                    "Must be between 0.0 and 2.0, got {}",
                    self.prompts.temperature
                ),
            });
        }

        Ok(())
    }
}

/// Load settings from an optional file plus `NUJMOOZ_` environment variables
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(Environment::with_prefix("NUJMOOZ").separator("__"))
        .build()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    let settings: Settings = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    settings.validate()?;
    tracing::info!(
        environment = ?settings.environment,
        max_sessions = settings.max_sessions,
        "Settings loaded"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings_valid() {
        let settings = Settings::new();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_sessions, 1024);
        assert_eq!(settings.language, Language::Ar);
    }

    #[test]
    fn test_validate_rejects_zero_sessions() {
        let settings = Settings {
            max_sessions: 0,
            ..Settings::new()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scoring() {
        let mut settings = Settings::new();
        settings.scoring.min_service_confidence = -0.1;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "environment: production").unwrap();
        writeln!(file, "language: en").unwrap();
        writeln!(file, "max_sessions: 64").unwrap();
        writeln!(file, "scoring:").unwrap();
        writeln!(file, "  base_weight: 0.6").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.language, Language::En);
        assert_eq!(settings.max_sessions, 64);
        assert_eq!(settings.scoring.base_weight, 0.6);
        // Untouched fields keep defaults
        assert_eq!(settings.scoring.context_weight, 0.3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_settings(Some(Path::new("/nonexistent/settings.yaml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
