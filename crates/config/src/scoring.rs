//! Scoring configuration
//!
//! Every tuning constant of the analyzers lives here as a named field with
//! a serde default, instead of as a literal at the use site. These are the
//! primary tuning surface of the product.

use serde::{Deserialize, Serialize};

use nujmooz_core::Language;

use crate::ConfigError;

/// Named scoring constants for intent and emotion analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the tag-match score in the confidence blend
    #[serde(default = "default_base_weight")]
    pub base_weight: f32,
    /// Weight of the contextual score in the confidence blend
    #[serde(default = "default_context_weight")]
    pub context_weight: f32,
    /// Minimum confidence for a service to be reported as a match
    #[serde(default = "default_min_service_confidence")]
    pub min_service_confidence: f32,
    /// Maximum number of service matches returned per turn
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
    /// Contextual bonus when the service already appeared this session
    #[serde(default = "default_prior_service_bonus")]
    pub prior_service_bonus: f32,
    /// Contextual bonus for the generic service during discovery
    #[serde(default = "default_discovery_generic_bonus")]
    pub discovery_generic_bonus: f32,
    /// Confidence assigned to each direct buying signal
    #[serde(default = "default_direct_signal_confidence")]
    pub direct_signal_confidence: f32,
    /// Confidence assigned to each indirect buying signal
    #[serde(default = "default_indirect_signal_confidence")]
    pub indirect_signal_confidence: f32,
    /// Aggregate confidence reported when no signal matched
    #[serde(default = "default_no_signal_confidence")]
    pub no_signal_confidence: f32,
    /// Confidence assigned to each emotion keyword signal
    #[serde(default = "default_emotion_keyword_confidence")]
    pub emotion_keyword_confidence: f32,
    /// Whether secondary emotions are reported at all
    #[serde(default = "default_enable_secondary_emotions")]
    pub enable_secondary_emotions: bool,
    /// Confidence discount applied to secondary emotions
    #[serde(default = "default_secondary_emotion_discount")]
    pub secondary_emotion_discount: f32,
    /// Cap on reported secondary emotions
    #[serde(default = "default_max_secondary_emotions")]
    pub max_secondary_emotions: usize,
}

fn default_base_weight() -> f32 {
    0.7
}
fn default_context_weight() -> f32 {
    0.3
}
fn default_min_service_confidence() -> f32 {
    0.6
}
fn default_max_matches() -> usize {
    3
}
fn default_prior_service_bonus() -> f32 {
    0.2
}
fn default_discovery_generic_bonus() -> f32 {
    0.3
}
fn default_direct_signal_confidence() -> f32 {
    0.8
}
fn default_indirect_signal_confidence() -> f32 {
    0.6
}
fn default_no_signal_confidence() -> f32 {
    0.5
}
fn default_emotion_keyword_confidence() -> f32 {
    0.8
}
fn default_enable_secondary_emotions() -> bool {
    true
}
fn default_secondary_emotion_discount() -> f32 {
    0.8
}
fn default_max_secondary_emotions() -> usize {
    2
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_weight: default_base_weight(),
            context_weight: default_context_weight(),
            min_service_confidence: default_min_service_confidence(),
            max_matches: default_max_matches(),
            prior_service_bonus: default_prior_service_bonus(),
            discovery_generic_bonus: default_discovery_generic_bonus(),
            direct_signal_confidence: default_direct_signal_confidence(),
            indirect_signal_confidence: default_indirect_signal_confidence(),
            no_signal_confidence: default_no_signal_confidence(),
            emotion_keyword_confidence: default_emotion_keyword_confidence(),
            enable_secondary_emotions: default_enable_secondary_emotions(),
            secondary_emotion_discount: default_secondary_emotion_discount(),
            max_secondary_emotions: default_max_secondary_emotions(),
        }
    }
}

impl ScoringConfig {
    /// Validate value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("scoring.base_weight", self.base_weight),
            ("scoring.context_weight", self.context_weight),
            (
                "scoring.min_service_confidence",
                self.min_service_confidence,
            ),
            ("scoring.prior_service_bonus", self.prior_service_bonus),
            (
                "scoring.discovery_generic_bonus",
                self.discovery_generic_bonus,
            ),
            (
                "scoring.direct_signal_confidence",
                self.direct_signal_confidence,
            ),
            (
                "scoring.indirect_signal_confidence",
                self.indirect_signal_confidence,
            ),
            ("scoring.no_signal_confidence", self.no_signal_confidence),
            (
                "scoring.emotion_keyword_confidence",
                self.emotion_keyword_confidence,
            ),
            (
                "scoring.secondary_emotion_discount",
                self.secondary_emotion_discount,
            ),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {value}"),
                });
            }
        }

        if self.max_matches == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scoring.max_matches".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Advisory generation parameters attached to composed prompts
///
/// The core never enforces these; they travel with the prompt so the caller
/// can pass them to the downstream model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefaults {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub default_language: Language,
    #[serde(default = "default_enable_memory")]
    pub enable_memory: bool,
}

fn default_max_tokens() -> u32 {
    2000
}
fn default_temperature() -> f32 {
    0.7
}
fn default_enable_memory() -> bool {
    true
}

impl Default for PromptDefaults {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            default_language: Language::default(),
            enable_memory: default_enable_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.base_weight, 0.7);
        assert_eq!(scoring.context_weight, 0.3);
        assert_eq!(scoring.min_service_confidence, 0.6);
        assert_eq!(scoring.max_matches, 3);
        assert!(scoring.validate().is_ok());

        let prompts = PromptDefaults::default();
        assert_eq!(prompts.max_tokens, 2000);
        assert_eq!(prompts.default_language, Language::Ar);
        assert!(prompts.enable_memory);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let scoring = ScoringConfig {
            base_weight: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            scoring.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let scoring = ScoringConfig {
            max_matches: 0,
            ..Default::default()
        };
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let scoring: ScoringConfig = serde_yaml::from_str("base_weight: 0.8").unwrap();
        assert_eq!(scoring.base_weight, 0.8);
        assert_eq!(scoring.context_weight, 0.3);
    }
}
