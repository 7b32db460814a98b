//! Emotion analysis
//!
//! Extracts emotional signals from one turn via the keyword lexicon and
//! maintains the session's bounded emotion history. Intensity comes from
//! match counts; confidences are fixed constants from [`ScoringConfig`]
//! pending a real model upstream.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use nujmooz_config::{Lexicon, ScoringConfig};
use nujmooz_core::{
    EmotionPattern, EmotionSignal, EmotionalTrend, Intensity, Language, SessionContext, UserInput,
};

use crate::memory::SessionStore;

/// Free-form situational metadata attached to the analysis
///
/// Does not influence scoring; consumed downstream for prompt shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalContext {
    /// Language the turn was analyzed in
    pub language: Language,
    /// Region tag, fixed for the product's market
    pub region: String,
    /// Formality register tag
    pub formality: String,
}

impl EmotionalContext {
    fn new(language: Language) -> Self {
        Self {
            language,
            region: "gulf".to_string(),
            formality: "casual".to_string(),
        }
    }
}

/// Result of analyzing one turn for emotional state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    /// Strongest signal, or neutral when nothing matched
    pub primary: EmotionSignal,
    /// Remaining signals, confidence-discounted and capped
    pub secondary: Vec<EmotionSignal>,
    /// Most frequent emotion across the session's retained history
    pub dominant_emotion: Option<String>,
    /// Session trend (placeholder, always stable)
    pub trend: EmotionalTrend,
    /// Situational metadata
    pub context: EmotionalContext,
    /// True when this is the documented fallback after an internal failure
    #[serde(default)]
    pub degraded: bool,
}

impl EmotionAnalysis {
    /// The documented neutral fallback
    pub fn fallback(language: Language) -> Self {
        Self {
            primary: EmotionSignal::new("neutral", Intensity::Medium, 0.5),
            secondary: Vec::new(),
            dominant_emotion: None,
            trend: EmotionalTrend::Stable,
            context: EmotionalContext::new(language),
            degraded: true,
        }
    }
}

/// Extracts emotional signals and maintains per-session history
pub struct EmotionProcessor {
    lexicon: Arc<Lexicon>,
    scoring: ScoringConfig,
    store: Arc<SessionStore>,
    default_language: Language,
}

impl EmotionProcessor {
    pub fn new(
        lexicon: Arc<Lexicon>,
        scoring: ScoringConfig,
        store: Arc<SessionStore>,
        default_language: Language,
    ) -> Self {
        Self {
            lexicon,
            scoring,
            store,
            default_language,
        }
    }

    /// Analyze one turn. Total: never panics or propagates an error; any
    /// internal failure becomes [`EmotionAnalysis::fallback`].
    pub fn analyze(&self, input: &UserInput, context: &SessionContext) -> EmotionAnalysis {
        let language = input.language.unwrap_or(self.default_language);
        match self.try_analyze(input, context, language) {
            Ok(analysis) => analysis,
            Err(err) => {
                tracing::warn!(
                    session = %context.session_id,
                    error = %err,
                    "Emotion analysis failed, returning fallback"
                );
                EmotionAnalysis::fallback(language)
            }
        }
    }

    fn try_analyze(
        &self,
        input: &UserInput,
        context: &SessionContext,
        language: Language,
    ) -> Result<EmotionAnalysis> {
        if input.content.trim().is_empty() {
            bail!("empty input");
        }

        let text = input.content.to_lowercase();
        let words: HashSet<&str> = text.unicode_words().collect();

        let mut signals = Vec::new();
        for entry in &self.lexicon.emotions {
            let matched = entry
                .keywords
                .iter()
                .filter(|keyword| keyword_hits(&text, &words, keyword))
                .count();
            if matched == 0 {
                continue;
            }
            let intensity = match matched {
                1 => Intensity::Low,
                2 => Intensity::Medium,
                _ => Intensity::High,
            };
            signals.push(EmotionSignal::new(
                entry.emotion.clone(),
                intensity,
                self.scoring.emotion_keyword_confidence,
            ));
        }

        // Primary: highest confidence x intensity weight; ties keep lexicon
        // order because only a strictly greater score replaces the leader.
        let primary = signals
            .iter()
            .fold(None::<&EmotionSignal>, |best, signal| match best {
                Some(current) if current.rank_score() >= signal.rank_score() => Some(current),
                _ => Some(signal),
            })
            .cloned()
            .unwrap_or_else(EmotionSignal::neutral);

        let secondary = if self.scoring.enable_secondary_emotions {
            let mut rest: Vec<EmotionSignal> = signals
                .iter()
                .filter(|s| s.emotion != primary.emotion)
                .map(|s| {
                    EmotionSignal::new(
                        s.emotion.clone(),
                        s.intensity,
                        s.confidence * self.scoring.secondary_emotion_discount,
                    )
                })
                .collect();
            rest.sort_by(|a, b| {
                b.rank_score()
                    .partial_cmp(&a.rank_score())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            rest.truncate(self.scoring.max_secondary_emotions);
            rest
        } else {
            Vec::new()
        };

        let snippet: String = input.content.chars().take(48).collect();
        let (dominant_emotion, trend) =
            self.store.with_session(&context.session_id, |state| {
                state
                    .emotions
                    .push(EmotionPattern::new(signals.clone(), snippet));
                (state.emotions.dominant_emotion(), state.emotions.trend())
            });

        tracing::debug!(
            session = %context.session_id,
            primary = %primary.emotion,
            secondary = secondary.len(),
            "Emotion analyzed"
        );

        Ok(EmotionAnalysis {
            primary,
            secondary,
            dominant_emotion,
            trend,
            context: EmotionalContext::new(language),
            degraded: false,
        })
    }
}

fn keyword_hits(text: &str, words: &HashSet<&str>, keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.chars().count() > 3 {
        text.contains(keyword)
    } else {
        words.contains(keyword)
    }
}
