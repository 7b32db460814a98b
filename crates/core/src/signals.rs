//! Signal types: emotional signals, buying-intent signals and the bounded
//! per-session emotion history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// How many emotion patterns a session retains. Oldest entries evicted first.
pub const EMOTION_HISTORY_CAPACITY: usize = 10;

/// Signal intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    /// Weight used when ranking emotional signals
    pub fn rank_weight(&self) -> f32 {
        match self {
            Intensity::High => 3.0,
            Intensity::Medium => 2.0,
            Intensity::Low => 1.0,
        }
    }

    /// Weight used when aggregating buying-intent signals
    pub fn score_weight(&self) -> f32 {
        match self {
            Intensity::High => 1.0,
            Intensity::Medium => 0.6,
            Intensity::Low => 0.3,
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intensity::Low => write!(f, "low"),
            Intensity::Medium => write!(f, "medium"),
            Intensity::High => write!(f, "high"),
        }
    }
}

/// A detected emotional signal
///
/// The emotion name is an open string (the lexicon is extensible), unlike
/// [`Intensity`] which is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSignal {
    /// Emotion name, e.g. "frustrated"
    pub emotion: String,
    /// Detected intensity
    pub intensity: Intensity,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl EmotionSignal {
    /// Create a new signal, clamping confidence into range
    pub fn new(emotion: impl Into<String>, intensity: Intensity, confidence: f32) -> Self {
        Self {
            emotion: emotion.into(),
            intensity,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The neutral signal used when nothing was detected
    pub fn neutral() -> Self {
        Self::new("neutral", Intensity::Medium, 0.7)
    }

    /// Ranking score: confidence weighted by intensity
    pub fn rank_score(&self) -> f32 {
        self.confidence * self.intensity.rank_weight()
    }
}

/// Phrasing tier of a buying-intent signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyingSignalKind {
    /// Explicit ask ("I want to order", "أريد أطلب")
    Direct,
    /// Implicit interest ("how much does it cost", "كم السعر")
    Indirect,
}

impl BuyingSignalKind {
    /// Weight used when aggregating the buying-intent score
    pub fn score_weight(&self) -> f32 {
        match self {
            BuyingSignalKind::Direct => 1.0,
            BuyingSignalKind::Indirect => 0.7,
        }
    }
}

/// A detected buying-intent signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyingSignal {
    /// Direct or indirect phrasing
    pub kind: BuyingSignalKind,
    /// Detected intensity
    pub intensity: Intensity,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl BuyingSignal {
    pub fn new(kind: BuyingSignalKind, intensity: Intensity, confidence: f32) -> Self {
        Self {
            kind,
            intensity,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Contribution of this signal to the aggregate score
    pub fn weighted_score(&self) -> f32 {
        self.intensity.score_weight() * self.kind.score_weight() * self.confidence
    }
}

/// One turn's worth of emotional signals, as retained in session history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionPattern {
    /// Signals extracted from the turn
    pub signals: Vec<EmotionSignal>,
    /// When the pattern was recorded
    pub timestamp: DateTime<Utc>,
    /// Short free-form context (e.g. a prefix of the input)
    pub context: String,
}

impl EmotionPattern {
    pub fn new(signals: Vec<EmotionSignal>, context: impl Into<String>) -> Self {
        Self {
            signals,
            timestamp: Utc::now(),
            context: context.into(),
        }
    }
}

/// Direction the session's emotional state is moving in
///
/// Currently always [`EmotionalTrend::Stable`]: the trend computation is a
/// documented placeholder, kept as an enum so a real implementation slots in
/// without an API change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalTrend {
    Improving,
    #[default]
    Stable,
    Declining,
}

/// Bounded ring of a session's recent emotion patterns
///
/// Holds at most [`EMOTION_HISTORY_CAPACITY`] patterns, evicting the oldest
/// first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmotionHistory {
    patterns: VecDeque<EmotionPattern>,
}

impl EmotionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pattern, evicting the oldest entry when full
    pub fn push(&mut self, pattern: EmotionPattern) {
        if self.patterns.len() >= EMOTION_HISTORY_CAPACITY {
            self.patterns.pop_front();
        }
        self.patterns.push_back(pattern);
    }

    /// Number of retained patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate retained patterns, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &EmotionPattern> {
        self.patterns.iter()
    }

    /// Most frequent emotion across retained patterns, if any
    pub fn dominant_emotion(&self) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for pattern in &self.patterns {
            for signal in &pattern.signals {
                *counts.entry(signal.emotion.as_str()).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(emotion, _)| emotion.to_string())
    }

    /// Emotional trend over the retained patterns
    ///
    /// Placeholder: always returns [`EmotionalTrend::Stable`].
    pub fn trend(&self) -> EmotionalTrend {
        EmotionalTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_weights() {
        assert_eq!(Intensity::High.rank_weight(), 3.0);
        assert_eq!(Intensity::Medium.score_weight(), 0.6);
        assert!(Intensity::High.score_weight() > Intensity::Low.score_weight());
    }

    #[test]
    fn test_signal_confidence_clamped() {
        let signal = EmotionSignal::new("happy", Intensity::High, 1.7);
        assert_eq!(signal.confidence, 1.0);
        let signal = BuyingSignal::new(BuyingSignalKind::Direct, Intensity::Low, -0.2);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_weighted_score() {
        let signal = BuyingSignal::new(BuyingSignalKind::Direct, Intensity::High, 0.8);
        assert!((signal.weighted_score() - 0.8).abs() < f32::EPSILON);

        let signal = BuyingSignal::new(BuyingSignalKind::Indirect, Intensity::Medium, 0.6);
        assert!((signal.weighted_score() - 0.7 * 0.6 * 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_history_bound() {
        let mut history = EmotionHistory::new();
        for i in 0..15 {
            history.push(EmotionPattern::new(
                vec![EmotionSignal::new("curious", Intensity::Low, 0.8)],
                format!("turn {i}"),
            ));
        }
        assert_eq!(history.len(), EMOTION_HISTORY_CAPACITY);
        // Oldest entries are gone
        assert_eq!(history.iter().next().unwrap().context, "turn 5");
    }

    #[test]
    fn test_dominant_emotion() {
        let mut history = EmotionHistory::new();
        history.push(EmotionPattern::new(
            vec![EmotionSignal::new("happy", Intensity::Medium, 0.8)],
            "a",
        ));
        history.push(EmotionPattern::new(
            vec![
                EmotionSignal::new("happy", Intensity::Low, 0.8),
                EmotionSignal::new("urgent", Intensity::High, 0.8),
            ],
            "b",
        ));
        assert_eq!(history.dominant_emotion().as_deref(), Some("happy"));
        assert!(EmotionHistory::new().dominant_emotion().is_none());
    }

    #[test]
    fn test_trend_placeholder() {
        let history = EmotionHistory::new();
        assert_eq!(history.trend(), EmotionalTrend::Stable);
    }
}
