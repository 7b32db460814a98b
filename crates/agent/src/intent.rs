//! Intent analysis
//!
//! Scores the service catalog against one user turn: keyword-driven tag
//! matching blended with session context, plus buying-intent signal
//! detection. Heuristic by design; no language model is involved.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use nujmooz_config::{Lexicon, PhraseTiers, ScoringConfig, ServiceCatalog};
use nujmooz_core::{
    BuyingSignal, BuyingSignalKind, ConversationPhase, Intensity, SessionContext, UserInput,
};

use crate::memory::SessionStore;

/// One service scored against the current turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMatch {
    /// Catalog key of the matched service
    pub service_key: String,
    /// Blended confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Tags that had at least one keyword hit
    pub matched_tags: Vec<String>,
    /// Context contribution before blending (0.0 - 1.0)
    pub contextual_score: f32,
}

/// Aggregated buying-intent estimate for the turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyingIntent {
    /// Aggregate score (0.0 - 1.0)
    pub score: f32,
    /// Mean confidence of the contributing signals
    pub confidence: f32,
    /// Individual detected signals
    pub signals: Vec<BuyingSignal>,
}

impl BuyingIntent {
    fn none(no_signal_confidence: f32) -> Self {
        Self {
            score: 0.0,
            confidence: no_signal_confidence,
            signals: Vec::new(),
        }
    }
}

/// Result of analyzing one turn for intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// Services over the confidence threshold, best first
    pub matched_services: Vec<ServiceMatch>,
    /// Buying-intent estimate
    pub buying_intent: BuyingIntent,
    /// Conversation phase the turn was scored in
    pub phase: ConversationPhase,
    /// Overall confidence (top match's, or the no-signal default)
    pub confidence: f32,
    /// True when this is the documented fallback after an internal failure
    #[serde(default)]
    pub degraded: bool,
}

impl IntentAnalysis {
    /// The documented fallback analysis
    pub fn fallback(phase: ConversationPhase) -> Self {
        Self {
            matched_services: Vec::new(),
            buying_intent: BuyingIntent {
                score: 0.0,
                confidence: 0.5,
                signals: Vec::new(),
            },
            phase,
            confidence: 0.5,
            degraded: true,
        }
    }

    /// Best match, if any
    pub fn top_match(&self) -> Option<&ServiceMatch> {
        self.matched_services.first()
    }
}

/// Scores the catalog against user turns
pub struct IntentAnalyzer {
    catalog: Arc<ServiceCatalog>,
    lexicon: Arc<Lexicon>,
    scoring: ScoringConfig,
    store: Arc<SessionStore>,
}

impl IntentAnalyzer {
    pub fn new(
        catalog: Arc<ServiceCatalog>,
        lexicon: Arc<Lexicon>,
        scoring: ScoringConfig,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            catalog,
            lexicon,
            scoring,
            store,
        }
    }

    /// Analyze one turn. Total: never panics or propagates an error; any
    /// internal failure becomes [`IntentAnalysis::fallback`].
    pub fn analyze(&self, input: &UserInput, context: &SessionContext) -> IntentAnalysis {
        match self.try_analyze(input, context) {
            Ok(analysis) => analysis,
            Err(err) => {
                tracing::warn!(
                    session = %context.session_id,
                    error = %err,
                    "Intent analysis failed, returning fallback"
                );
                IntentAnalysis::fallback(context.phase())
            }
        }
    }

    fn try_analyze(&self, input: &UserInput, context: &SessionContext) -> Result<IntentAnalysis> {
        if input.content.trim().is_empty() {
            bail!("empty input");
        }
        if self.catalog.is_empty() {
            bail!("empty service catalog");
        }

        let text = input.content.to_lowercase();
        let words: HashSet<&str> = text.unicode_words().collect();
        let phase = context.phase();

        let prior_services = self
            .store
            .with_session(&context.session_id, |state| state.service_history.clone());

        let mut matches = Vec::new();
        for service in self.catalog.iter() {
            let matched_tags: Vec<String> = service
                .tags
                .iter()
                .filter(|tag| {
                    self.lexicon
                        .keywords_for_tag(tag)
                        .iter()
                        .any(|keyword| keyword_hits(&text, &words, keyword))
                })
                .cloned()
                .collect();

            let base_confidence = if service.tags.is_empty() {
                0.0
            } else {
                matched_tags.len() as f32 / service.tags.len() as f32
            };

            let mut contextual_score = 0.0;
            if prior_services.iter().any(|key| key == &service.key) {
                contextual_score += self.scoring.prior_service_bonus;
            }
            if phase == ConversationPhase::Discovery && service.key == self.catalog.generic_service
            {
                contextual_score += self.scoring.discovery_generic_bonus;
            }
            let contextual_score = contextual_score.clamp(0.0, 1.0);

            let confidence = (self.scoring.base_weight * base_confidence
                + self.scoring.context_weight * contextual_score)
                .clamp(0.0, 1.0);

            if confidence >= self.scoring.min_service_confidence {
                matches.push(ServiceMatch {
                    service_key: service.key.clone(),
                    confidence,
                    matched_tags,
                    contextual_score,
                });
            }
        }

        // Stable sort: equal confidences keep catalog order.
        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(self.scoring.max_matches);

        let buying_intent = self.detect_buying_intent(&text, &words);

        if let Some(top) = matches.first() {
            let key = top.service_key.clone();
            self.store.with_session(&context.session_id, |state| {
                if state.service_history.last() != Some(&key) {
                    state.service_history.push(key.clone());
                }
            });
        }

        let confidence = matches
            .first()
            .map(|m| m.confidence)
            .unwrap_or(self.scoring.no_signal_confidence);

        tracing::debug!(
            session = %context.session_id,
            matches = matches.len(),
            buying_score = buying_intent.score,
            %phase,
            "Intent analyzed"
        );

        Ok(IntentAnalysis {
            matched_services: matches,
            buying_intent,
            phase,
            confidence,
            degraded: false,
        })
    }

    fn detect_buying_intent(&self, text: &str, words: &HashSet<&str>) -> BuyingIntent {
        let mut signals = Vec::new();

        let tiers: [(BuyingSignalKind, &PhraseTiers, f32); 2] = [
            (
                BuyingSignalKind::Direct,
                &self.lexicon.buying.direct,
                self.scoring.direct_signal_confidence,
            ),
            (
                BuyingSignalKind::Indirect,
                &self.lexicon.buying.indirect,
                self.scoring.indirect_signal_confidence,
            ),
        ];

        for (kind, phrases, confidence) in tiers {
            let buckets = [
                (Intensity::High, &phrases.high),
                (Intensity::Medium, &phrases.medium),
                (Intensity::Low, &phrases.low),
            ];
            for (intensity, bucket) in buckets {
                for phrase in bucket {
                    if keyword_hits(text, words, phrase) {
                        signals.push(BuyingSignal::new(kind, intensity, confidence));
                    }
                }
            }
        }

        if signals.is_empty() {
            return BuyingIntent::none(self.scoring.no_signal_confidence);
        }

        let score = signals.iter().map(BuyingSignal::weighted_score).sum::<f32>()
            / signals.len() as f32;
        let confidence =
            signals.iter().map(|s| s.confidence).sum::<f32>() / signals.len() as f32;

        BuyingIntent {
            score: score.clamp(0.0, 1.0),
            confidence,
            signals,
        }
    }
}

/// Case-insensitive containment check
///
/// Multi-word phrases and longer keywords match as substrings; keywords of
/// up to three characters ("ads", "ui") must match a whole word, otherwise
/// "happy" would trigger "app".
fn keyword_hits(text: &str, words: &HashSet<&str>, keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.chars().count() > 3 {
        text.contains(keyword)
    } else {
        words.contains(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> IntentAnalyzer {
        IntentAnalyzer::new(
            Arc::new(ServiceCatalog::builtin()),
            Arc::new(Lexicon::builtin()),
            ScoringConfig::default(),
            Arc::new(SessionStore::new(16)),
        )
    }

    #[test]
    fn test_branding_intent_arabic() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-ar");
        let input = UserInput::text("أحتاج شعار لمتجري");

        let analysis = analyzer.analyze(&input, &context);
        let top = analysis.top_match().expect("a match");
        assert_eq!(top.service_key, "branding_identity");
        assert!(top.confidence >= 0.6);
        assert!(!analysis.degraded);
    }

    #[test]
    fn test_branding_intent_english() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-en");
        let input = UserInput::text("I need a logo for my coffee shop");

        let analysis = analyzer.analyze(&input, &context);
        assert_eq!(
            analysis.top_match().map(|m| m.service_key.as_str()),
            Some("branding_identity")
        );
    }

    #[test]
    fn test_ranking_is_sorted_and_bounded() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-rank");
        let input = UserInput::text("أحتاج شعار وهوية وموقع وتطبيق وحملة انستقرام ومحتوى وتسويق");

        let analysis = analyzer.analyze(&input, &context);
        assert!(analysis.matched_services.len() <= 3);
        for pair in analysis.matched_services.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for m in &analysis.matched_services {
            assert!((0.0..=1.0).contains(&m.confidence));
            assert!((0.0..=1.0).contains(&m.contextual_score));
        }
    }

    #[test]
    fn test_buying_signals_mixed_tiers() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-buy");
        let input = UserInput::text("How much does this cost, I need it ASAP");

        let analysis = analyzer.analyze(&input, &context);
        let signals = &analysis.buying_intent.signals;
        assert!(signals
            .iter()
            .any(|s| s.kind == BuyingSignalKind::Direct && s.intensity == Intensity::High));
        assert!(signals
            .iter()
            .any(|s| s.kind == BuyingSignalKind::Indirect && s.intensity == Intensity::High));
        assert!(analysis.buying_intent.score > 0.5);
        assert!((0.0..=1.0).contains(&analysis.buying_intent.score));
    }

    #[test]
    fn test_no_buying_signals() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-none");
        let input = UserInput::text("the weather is nice today");

        let analysis = analyzer.analyze(&input, &context);
        assert!(analysis.buying_intent.signals.is_empty());
        assert_eq!(analysis.buying_intent.score, 0.0);
        assert_eq!(analysis.buying_intent.confidence, 0.5);
    }

    #[test]
    fn test_empty_input_falls_back() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-empty");
        let input = UserInput::text("");

        let analysis = analyzer.analyze(&input, &context);
        assert!(analysis.degraded);
        assert!(analysis.matched_services.is_empty());
        assert_eq!(analysis.buying_intent.score, 0.0);
        assert_eq!(analysis.confidence, 0.5);
    }

    #[test]
    fn test_generic_service_boosted_in_discovery() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-gen");
        let input = UserInput::text("عندي مشروع جديد");

        let analysis = analyzer.analyze(&input, &context);
        let top = analysis.top_match().expect("a match");
        assert_eq!(top.service_key, "custom_project");
        // Tag match alone is 0.7; the discovery bonus lifts it further.
        assert!(top.contextual_score > 0.0);
        assert!(top.confidence > 0.7);
    }

    #[test]
    fn test_prior_service_bonus() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-prior");

        // First turn establishes branding in the session history.
        analyzer.analyze(&UserInput::text("أحتاج شعار"), &context);

        let with_history = analyzer.analyze(&UserInput::text("شعار"), &context);
        let top = with_history.top_match().expect("a match");
        assert_eq!(top.service_key, "branding_identity");
        assert!(top.contextual_score >= 0.2);
    }

    #[test]
    fn test_short_keyword_needs_word_boundary() {
        let analyzer = analyzer();
        let context = SessionContext::new("s-word");
        // "happy" contains "app" as a substring but must not match it.
        let analysis = analyzer.analyze(&UserInput::text("I am happy"), &context);
        assert!(analysis
            .matched_services
            .iter()
            .all(|m| m.service_key != "ui_ux_design"));
    }
}
