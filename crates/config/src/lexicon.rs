//! Bilingual keyword lexicons
//!
//! Three fixed tables drive the heuristic analyzers:
//! - tag lexicon: service tag -> keyword list (Arabic and English mixed,
//!   matched case-insensitively against the input)
//! - buying-intent lexicon: direct/indirect phrase tiers split by intensity
//! - emotion lexicon: emotion name -> keyword list
//!
//! Core trigger words for a service deliberately appear under several of its
//! tags, so one strong keyword lifts the whole service over the match
//! threshold. Compiled-in defaults ship with the crate; a YAML file with the
//! same shape can replace them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::ConfigError;

/// Phrases of one buying-intent tier, split by intensity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhraseTiers {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

/// Direct vs indirect buying-intent phrasing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyingLexicon {
    /// Explicit asks ("I need", "أحتاج")
    #[serde(default)]
    pub direct: PhraseTiers,
    /// Implicit interest ("how much", "كم السعر")
    #[serde(default)]
    pub indirect: PhraseTiers,
}

/// Keywords for one emotion
///
/// Held in a `Vec` so primary-emotion ties resolve by lexicon order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionEntry {
    /// Emotion name, e.g. "frustrated"
    pub emotion: String,
    /// Keywords in either language, lowercase
    pub keywords: Vec<String>,
}

/// The three keyword tables used by the analyzers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    /// Service tag -> keywords
    pub tags: HashMap<String, Vec<String>>,
    /// Buying-intent phrase tiers
    pub buying: BuyingLexicon,
    /// Emotion keyword entries, in priority order
    pub emotions: Vec<EmotionEntry>,
}

impl Lexicon {
    /// Load a lexicon from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;
        let lexicon: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        tracing::info!(
            tags = lexicon.tags.len(),
            emotions = lexicon.emotions.len(),
            "Loaded lexicon"
        );
        Ok(lexicon)
    }

    /// Keywords for a service tag; unknown tags yield an empty slice
    pub fn keywords_for_tag(&self, tag: &str) -> &[String] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The compiled-in bilingual lexicon
    pub fn builtin() -> Self {
        fn list(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }

        let mut tags = HashMap::new();
        // branding_identity: "logo"/"شعار"/"هوية" repeat across tags so any
        // one of them clears the confidence threshold on its own.
        tags.insert(
            "logo".to_string(),
            list(&["logo", "شعار", "لوجو", "لوقو", "هوية"]),
        );
        tags.insert(
            "identity".to_string(),
            list(&["identity", "هوية", "شعار", "logo", "هوية بصرية"]),
        );
        tags.insert(
            "brand".to_string(),
            list(&["brand", "براند", "علامة تجارية", "شعار", "logo", "هوية"]),
        );
        // ui_ux_design
        tags.insert(
            "website".to_string(),
            list(&["website", "موقع", "web", "landing page", "تطبيق", "app"]),
        );
        tags.insert(
            "interface".to_string(),
            list(&[
                "interface",
                "واجهة",
                "ux",
                "ui",
                "تجربة المستخدم",
                "موقع",
                "تطبيق",
                "app",
                "website",
            ]),
        );
        // social_media
        tags.insert(
            "social".to_string(),
            list(&[
                "social media",
                "سوشيال",
                "انستقرام",
                "instagram",
                "تيك توك",
                "tiktok",
                "منصات التواصل",
                "حملة",
            ]),
        );
        tags.insert(
            "campaign".to_string(),
            list(&[
                "campaign",
                "حملة",
                "إعلان",
                "ads",
                "سوشيال",
                "انستقرام",
                "instagram",
                "social media",
            ]),
        );
        // content_creation
        tags.insert(
            "content".to_string(),
            list(&["content", "محتوى", "مقال", "blog", "كتابة"]),
        );
        tags.insert(
            "copywriting".to_string(),
            list(&["copywriting", "كتابة", "نصوص", "محتوى", "content", "مقال"]),
        );
        // marketing_strategy
        tags.insert(
            "marketing".to_string(),
            list(&["marketing", "تسويق", "خطة تسويق", "استراتيجية"]),
        );
        tags.insert(
            "strategy".to_string(),
            list(&["strategy", "استراتيجية", "خطة", "تسويق", "marketing"]),
        );
        // custom_project
        tags.insert(
            "project".to_string(),
            list(&["project", "مشروع", "فكرة", "idea"]),
        );
        tags.insert(
            "idea".to_string(),
            list(&["idea", "فكرة", "مشروع", "project"]),
        );

        let buying = BuyingLexicon {
            direct: PhraseTiers {
                high: list(&[
                    "i need",
                    "need it",
                    "asap",
                    "right away",
                    "urgently",
                    "أحتاج",
                    "عاجل",
                    "بأسرع وقت",
                    "أبغى أبدأ الحين",
                ]),
                medium: list(&[
                    "i want",
                    "let's start",
                    "ready to start",
                    "sign me up",
                    "أريد",
                    "أبغى",
                    "نبدأ",
                    "جاهز للبدء",
                ]),
                low: list(&[
                    "interested in ordering",
                    "thinking of ordering",
                    "مهتم بالطلب",
                    "أفكر أطلب",
                ]),
            },
            indirect: PhraseTiers {
                high: list(&[
                    "how much",
                    "cost",
                    "price",
                    "pricing",
                    "كم السعر",
                    "كم التكلفة",
                    "بكم",
                    "التكلفة",
                    "الأسعار",
                ]),
                medium: list(&[
                    "how long",
                    "timeline",
                    "delivery time",
                    "كم المدة",
                    "متى يخلص",
                    "مدة التنفيذ",
                ]),
                low: list(&[
                    "portfolio",
                    "examples of your work",
                    "previous work",
                    "أعمالكم",
                    "سابقة أعمال",
                    "نماذج",
                ]),
            },
        };

        let emotions = vec![
            EmotionEntry {
                emotion: "frustrated".to_string(),
                keywords: list(&[
                    "frustrated",
                    "annoyed",
                    "upset",
                    "not working",
                    "waste of time",
                    "محبط",
                    "منزعج",
                    "زعلان",
                    "مشكلة",
                    "ما اشتغل",
                ]),
            },
            EmotionEntry {
                emotion: "excited".to_string(),
                keywords: list(&[
                    "excited",
                    "can't wait",
                    "amazing",
                    "متحمس",
                    "متشوق",
                    "ما أقدر أنتظر",
                ]),
            },
            EmotionEntry {
                emotion: "happy".to_string(),
                keywords: list(&[
                    "happy",
                    "great",
                    "love it",
                    "wonderful",
                    "سعيد",
                    "رائع",
                    "ممتاز",
                    "جميل",
                    "أحببته",
                ]),
            },
            EmotionEntry {
                emotion: "urgent".to_string(),
                keywords: list(&[
                    "urgent",
                    "asap",
                    "deadline",
                    "quickly",
                    "hurry",
                    "عاجل",
                    "مستعجل",
                    "ضروري",
                    "بسرعة",
                ]),
            },
            EmotionEntry {
                emotion: "curious".to_string(),
                keywords: list(&[
                    "curious",
                    "tell me more",
                    "how does",
                    "what if",
                    "فضولي",
                    "أخبرني أكثر",
                    "كيف تشتغل",
                    "ماذا لو",
                ]),
            },
            EmotionEntry {
                emotion: "uncertain".to_string(),
                keywords: list(&[
                    "not sure",
                    "maybe",
                    "i don't know",
                    "confused",
                    "لست متأكد",
                    "مو متأكد",
                    "ربما",
                    "محتار",
                ]),
            },
        ];

        Self {
            tags,
            buying,
            emotions,
        }
    }
}
