//! Service catalog
//!
//! The catalog of agency services: bilingual labels and tone, domain tags,
//! sub-services and their branching question flows. A compiled-in default
//! ships with the crate; a YAML file with the same shape can replace it.
//!
//! Services are held in a `Vec` so iteration order is stable: ranking ties
//! resolve by catalog order, not hash order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use nujmooz_core::Localized;

use crate::ConfigError;

/// Question answer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Free text answer
    Text,
    /// Single selection from options
    Choice,
    /// Multiple selections from options
    MultiChoice,
    /// Numeric rating within declared bounds
    Scale,
}

/// One selectable option of a choice/multi-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Stable answer value
    pub value: String,
    /// Bilingual display label
    pub label: Localized,
}

/// Declared validation bounds for a question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionValidation {
    /// Whether an answer is mandatory
    #[serde(default)]
    pub required: bool,
    /// Minimum numeric value (scale questions)
    #[serde(default)]
    pub min: Option<f64>,
    /// Maximum numeric value (scale questions)
    #[serde(default)]
    pub max: Option<f64>,
    /// Minimum text length (text questions)
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum text length (text questions)
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Predicate over the answer a conditional question depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowWhen {
    /// Show when the dependent answer equals the value
    Equals(Value),
    /// Show when the dependent answer is any of the values
    OneOf(Vec<Value>),
}

impl ShowWhen {
    /// Evaluate against a recorded answer
    ///
    /// Array answers (multi-choice) match when they contain a matching
    /// element.
    pub fn matches(&self, answer: &Value) -> bool {
        match self {
            ShowWhen::Equals(expected) => match answer {
                Value::Array(items) => items.contains(expected),
                other => other == expected,
            },
            ShowWhen::OneOf(allowed) => match answer {
                Value::Array(items) => items.iter().any(|item| allowed.contains(item)),
                other => allowed.contains(other),
            },
        }
    }
}

/// Conditional-display rule attached to a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalDisplay {
    /// Id of the question this one depends on
    pub depends_on: String,
    /// Predicate over the dependent answer
    pub show_when: ShowWhen,
}

impl ConditionalDisplay {
    /// Whether the question should currently be shown
    ///
    /// An unanswered dependency leaves the question visible; it disappears
    /// only once the dependent answer rules it out. Totals shrinking as
    /// answers arrive is intended behavior.
    pub fn is_satisfied(&self, answers: &HashMap<String, Value>) -> bool {
        match answers.get(&self.depends_on) {
            Some(answer) => self.show_when.matches(answer),
            None => true,
        }
    }
}

/// A single question within a sub-service flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique id, also the key answers are recorded under
    pub id: String,
    /// Bilingual prompt text, may embed `{{variable}}` placeholders
    pub prompt: Localized,
    /// Answer kind
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Options for choice/multi-choice questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    /// Declared validation bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<QuestionValidation>,
    /// Conditional-display rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_display: Option<ConditionalDisplay>,
}

/// A sub-service with its own question flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubService {
    /// Stable key within the parent service
    pub key: String,
    /// Bilingual display label
    pub label: Localized,
    /// Ordered question flow
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Suggest a moodboard once the brief is assembled
    #[serde(default)]
    pub suggest_moodboard: bool,
    /// Suggest a color palette once the brief is assembled
    #[serde(default)]
    pub suggest_palette: bool,
    /// Keys of related sub-services (cross-sell links)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

/// Rough effort class of a service, derived from its sub-service count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceComplexity {
    Simple,
    Moderate,
    Complex,
}

impl ServiceComplexity {
    /// Extra minutes added to the flow time estimate
    pub fn bonus_minutes(&self) -> u32 {
        match self {
            ServiceComplexity::Simple => 0,
            ServiceComplexity::Moderate => 5,
            ServiceComplexity::Complex => 10,
        }
    }
}

/// One service the agency offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Stable service key
    pub key: String,
    /// Bilingual display label
    pub label: Localized,
    /// Bilingual description
    pub description: Localized,
    /// Domain tags scored against the keyword lexicon
    pub tags: Vec<String>,
    /// Bilingual tone guidance for prompts
    pub tone: Localized,
    /// Sub-services in presentation order
    #[serde(default)]
    pub sub_services: Vec<SubService>,
}

impl ServiceDefinition {
    /// Complexity class from the sub-service count
    pub fn complexity(&self) -> ServiceComplexity {
        match self.sub_services.len() {
            0..=2 => ServiceComplexity::Simple,
            3..=5 => ServiceComplexity::Moderate,
            _ => ServiceComplexity::Complex,
        }
    }

    /// Estimated minutes to complete the service's full question flow
    pub fn estimated_minutes(&self) -> u32 {
        5 + 2 * self.sub_services.len() as u32 + self.complexity().bonus_minutes()
    }

    /// All questions of the service, sub-services flattened in order
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sub_services.iter().flat_map(|s| s.questions.iter())
    }

    /// Total question count across sub-services
    pub fn question_count(&self) -> usize {
        self.sub_services.iter().map(|s| s.questions.len()).sum()
    }
}

/// The full service catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCatalog {
    /// Services in stable presentation order
    pub services: Vec<ServiceDefinition>,
    /// Key of the generic catch-all service boosted during discovery
    #[serde(default = "default_generic_service")]
    pub generic_service: String,
}

fn default_generic_service() -> String {
    "custom_project".to_string()
}

impl ServiceCatalog {
    /// Load a catalog from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;
        let catalog: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        tracing::info!(services = catalog.services.len(), "Loaded service catalog");
        Ok(catalog)
    }

    /// Look up a service by key
    pub fn get(&self, key: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.key == key)
    }

    /// Iterate services in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// The compiled-in Nujmooz catalog
    pub fn builtin() -> Self {
        builtin::catalog()
    }
}

mod builtin {
    //! The default Nujmooz service catalog.

    use super::*;

    fn text(id: &str, ar: &str, en: &str, required: bool) -> Question {
        Question {
            id: id.to_string(),
            prompt: Localized::new(ar, en),
            question_type: QuestionType::Text,
            options: Vec::new(),
            validation: Some(QuestionValidation {
                required,
                ..Default::default()
            }),
            conditional_display: None,
        }
    }

    fn choice(id: &str, ar: &str, en: &str, options: &[(&str, &str, &str)]) -> Question {
        Question {
            id: id.to_string(),
            prompt: Localized::new(ar, en),
            question_type: QuestionType::Choice,
            options: options
                .iter()
                .map(|(value, opt_ar, opt_en)| QuestionOption {
                    value: value.to_string(),
                    label: Localized::new(*opt_ar, *opt_en),
                })
                .collect(),
            validation: Some(QuestionValidation {
                required: true,
                ..Default::default()
            }),
            conditional_display: None,
        }
    }

    fn multi_choice(id: &str, ar: &str, en: &str, options: &[(&str, &str, &str)]) -> Question {
        Question {
            question_type: QuestionType::MultiChoice,
            ..choice(id, ar, en, options)
        }
    }

    fn scale(id: &str, ar: &str, en: &str, min: f64, max: f64) -> Question {
        Question {
            id: id.to_string(),
            prompt: Localized::new(ar, en),
            question_type: QuestionType::Scale,
            options: Vec::new(),
            validation: Some(QuestionValidation {
                required: true,
                min: Some(min),
                max: Some(max),
                ..Default::default()
            }),
            conditional_display: None,
        }
    }

    fn when_equals(mut question: Question, depends_on: &str, value: &str) -> Question {
        question.conditional_display = Some(ConditionalDisplay {
            depends_on: depends_on.to_string(),
            show_when: ShowWhen::Equals(Value::String(value.to_string())),
        });
        question
    }

    pub fn catalog() -> ServiceCatalog {
        ServiceCatalog {
            services: vec![
                branding_identity(),
                ui_ux_design(),
                social_media(),
                content_creation(),
                marketing_strategy(),
                custom_project(),
            ],
            generic_service: "custom_project".to_string(),
        }
    }

    fn branding_identity() -> ServiceDefinition {
        ServiceDefinition {
            key: "branding_identity".to_string(),
            label: Localized::new("الهوية والعلامة التجارية", "Branding & Identity"),
            description: Localized::new(
                "شعارات وهويات بصرية تعبّر عن علامتك",
                "Logos and visual identities that express your brand",
            ),
            tags: vec![
                "logo".to_string(),
                "identity".to_string(),
                "brand".to_string(),
            ],
            tone: Localized::new("إبداعية ودافئة", "creative and warm"),
            sub_services: vec![
                SubService {
                    key: "logo_design".to_string(),
                    label: Localized::new("تصميم شعار", "Logo design"),
                    questions: vec![
                        text(
                            "logo_business_name",
                            "ما اسم مشروعك أو متجرك؟",
                            "What is your business or store called?",
                            true,
                        ),
                        choice(
                            "logo_has_brand",
                            "هل لديك هوية بصرية حالية؟",
                            "Do you have existing brand guidelines?",
                            &[
                                ("yes", "نعم", "Yes"),
                                ("no", "لا", "No"),
                            ],
                        ),
                        when_equals(
                            text(
                                "logo_existing_assets",
                                "صف لنا هويتك الحالية (ألوان، خطوط، ملفات)",
                                "Describe your current identity (colors, fonts, files)",
                                false,
                            ),
                            "logo_has_brand",
                            "yes",
                        ),
                        choice(
                            "logo_style",
                            "أي نمط يناسب {{logo_business_name}}؟",
                            "Which style suits {{logo_business_name}}?",
                            &[
                                ("minimal", "بسيط", "Minimal"),
                                ("classic", "كلاسيكي", "Classic"),
                                ("playful", "مرح", "Playful"),
                            ],
                        ),
                        scale(
                            "logo_boldness",
                            "كم تريد الشعار جريئاً من ١ إلى ٥؟",
                            "How bold should the logo feel, 1 to 5?",
                            1.0,
                            5.0,
                        ),
                    ],
                    suggest_moodboard: true,
                    suggest_palette: true,
                    related: vec!["brand_guidelines".to_string()],
                },
                SubService {
                    key: "brand_guidelines".to_string(),
                    label: Localized::new("دليل الهوية", "Brand guidelines"),
                    questions: vec![
                        multi_choice(
                            "guidelines_deliverables",
                            "ما الذي تحتاجه في دليل الهوية؟",
                            "What should the guidelines cover?",
                            &[
                                ("colors", "الألوان", "Colors"),
                                ("typography", "الخطوط", "Typography"),
                                ("stationery", "المطبوعات", "Stationery"),
                                ("social_kit", "قوالب سوشيال", "Social kit"),
                            ],
                        ),
                        choice(
                            "guidelines_timeline",
                            "متى تحتاج التسليم؟",
                            "When do you need delivery?",
                            &[
                                ("two_weeks", "خلال أسبوعين", "Within two weeks"),
                                ("month", "خلال شهر", "Within a month"),
                                ("flexible", "الوقت مرن", "Flexible"),
                            ],
                        ),
                    ],
                    suggest_moodboard: false,
                    suggest_palette: true,
                    related: vec!["logo_design".to_string()],
                },
            ],
        }
    }

    fn ui_ux_design() -> ServiceDefinition {
        ServiceDefinition {
            key: "ui_ux_design".to_string(),
            label: Localized::new("تصميم المواقع والتطبيقات", "UI/UX Design"),
            description: Localized::new(
                "واجهات مواقع وتطبيقات تركز على المستخدم",
                "User-centered interfaces for websites and apps",
            ),
            tags: vec!["website".to_string(), "interface".to_string()],
            tone: Localized::new("عملية وواضحة", "practical and clear"),
            sub_services: vec![
                SubService {
                    key: "website_design".to_string(),
                    label: Localized::new("تصميم موقع", "Website design"),
                    questions: vec![
                        text(
                            "site_goal",
                            "ما الهدف الأساسي من الموقع؟",
                            "What is the website's main goal?",
                            true,
                        ),
                        scale(
                            "site_pages",
                            "كم صفحة تتوقع تقريباً؟",
                            "Roughly how many pages?",
                            1.0,
                            20.0,
                        ),
                    ],
                    suggest_moodboard: true,
                    suggest_palette: false,
                    related: vec!["mobile_app".to_string()],
                },
                SubService {
                    key: "mobile_app".to_string(),
                    label: Localized::new("تصميم تطبيق", "Mobile app design"),
                    questions: vec![
                        multi_choice(
                            "app_platforms",
                            "أي منصات تستهدف؟",
                            "Which platforms do you target?",
                            &[
                                ("ios", "آيفون", "iOS"),
                                ("android", "أندرويد", "Android"),
                                ("web", "ويب", "Web"),
                            ],
                        ),
                        text(
                            "app_features",
                            "صف أهم ثلاث مزايا في التطبيق",
                            "Describe the app's three most important features",
                            true,
                        ),
                    ],
                    suggest_moodboard: false,
                    suggest_palette: false,
                    related: vec!["website_design".to_string()],
                },
            ],
        }
    }

    fn social_media() -> ServiceDefinition {
        ServiceDefinition {
            key: "social_media".to_string(),
            label: Localized::new("إدارة السوشيال ميديا", "Social Media"),
            description: Localized::new(
                "إدارة حسابات وحملات على منصات التواصل",
                "Account management and campaigns across social platforms",
            ),
            tags: vec!["social".to_string(), "campaign".to_string()],
            tone: Localized::new("حيوية وقريبة", "lively and relatable"),
            sub_services: vec![SubService {
                key: "account_management".to_string(),
                label: Localized::new("إدارة الحسابات", "Account management"),
                questions: vec![
                    multi_choice(
                        "social_platforms",
                        "أي منصات تريد التركيز عليها؟",
                        "Which platforms should we focus on?",
                        &[
                            ("instagram", "انستقرام", "Instagram"),
                            ("tiktok", "تيك توك", "TikTok"),
                            ("x", "إكس", "X"),
                            ("snapchat", "سناب شات", "Snapchat"),
                        ],
                    ),
                    choice(
                        "social_frequency",
                        "كم منشوراً في الأسبوع؟",
                        "How many posts per week?",
                        &[
                            ("three", "٣ منشورات", "3 posts"),
                            ("five", "٥ منشورات", "5 posts"),
                            ("daily", "يومياً", "Daily"),
                        ],
                    ),
                ],
                suggest_moodboard: false,
                suggest_palette: false,
                related: Vec::new(),
            }],
        }
    }

    fn content_creation() -> ServiceDefinition {
        ServiceDefinition {
            key: "content_creation".to_string(),
            label: Localized::new("صناعة المحتوى", "Content Creation"),
            description: Localized::new(
                "محتوى مكتوب ومرئي يحكي قصة علامتك",
                "Written and visual content that tells your brand's story",
            ),
            tags: vec!["content".to_string(), "copywriting".to_string()],
            tone: Localized::new("قصصية وجذابة", "narrative and engaging"),
            sub_services: vec![SubService {
                key: "editorial_content".to_string(),
                label: Localized::new("محتوى تحريري", "Editorial content"),
                questions: vec![
                    text(
                        "content_topics",
                        "ما المواضيع التي يدور حولها المحتوى؟",
                        "What topics should the content cover?",
                        true,
                    ),
                    scale(
                        "content_monthly_pieces",
                        "كم مادة شهرياً؟",
                        "How many pieces per month?",
                        1.0,
                        30.0,
                    ),
                ],
                suggest_moodboard: false,
                suggest_palette: false,
                related: Vec::new(),
            }],
        }
    }

    fn marketing_strategy() -> ServiceDefinition {
        ServiceDefinition {
            key: "marketing_strategy".to_string(),
            label: Localized::new("الاستراتيجية التسويقية", "Marketing Strategy"),
            description: Localized::new(
                "خطط تسويق وإطلاق مبنية على فهم جمهورك",
                "Marketing and launch plans built on audience insight",
            ),
            tags: vec!["marketing".to_string(), "strategy".to_string()],
            tone: Localized::new("واثقة ومدروسة", "confident and considered"),
            sub_services: vec![SubService {
                key: "launch_plan".to_string(),
                label: Localized::new("خطة إطلاق", "Launch plan"),
                questions: vec![
                    text(
                        "launch_audience",
                        "من جمهورك المستهدف؟",
                        "Who is your target audience?",
                        true,
                    ),
                    multi_choice(
                        "launch_channels",
                        "أي قنوات تفضل للإطلاق؟",
                        "Which channels do you prefer for launch?",
                        &[
                            ("social", "سوشيال ميديا", "Social media"),
                            ("ads", "إعلانات مدفوعة", "Paid ads"),
                            ("influencers", "مؤثرون", "Influencers"),
                            ("email", "بريد إلكتروني", "Email"),
                        ],
                    ),
                ],
                suggest_moodboard: false,
                suggest_palette: false,
                related: Vec::new(),
            }],
        }
    }

    fn custom_project() -> ServiceDefinition {
        ServiceDefinition {
            key: "custom_project".to_string(),
            label: Localized::new("مشروع خاص", "Custom Project"),
            description: Localized::new(
                "أخبرنا عن فكرتك وسنشكّل الفريق المناسب",
                "Tell us your idea and we'll shape the right team",
            ),
            tags: vec!["project".to_string(), "idea".to_string()],
            tone: Localized::new("منفتحة ومتسائلة", "open and curious"),
            sub_services: vec![SubService {
                key: "discovery_call".to_string(),
                label: Localized::new("جلسة اكتشاف", "Discovery session"),
                questions: vec![
                    text(
                        "custom_idea",
                        "صف فكرتك بجملتين أو ثلاث",
                        "Describe your idea in two or three sentences",
                        true,
                    ),
                    choice(
                        "custom_budget",
                        "ما الميزانية التقريبية؟",
                        "What is the rough budget?",
                        &[
                            ("small", "أقل من ٥٠٠٠", "Under 5,000"),
                            ("medium", "٥٠٠٠ إلى ٢٠٠٠٠", "5,000 to 20,000"),
                            ("large", "أكثر من ٢٠٠٠٠", "Over 20,000"),
                        ],
                    ),
                ],
                suggest_moodboard: false,
                suggest_palette: false,
                related: Vec::new(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = ServiceCatalog::builtin();
        assert!(catalog.len() >= 5);
        assert!(catalog.get("branding_identity").is_some());
        assert_eq!(catalog.generic_service, "custom_project");
        assert!(catalog.get(&catalog.generic_service).is_some());
    }

    #[test]
    fn test_question_ids_unique() {
        let catalog = ServiceCatalog::builtin();
        let mut seen = std::collections::HashSet::new();
        for service in catalog.iter() {
            for question in service.questions() {
                assert!(seen.insert(question.id.clone()), "duplicate id {}", question.id);
            }
        }
    }

    #[test]
    fn test_complexity_and_estimate() {
        let catalog = ServiceCatalog::builtin();
        let branding = catalog.get("branding_identity").unwrap();
        assert_eq!(branding.complexity(), ServiceComplexity::Simple);
        // 5 + 2 * 2 sub-services + 0 bonus
        assert_eq!(branding.estimated_minutes(), 9);
        assert_eq!(branding.question_count(), 7);
    }

    #[test]
    fn test_show_when_matching() {
        let equals = ShowWhen::Equals(Value::String("yes".into()));
        assert!(equals.matches(&Value::String("yes".into())));
        assert!(!equals.matches(&Value::String("no".into())));
        assert!(equals.matches(&serde_json::json!(["no", "yes"])));

        let one_of = ShowWhen::OneOf(vec![Value::String("a".into()), Value::String("b".into())]);
        assert!(one_of.matches(&Value::String("b".into())));
        assert!(!one_of.matches(&Value::String("c".into())));
    }

    #[test]
    fn test_conditional_unanswered_is_visible() {
        let rule = ConditionalDisplay {
            depends_on: "q1".to_string(),
            show_when: ShowWhen::Equals(Value::String("x".into())),
        };
        let empty = HashMap::new();
        assert!(rule.is_satisfied(&empty));

        let mut answers = HashMap::new();
        answers.insert("q1".to_string(), Value::String("y".into()));
        assert!(!rule.is_satisfied(&answers));
    }

    #[test]
    fn test_yaml_round_trip() {
        let catalog = ServiceCatalog::builtin();
        let yaml = serde_yaml::to_string(&catalog).unwrap();
        let back: ServiceCatalog = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.len(), catalog.len());
        assert_eq!(
            back.get("branding_identity").unwrap().question_count(),
            catalog.get("branding_identity").unwrap().question_count()
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(
            &path,
            serde_yaml::to_string(&ServiceCatalog::builtin()).unwrap(),
        )
        .unwrap();

        let loaded = ServiceCatalog::load(&path).unwrap();
        assert_eq!(loaded.len(), ServiceCatalog::builtin().len());

        assert!(matches!(
            ServiceCatalog::load(dir.path().join("missing.yaml")),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
