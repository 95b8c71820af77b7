use lingua::{Language, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};

/// Characters inspected when detecting the language of a whole document
const DETECTION_SAMPLE_CHARS: usize = 5000;

/// ISO 639-1 language codes the voice selection knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
}

impl LanguageCode {
    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect the language of a document from its opening characters.
/// Defaults to Spanish when detection is inconclusive.
pub fn detect_language(text: &str) -> LanguageCode {
    let sample: String = text.chars().take(DETECTION_SAMPLE_CHARS).collect();

    let languages = vec![
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    let detector = LanguageDetectorBuilder::from_languages(&languages).build();

    match detector.detect_language_of(&sample) {
        Some(language) => LanguageCode::from_lingua(language),
        None => {
            tracing::warn!("Could not detect document language, falling back to Spanish");
            LanguageCode::Spanish
        }
    }
}
