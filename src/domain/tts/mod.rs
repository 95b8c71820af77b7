pub mod batching;
pub mod error;
pub mod language;
pub mod voice;

pub use batching::split_into_batches;
pub use error::SynthesisError;
pub use language::{detect_language, LanguageCode};
pub use voice::{InvalidRateAdjustment, RateAdjustment, VoiceInfo, VoiceSelection, VoiceSettings};

/// Collapse whitespace runs to single spaces and trim, as sent to providers
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
