/// Failure of a single call to the TTS provider
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// Nothing left to speak once the text is normalized; not a real failure
    #[error("no text to speak")]
    EmptyText,
    #[error("provider returned no audio")]
    EmptyAudio,
    #[error("TTS service error: {0}")]
    Service(String),
}

impl SynthesisError {
    /// Whether the failure means "no audio needed" rather than a failed call
    pub fn is_empty_text(&self) -> bool {
        matches!(self, SynthesisError::EmptyText)
    }
}
