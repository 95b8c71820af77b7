use crate::domain::tts::{LanguageCode, SynthesisError, VoiceInfo, VoiceSettings};
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, etc.)
///
/// Implementations synthesize exactly the text they are given: fragment sizing
/// and ordering belong to the caller. Text that is empty once the provider has
/// normalized it must be reported as `SynthesisError::EmptyText`.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one fragment of text to speech
    ///
    /// Returns MP3 audio bytes for the fragment
    ///
    /// # Errors
    /// `EmptyText` when there is nothing to speak, `Service` when the provider
    /// call fails, `EmptyAudio` when the provider answers without audio
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<Vec<u8>, SynthesisError>;

    /// Voices offered by the provider
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError>;

    /// Voice used when the caller asks for automatic selection
    fn voice_for_language(&self, language: LanguageCode) -> String;

    fn provider_name(&self) -> &'static str;
}
