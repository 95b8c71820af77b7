use super::tts_repository::TtsRepository;
use crate::domain::tts::{
    normalize_text, split_into_batches, LanguageCode, SynthesisError, VoiceInfo, VoiceSettings,
};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Speed range accepted by the OpenAI speech endpoint
const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 4.0;

/// The speech endpoint rejects inputs longer than 4096 characters
const MAX_INPUT_CHARS: usize = 4096;

const OPENAI_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn parse_voice(voice: &str) -> Voice {
        match voice.to_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            other => {
                tracing::warn!(voice = other, "Unknown OpenAI voice, using alloy");
                Voice::Alloy
            }
        }
    }

    /// Request-sized pieces of a fragment, empty when nothing is speakable
    fn input_batches(text: &str) -> Vec<String> {
        if normalize_text(text).is_empty() {
            return Vec::new();
        }
        split_into_batches(text, MAX_INPUT_CHARS, |_| 1)
    }

    async fn call_openai(&self, input: &str, voice: &VoiceSettings) -> Result<Vec<u8>, SynthesisError> {
        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: input.to_string(),
            voice: Self::parse_voice(&voice.voice_id),
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: Some(voice.rate.speed_factor(MIN_SPEED, MAX_SPEED)),
        };

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    voice = %voice.voice_id,
                    text_length = input.len(),
                    "OpenAI TTS API call failed"
                );
                SynthesisError::Service(format!("OpenAI TTS error: {}", e))
            })?;

        let audio_bytes = response.bytes.to_vec();
        if audio_bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        Ok(audio_bytes)
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();

        let batches = Self::input_batches(text);
        if batches.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let mut audio_bytes = Vec::new();
        for (batch_index, input) in batches.iter().enumerate() {
            if batches.len() > 1 {
                tracing::debug!(
                    batch_index,
                    batch_count = batches.len(),
                    batch_size = input.len(),
                    "Synthesizing batch"
                );
            }
            audio_bytes.extend(self.call_openai(input, voice).await?);
        }

        tracing::debug!(
            provider = "openai",
            model = %self.model,
            voice = %voice.voice_id,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "TTS synthesis completed"
        );

        Ok(audio_bytes)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        Ok(OPENAI_VOICES
            .iter()
            .map(|name| VoiceInfo {
                short_name: name.to_string(),
                gender: "Neutral".to_string(),
                locale: "multilingual".to_string(),
            })
            .collect())
    }

    /// Based on voice characteristics that suit each language
    fn voice_for_language(&self, language: LanguageCode) -> String {
        match language {
            LanguageCode::English => "alloy",
            LanguageCode::Spanish => "echo",
            LanguageCode::French => "nova",
            LanguageCode::German => "onyx",
            LanguageCode::Italian => "fable",
            LanguageCode::Portuguese => "shimmer",
        }
        .to_string()
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
