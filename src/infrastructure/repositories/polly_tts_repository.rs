use super::tts_repository::TtsRepository;
use crate::domain::tts::{
    normalize_text, split_into_batches, LanguageCode, RateAdjustment, SynthesisError, VoiceInfo,
    VoiceSettings,
};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// Polly accepts prosody rates between 20% and 200% of normal speed
const MIN_RATE_PERCENT: i32 = 20;
const MAX_RATE_PERCENT: i32 = 200;

/// Polly bills at most 3000 characters of text per synthesize_speech request
const MAX_BILLED_CHARS: usize = 3000;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    engine: Engine,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>, engine: Engine) -> Self {
        Self {
            polly_client,
            engine,
        }
    }

    /// Build the SSML document for a fragment, one `<p>` per paragraph.
    /// Returns `None` when no speakable text remains.
    fn build_ssml(text: &str, rate: RateAdjustment) -> Option<String> {
        let rate_percent = rate.absolute_percent(MIN_RATE_PERCENT, MAX_RATE_PERCENT);

        let paragraphs: Vec<String> = text
            .split("\n\n")
            .map(normalize_text)
            .filter(|paragraph| !paragraph.is_empty())
            .map(|paragraph| {
                format!(
                    r#"<p><prosody rate="{}%">{}</prosody></p>"#,
                    rate_percent,
                    escape_xml(&paragraph)
                )
            })
            .collect();

        if paragraphs.is_empty() {
            return None;
        }

        Some(format!("<speak>{}</speak>", paragraphs.concat()))
    }

    /// One SSML document per request-sized batch of the fragment
    fn ssml_requests(text: &str, rate: RateAdjustment) -> Vec<String> {
        split_into_batches(text, MAX_BILLED_CHARS, escaped_len)
            .iter()
            .filter_map(|batch| Self::build_ssml(batch, rate))
            .collect()
    }

    /// Call AWS Polly to synthesize a single SSML document
    async fn call_polly(&self, ssml: &str, voice_name: &str) -> Result<Vec<u8>, SynthesisError> {
        let voice_id = VoiceId::from(voice_name);

        tracing::debug!(
            voice = voice_name,
            engine = ?self.engine,
            output_format = "Mp3",
            ssml_length = ssml.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(ssml)
            .text_type(TextType::Ssml)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(self.engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice = voice_name,
                    engine = ?self.engine,
                    ssml_length = ssml.len(),
                    "AWS Polly synthesize_speech failed"
                );
                SynthesisError::Service(format!("AWS Polly error: {:?}", e))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Service(format!("Failed to read audio stream: {}", e))
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        if audio_bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        Ok(audio_bytes)
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str, voice: &VoiceSettings) -> Result<Vec<u8>, SynthesisError> {
        let start_time = std::time::Instant::now();

        let requests = Self::ssml_requests(text, voice.rate);
        if requests.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let mut audio_data = Vec::new();
        for (batch_index, ssml) in requests.iter().enumerate() {
            if requests.len() > 1 {
                tracing::debug!(
                    batch_index,
                    batch_count = requests.len(),
                    ssml_length = ssml.len(),
                    "Synthesizing batch"
                );
            }
            audio_data.extend(self.call_polly(ssml, &voice.voice_id).await?);
        }

        let duration = start_time.elapsed();
        tracing::debug!(
            provider = "polly",
            voice = %voice.voice_id,
            rate = %voice.rate,
            latency_ms = duration.as_millis(),
            characters_count = text.chars().count(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let mut voices = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .polly_client
                .describe_voices()
                .engine(self.engine.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "AWS Polly describe_voices failed");
                    SynthesisError::Service(format!("AWS Polly error: {:?}", e))
                })?;

            voices.extend(output.voices().iter().map(|voice| VoiceInfo {
                short_name: voice.id().map(|id| id.as_str().to_string()).unwrap_or_default(),
                gender: voice.gender().map(|g| g.as_str().to_string()).unwrap_or_default(),
                locale: voice
                    .language_code()
                    .map(|code| code.as_str().to_string())
                    .unwrap_or_default(),
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        voices.sort_by(|a, b| (&a.locale, &a.short_name).cmp(&(&b.locale, &b.short_name)));
        Ok(voices)
    }

    /// Neural voices for each supported language
    fn voice_for_language(&self, language: LanguageCode) -> String {
        match language {
            LanguageCode::English => "Joanna",
            LanguageCode::Spanish => "Sergio",
            LanguageCode::French => "Lea",
            LanguageCode::German => "Vicki",
            LanguageCode::Italian => "Bianca",
            LanguageCode::Portuguese => "Ines",
        }
        .to_string()
    }

    fn provider_name(&self) -> &'static str {
        "polly"
    }
}

/// Length of a character once escaped into SSML
fn escaped_len(c: char) -> usize {
    match c {
        '&' => "&amp;".len(),
        '<' | '>' => "&lt;".len(),
        '"' | '\'' => "&quot;".len(),
        _ => 1,
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
