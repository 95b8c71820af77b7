use crate::{
    domain::tts::VoiceInfo,
    error::{AppError, AppResult},
    infrastructure::repositories::TtsRepository,
};
use std::sync::Arc;

pub struct VoicesController {
    tts_repo: Arc<dyn TtsRepository>,
}

impl VoicesController {
    pub fn new(tts_repo: Arc<dyn TtsRepository>) -> Self {
        Self { tts_repo }
    }

    /// `--list-voices` - Print the voices of the configured provider to stdout
    pub async fn list(&self, json: bool) -> AppResult<()> {
        let voices = self.tts_repo.list_voices().await?;
        tracing::info!(
            provider = self.tts_repo.provider_name(),
            count = voices.len(),
            "Voices listed"
        );

        let output = if json {
            serde_json::to_string_pretty(&voices)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode voices: {}", e)))?
        } else {
            render_table(&voices)
        };
        println!("{}", output);

        Ok(())
    }
}

fn render_table(voices: &[VoiceInfo]) -> String {
    let name_width = voices
        .iter()
        .map(|v| v.short_name.len())
        .chain(std::iter::once("Name".len()))
        .max()
        .unwrap_or(4);
    let gender_width = voices
        .iter()
        .map(|v| v.gender.len())
        .chain(std::iter::once("Gender".len()))
        .max()
        .unwrap_or(6);

    let mut lines = vec![format!(
        "{:<name_width$}  {:<gender_width$}  Locale",
        "Name", "Gender"
    )];
    for voice in voices {
        lines.push(format!(
            "{:<name_width$}  {:<gender_width$}  {}",
            voice.short_name, voice.gender, voice.locale
        ));
    }
    lines.join("\n")
}
