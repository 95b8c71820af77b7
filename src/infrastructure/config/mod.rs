use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tts_provider: TtsProvider,
    pub aws_region: String,
    pub polly_engine: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub log_format: LogFormat,
    /// Working directory holding fragment audio between runs
    pub fragment_dir: PathBuf,
    /// Base directory for relative output paths
    pub output_dir: Option<PathBuf>,
    pub ffmpeg_path: PathBuf,
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Polly,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required when TTS_PROVIDER={1}")]
    Missing(&'static str, &'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let tts_provider = match var("TTS_PROVIDER", "polly").to_lowercase().as_str() {
            "polly" => TtsProvider::Polly,
            "openai" => TtsProvider::OpenAi,
            other => {
                return Err(ConfigError::Invalid {
                    name: "TTS_PROVIDER",
                    value: other.to_string(),
                })
            }
        };

        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());
        if tts_provider == TtsProvider::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::Missing("OPENAI_API_KEY", "openai"));
        }

        let polly_engine = var("POLLY_ENGINE", "neural").to_lowercase();
        if !["neural", "standard", "long-form", "generative"].contains(&polly_engine.as_str()) {
            return Err(ConfigError::Invalid {
                name: "POLLY_ENGINE",
                value: polly_engine,
            });
        }

        let retry_delay_raw = var("RETRY_DELAY_SECS", "5");
        let retry_delay_secs = retry_delay_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "RETRY_DELAY_SECS",
            value: retry_delay_raw.clone(),
        })?;

        let config = Config {
            tts_provider,
            aws_region: var("AWS_REGION", "eu-west-1"),
            polly_engine,
            openai_api_key,
            openai_model: var("OPENAI_TTS_MODEL", "tts-1"),
            log_format: match var("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            fragment_dir: PathBuf::from(var("FRAGMENT_DIR", "temp_audio_chunks")),
            output_dir: lookup("AUDIOBOOK_OUTPUT_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            ffmpeg_path: PathBuf::from(var("FFMPEG_PATH", "ffmpeg")),
            retry_delay_secs,
        };

        Ok(config)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
