use crate::domain::audiobook::PipelineError;
use crate::domain::tts::SynthesisError;
use crate::infrastructure::config::ConfigError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("TTS provider error: {0}")]
    Provider(#[from] SynthesisError),

    #[error("Interrupted by user")]
    Interrupted,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::InvalidArgument(_) => 2,
            Self::Interrupted => 130,
            Self::Pipeline(_) | Self::Provider(_) | Self::Internal(_) => 1,
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
