pub mod ffmpeg;

pub use ffmpeg::FfmpegAssembler;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("{0} not found, install it and make sure it is on PATH")]
    ToolNotFound(PathBuf),
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("assembly I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Joins fragment audio files, in the given order, into one output file
/// without re-encoding.
#[async_trait]
pub trait AudioAssembler: Send + Sync {
    async fn assemble(&self, fragments: &[PathBuf], output: &Path) -> Result<(), AssemblyError>;
}
