use super::retry::RetryExhausted;
use crate::domain::tts::SynthesisError;
use crate::infrastructure::assembler::AssemblyError;
use crate::infrastructure::repositories::StoreError;
use std::path::PathBuf;

/// Conditions that abort an audiobook run. Fragment audio already written is
/// left in place so the next run can resume.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input file '{0}' was not found")]
    InputNotFound(PathBuf),
    #[error("could not read input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input file '{0}' contains no text to synthesize")]
    EmptyDocument(PathBuf),
    #[error("fragment store error: {0}")]
    Store(#[from] StoreError),
    #[error("could not synthesize fragment {fragment} after {attempts} attempts: {last_error}")]
    RetryExhausted {
        /// 1-based, as shown to users
        fragment: usize,
        attempts: u32,
        last_error: SynthesisError,
    },
    #[error("no audio fragments found to assemble")]
    NothingToAssemble,
    #[error("audio assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
}

impl From<RetryExhausted> for PipelineError {
    fn from(err: RetryExhausted) -> Self {
        PipelineError::RetryExhausted {
            fragment: err.index + 1,
            attempts: err.attempts,
            last_error: err.last_error,
        }
    }
}
