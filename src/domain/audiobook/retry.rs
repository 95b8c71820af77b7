use crate::domain::chunking::Fragment;
use crate::domain::tts::{SynthesisError, VoiceSettings};
use crate::infrastructure::repositories::TtsRepository;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay retry policy for one fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome {
    Audio(Vec<u8>),
    /// The provider found nothing to speak; no audio is needed
    Empty,
}

#[derive(Debug, thiserror::Error)]
#[error("fragment {index} failed {attempts} attempts: {last_error}")]
pub struct RetryExhausted {
    pub index: usize,
    pub attempts: u32,
    pub last_error: SynthesisError,
}

/// Synthesize one fragment, retrying transient failures with a fixed delay.
pub async fn synthesize_with_retry(
    tts_repo: &dyn TtsRepository,
    fragment: &Fragment,
    voice: &VoiceSettings,
    policy: &RetryPolicy,
) -> Result<RetryOutcome, RetryExhausted> {
    let mut last_error = SynthesisError::Service("no attempt made".to_string());

    for attempt in 1..=policy.max_attempts {
        match tts_repo.synthesize(&fragment.text, voice).await {
            Ok(audio) if !audio.is_empty() => {
                tracing::debug!(
                    fragment_index = fragment.index,
                    attempt,
                    audio_size_bytes = audio.len(),
                    "Fragment synthesized"
                );
                return Ok(RetryOutcome::Audio(audio));
            }
            Ok(_) => last_error = SynthesisError::EmptyAudio,
            Err(e) if e.is_empty_text() => {
                tracing::debug!(
                    fragment_index = fragment.index,
                    "Fragment has nothing to speak, treating as done"
                );
                return Ok(RetryOutcome::Empty);
            }
            Err(e) => last_error = e,
        }

        tracing::warn!(
            fragment_index = fragment.index,
            attempt,
            max_attempts = policy.max_attempts,
            error = %last_error,
            "Fragment synthesis failed"
        );

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(RetryExhausted {
        index: fragment.index,
        attempts: policy.max_attempts,
        last_error,
    })
}
