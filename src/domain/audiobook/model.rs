use crate::domain::chunking::ChunkingStrategy;
use crate::domain::tts::{RateAdjustment, VoiceSelection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Everything one run needs to know about the book being produced
#[derive(Debug, Clone)]
pub struct AudiobookRequest {
    pub text_file: PathBuf,
    pub output_file: PathBuf,
    pub voice: VoiceSelection,
    pub rate: RateAdjustment,
    pub strategy: ChunkingStrategy,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Preparing,
    Chunking,
    PerFragmentLoop,
    Assembling,
    CleaningUp,
    Done,
    Fatal,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Preparing => "preparing",
            PipelineState::Chunking => "chunking",
            PipelineState::PerFragmentLoop => "per_fragment_loop",
            PipelineState::Assembling => "assembling",
            PipelineState::CleaningUp => "cleaning_up",
            PipelineState::Done => "done",
            PipelineState::Fatal => "fatal",
        };
        write!(f, "{}", name)
    }
}

/// Transient bookkeeping for one invocation; never persisted
#[derive(Debug)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub state: PipelineState,
    pub started_at: DateTime<Utc>,
    started: Instant,
    pub total_fragments: usize,
    pub current_index: usize,
    pub synthesized: usize,
    pub skipped: usize,
    pub empty: usize,
}

impl PipelineRun {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: PipelineState::Idle,
            started_at: Utc::now(),
            started: Instant::now(),
            total_fragments: 0,
            current_index: 0,
            synthesized: 0,
            skipped: 0,
            empty: 0,
        }
    }

    pub fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "Pipeline state transition");
        self.state = next;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub output_file: PathBuf,
    pub voice_id: String,
    pub total_fragments: usize,
    pub synthesized: usize,
    pub skipped: usize,
    pub empty: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}
