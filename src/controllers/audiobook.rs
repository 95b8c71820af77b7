use crate::{
    domain::{
        audiobook::{
            AudiobookRequest, AudiobookService, AudiobookServiceApi, ChannelObserver, ProgressEvent,
            RunReport,
        },
        chunking::ChunkingStrategy,
        tts::{RateAdjustment, VoiceSelection},
    },
    error::{AppError, AppResult},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Arguments of one `create` invocation, as given on the command line
#[derive(Debug, Clone)]
pub struct CreateAudiobookCommand {
    pub text_file: PathBuf,
    pub output_file: Option<PathBuf>,
    pub voice: String,
    pub rate: RateAdjustment,
    pub chunking_strategy: String,
    pub retries: u32,
}

pub struct AudiobookController {
    audiobook_service: Arc<AudiobookService>,
    output_dir: Option<PathBuf>,
    fragment_dir: PathBuf,
}

impl AudiobookController {
    pub fn new(
        audiobook_service: Arc<AudiobookService>,
        output_dir: Option<PathBuf>,
        fragment_dir: PathBuf,
    ) -> Self {
        Self {
            audiobook_service,
            output_dir,
            fragment_dir,
        }
    }

    /// Create an audiobook, rendering progress until the run ends or Ctrl-C arrives
    pub async fn create(&self, command: CreateAudiobookCommand) -> AppResult<RunReport> {
        let output_file = resolve_output_path(
            &command.text_file,
            command.output_file.as_deref(),
            self.output_dir.as_deref(),
        );
        if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::InvalidArgument(format!(
                    "cannot create output directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        tracing::info!(output = %output_file.display(), "Output file resolved");

        let request = AudiobookRequest {
            text_file: command.text_file,
            output_file,
            voice: VoiceSelection::parse(&command.voice),
            rate: command.rate,
            strategy: ChunkingStrategy::from_name(&command.chunking_strategy),
            max_attempts: command.retries,
        };

        let (observer, events) = ChannelObserver::channel();
        let renderer = tokio::spawn(render_progress(events, progress_bar()));

        let service = self.audiobook_service.clone();
        let mut pipeline =
            tokio::spawn(async move { service.create_audiobook(&request, &observer).await });

        let result = tokio::select! {
            joined = &mut pipeline => match joined {
                Ok(result) => result.map_err(AppError::from),
                Err(e) => Err(AppError::Internal(anyhow::anyhow!("pipeline task failed: {}", e))),
            },
            _ = tokio::signal::ctrl_c() => {
                pipeline.abort();
                // wait for the task to drop its guards before reporting
                let _ = pipeline.await;
                tracing::warn!(
                    fragment_dir = %self.fragment_dir.display(),
                    "Interrupted. Fragment audio was kept, run the same command again to resume"
                );
                Err(AppError::Interrupted)
            }
        };

        // the channel closes once the pipeline task is gone
        let _ = renderer.await;

        result
    }
}

/// Output path rules: default to `<input stem>.mp3`; relative paths go under
/// `<output_dir>/<stem>/` when an output directory is configured.
pub fn resolve_output_path(
    text_file: &Path,
    output_file: Option<&Path>,
    output_dir: Option<&Path>,
) -> PathBuf {
    let output_file = match output_file {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = text_file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "audiobook".to_string());
            PathBuf::from(format!("{}.mp3", stem))
        }
    };

    match output_dir {
        Some(dir) if output_file.is_relative() => {
            let stem = output_file
                .file_stem()
                .map(|s| s.to_os_string())
                .unwrap_or_else(|| "audiobook".into());
            let file_name = output_file
                .file_name()
                .map(|s| s.to_os_string())
                .unwrap_or_else(|| "audiobook.mp3".into());
            dir.join(stem).join(file_name)
        }
        _ => output_file,
    }
}

fn progress_bar() -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) ETA {eta} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");

    let bar = ProgressBar::new(0);
    bar.set_style(style);
    bar
}

async fn render_progress(mut events: UnboundedReceiver<ProgressEvent>, bar: ProgressBar) {
    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Progress { current, total } => {
                bar.set_length(total as u64);
                bar.set_position(current as u64);
            }
            ProgressEvent::Status(status) => bar.set_message(status),
        }
    }
    bar.finish();
}
