use super::error::PipelineError;
use super::model::{AudiobookRequest, PipelineRun, PipelineState, RunReport};
use super::progress::{format_elapsed, format_fraction, ProgressObserver};
use super::retry::{synthesize_with_retry, RetryOutcome, RetryPolicy};
use crate::domain::chunking::chunk;
use crate::domain::tts::{detect_language, VoiceSelection, VoiceSettings};
use crate::infrastructure::assembler::AudioAssembler;
use crate::infrastructure::power::SleepInhibitor;
use crate::infrastructure::repositories::{FragmentRepository, TtsRepository};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub struct AudiobookService {
    tts_repo: Arc<dyn TtsRepository>,
    fragment_repo: Arc<FragmentRepository>,
    assembler: Arc<dyn AudioAssembler>,
    sleep_inhibitor: Arc<dyn SleepInhibitor>,
    retry_delay: Duration,
}

impl AudiobookService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        fragment_repo: Arc<FragmentRepository>,
        assembler: Arc<dyn AudioAssembler>,
        sleep_inhibitor: Arc<dyn SleepInhibitor>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            tts_repo,
            fragment_repo,
            assembler,
            sleep_inhibitor,
            retry_delay,
        }
    }
}

#[async_trait]
pub trait AudiobookServiceApi: Send + Sync {
    /// Produce one audiobook from a text file
    ///
    /// This operation:
    /// - Splits the document into fragments
    /// - Synthesizes missing fragments in index order, resuming a previous run
    /// - Concatenates the fragment audio and removes the working directory
    ///
    /// On failure the fragment directory is left untouched so the run can resume.
    async fn create_audiobook(
        &self,
        request: &AudiobookRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<RunReport, PipelineError>;
}

#[async_trait]
impl AudiobookServiceApi for AudiobookService {
    async fn create_audiobook(
        &self,
        request: &AudiobookRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<RunReport, PipelineError> {
        let mut run = PipelineRun::start();
        let span = tracing::info_span!("audiobook_run", run_id = %run.run_id);

        async move {
            // Held until every exit path, including Fatal
            let _sleep_guard = self.sleep_inhibitor.inhibit("Synthesizing audiobook");

            let result = self.drive(request, observer, &mut run).await;

            if let Err(e) = &result {
                let failed_in = run.state;
                run.transition(PipelineState::Fatal);
                tracing::error!(
                    error = %e,
                    state = %failed_in,
                    fragment_dir = %self.fragment_repo.dir().display(),
                    "Audiobook run failed, fragments kept for resumption"
                );
                observer.on_status(&format!("Failed: {}", e));
            }

            result
        }
        .instrument(span)
        .await
    }
}

impl AudiobookService {
    async fn drive(
        &self,
        request: &AudiobookRequest,
        observer: &dyn ProgressObserver,
        run: &mut PipelineRun,
    ) -> Result<RunReport, PipelineError> {
        run.transition(PipelineState::Preparing);
        tracing::info!(
            input = %request.text_file.display(),
            output = %request.output_file.display(),
            provider = self.tts_repo.provider_name(),
            voice = %request.voice,
            rate = %request.rate,
            strategy = %request.strategy,
            retries = request.max_attempts,
            "Starting audiobook creation"
        );

        let _lock = self.fragment_repo.prepare().await?;
        let document = read_document(&request.text_file).await?;
        let voice = self.resolve_voice(request, &document);

        run.transition(PipelineState::Chunking);
        let fragments = chunk(&document, request.strategy);
        if fragments.is_empty() {
            return Err(PipelineError::EmptyDocument(request.text_file.clone()));
        }
        run.total_fragments = fragments.len();
        tracing::info!(
            fragment_count = fragments.len(),
            document_chars = document.chars().count(),
            strategy = %request.strategy,
            "Document split into fragments"
        );

        run.transition(PipelineState::PerFragmentLoop);
        let policy = RetryPolicy::new(request.max_attempts, self.retry_delay);
        let total = fragments.len();

        for fragment in &fragments {
            run.current_index = fragment.index;

            if self.fragment_repo.exists_and_valid(fragment.index).await {
                tracing::debug!(fragment_index = fragment.index, "Fragment already synthesized, skipping");
                run.skipped += 1;
            } else {
                match synthesize_with_retry(self.tts_repo.as_ref(), fragment, &voice, &policy).await? {
                    RetryOutcome::Audio(audio) => {
                        self.fragment_repo.commit(fragment.index, &audio).await?;
                        run.synthesized += 1;
                    }
                    RetryOutcome::Empty => run.empty += 1,
                }
            }

            observer.on_progress(fragment.index + 1, total);
            observer.on_status(&format!("Fragment {}", format_fraction(fragment.index + 1, total)));
        }

        run.transition(PipelineState::Assembling);
        observer.on_status("Assembling audio fragments");
        observer.on_progress(total, total);

        let artifacts = self.fragment_repo.valid_artifacts(total).await?;
        if artifacts.is_empty() {
            return Err(PipelineError::NothingToAssemble);
        }
        self.assembler.assemble(&artifacts, &request.output_file).await?;

        run.transition(PipelineState::CleaningUp);
        if let Err(e) = self.fragment_repo.cleanup().await {
            // the audiobook exists; a leftover directory only costs disk space
            tracing::warn!(error = %e, "Could not remove fragment directory");
        }

        run.transition(PipelineState::Done);
        let elapsed = run.elapsed();
        observer.on_status(&format!("Completed in {}", format_elapsed(elapsed)));
        tracing::info!(
            output = %request.output_file.display(),
            total_fragments = total,
            synthesized = run.synthesized,
            skipped = run.skipped,
            empty = run.empty,
            elapsed = %format_elapsed(elapsed),
            "Audiobook created"
        );

        Ok(RunReport {
            run_id: run.run_id,
            output_file: request.output_file.clone(),
            voice_id: voice.voice_id,
            total_fragments: total,
            synthesized: run.synthesized,
            skipped: run.skipped,
            empty: run.empty,
            started_at: run.started_at,
            elapsed,
        })
    }

    fn resolve_voice(&self, request: &AudiobookRequest, document: &str) -> VoiceSettings {
        let voice_id = match &request.voice {
            VoiceSelection::Named(voice) => voice.clone(),
            VoiceSelection::Auto => {
                let language = detect_language(document);
                let voice = self.tts_repo.voice_for_language(language);
                tracing::info!(language = %language, voice = %voice, "Voice selected from document language");
                voice
            }
        };

        VoiceSettings {
            voice_id,
            rate: request.rate,
        }
    }
}

async fn read_document(path: &Path) -> Result<String, PipelineError> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::InputNotFound(path.to_path_buf()),
        _ => PipelineError::InputUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })
}
