use async_trait::async_trait;
use audiobook_creator::domain::audiobook::{ProgressEvent, ProgressObserver};
use audiobook_creator::domain::tts::{
    normalize_text, LanguageCode, SynthesisError, VoiceInfo, VoiceSettings,
};
use audiobook_creator::infrastructure::assembler::{AssemblyError, AudioAssembler};
use audiobook_creator::infrastructure::power::{SleepGuard, SleepInhibitor};
use audiobook_creator::infrastructure::repositories::TtsRepository;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Deterministic in-memory TTS provider.
///
/// Audio for a text is `[<normalized text>]` so outputs can be compared
/// byte for byte across runs.
#[derive(Default)]
pub struct FakeTts {
    calls: Mutex<Vec<String>>,
    fail_when_contains: Mutex<Option<String>>,
    transient_failures: AtomicUsize,
}

#[allow(dead_code)]
impl FakeTts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request whose text contains `needle` fails
    pub fn fail_when_contains(&self, needle: &str) {
        *self.fail_when_contains.lock().unwrap() = Some(needle.to_string());
    }

    pub fn stop_failing(&self) {
        *self.fail_when_contains.lock().unwrap() = None;
    }

    /// The next `count` requests fail, whatever their text
    pub fn fail_next(&self, count: usize) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn audio_for(text: &str) -> Vec<u8> {
        format!("[{}]", normalize_text(text)).into_bytes()
    }
}

#[async_trait]
impl TtsRepository for FakeTts {
    async fn synthesize(&self, text: &str, _voice: &VoiceSettings) -> Result<Vec<u8>, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());

        if !text.chars().any(char::is_alphanumeric) {
            return Err(SynthesisError::EmptyText);
        }

        let pending = self.transient_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.transient_failures.store(pending - 1, Ordering::SeqCst);
            return Err(SynthesisError::Service("connection reset".to_string()));
        }

        if let Some(needle) = self.fail_when_contains.lock().unwrap().as_deref() {
            if text.contains(needle) {
                return Err(SynthesisError::Service("503 Service Unavailable".to_string()));
            }
        }

        Ok(Self::audio_for(text))
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        Ok(vec![VoiceInfo {
            short_name: "Fake".to_string(),
            gender: "Neutral".to_string(),
            locale: "es-ES".to_string(),
        }])
    }

    fn voice_for_language(&self, language: LanguageCode) -> String {
        format!("fake-{}", language)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Assembler that concatenates fragment bytes in the order given
#[derive(Default)]
pub struct ConcatAssembler {
    assembled: Mutex<Vec<Vec<PathBuf>>>,
    fail: Mutex<bool>,
}

#[allow(dead_code)]
impl ConcatAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with_invalid_data(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn assembled(&self) -> Vec<Vec<PathBuf>> {
        self.assembled.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioAssembler for ConcatAssembler {
    async fn assemble(&self, fragments: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        self.assembled.lock().unwrap().push(fragments.to_vec());

        if *self.fail.lock().unwrap() {
            return Err(AssemblyError::Failed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }

        let mut joined = Vec::new();
        for fragment in fragments {
            joined.extend(tokio::fs::read(fragment).await?);
        }
        tokio::fs::write(output, joined).await?;

        Ok(())
    }
}

/// Counts sleep-prevention requests and their releases
#[derive(Default)]
pub struct RecordingInhibitor {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl RecordingInhibitor {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl SleepInhibitor for RecordingInhibitor {
    fn inhibit(&self, _reason: &str) -> SleepGuard {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let released = self.released.clone();
        SleepGuard::new(move || {
            released.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Keeps every notification for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProgressEvent>>,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Progress { current, total } => Some((current, total)),
                ProgressEvent::Status(_) => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Status(status) => Some(status),
                ProgressEvent::Progress { .. } => None,
            })
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_status(&self, status: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Status(status.to_string()));
    }

    fn on_progress(&self, current: usize, total: usize) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Progress { current, total });
    }
}
