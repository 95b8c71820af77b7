//! Keeps the machine awake while an audiobook is being produced.

/// Active sleep-prevention request. Dropping it releases the request.
pub struct SleepGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SleepGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard for platforms, or failures, where nothing was acquired
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for SleepGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

pub trait SleepInhibitor: Send + Sync {
    /// Ask the OS not to sleep until the returned guard is dropped.
    /// Failure to acquire is never fatal for a run.
    fn inhibit(&self, reason: &str) -> SleepGuard;
}

/// OS-backed inhibitor. The request belongs to the process, so the OS drops it
/// even when the process is killed without running destructors.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSleepInhibitor;

impl SleepInhibitor for SystemSleepInhibitor {
    fn inhibit(&self, reason: &str) -> SleepGuard {
        let awake = keepawake::Builder::default()
            .idle(true)
            .sleep(true)
            .reason(reason)
            .app_name("audiobook-creator")
            .app_reverse_domain("io.github.audiobook-creator")
            .create();

        match awake {
            Ok(awake) => {
                tracing::debug!("System sleep inhibited");
                SleepGuard::new(move || {
                    drop(awake);
                    tracing::debug!("System sleep allowed again");
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not prevent system sleep, continuing anyway");
                SleepGuard::noop()
            }
        }
    }
}
