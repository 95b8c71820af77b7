use std::time::Duration;
use tokio::sync::mpsc;

/// Receives run notifications. Calls are fire-and-forget: implementations must
/// not block, and the pipeline never waits for a presentation layer.
pub trait ProgressObserver: Send + Sync {
    fn on_status(&self, status: &str);
    fn on_progress(&self, current: usize, total: usize);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status(String),
    Progress { current: usize, total: usize },
}

/// Forwards notifications over an unbounded channel, for a pipeline driven
/// from a background task
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelObserver {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_status(&self, status: &str) {
        // receiver gone means nobody is watching
        let _ = self.sender.send(ProgressEvent::Status(status.to_string()));
    }

    fn on_progress(&self, current: usize, total: usize) {
        let _ = self.sender.send(ProgressEvent::Progress { current, total });
    }
}

/// Writes notifications to the log
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_status(&self, status: &str) {
        tracing::info!(status, "Audiobook status");
    }

    fn on_progress(&self, current: usize, total: usize) {
        tracing::info!(current, total, progress = %format_fraction(current, total), "Audiobook progress");
    }
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_status(&self, _status: &str) {}
    fn on_progress(&self, _current: usize, _total: usize) {}
}

/// `3/10 (30.0%)`
pub fn format_fraction(current: usize, total: usize) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        current as f64 * 100.0 / total as f64
    };
    format!("{}/{} ({:.1}%)", current, total, percent)
}

/// Whole seconds as `H:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
