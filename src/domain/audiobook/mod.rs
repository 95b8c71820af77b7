pub mod error;
pub mod model;
pub mod progress;
pub mod retry;
pub mod service;

pub use error::PipelineError;
pub use model::{AudiobookRequest, PipelineRun, PipelineState, RunReport};
pub use progress::{ChannelObserver, NoopObserver, ProgressEvent, ProgressObserver, TracingObserver};
pub use retry::{synthesize_with_retry, RetryExhausted, RetryOutcome, RetryPolicy};
pub use service::{AudiobookService, AudiobookServiceApi};
