pub mod fragment_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod tts_repository;

pub use fragment_repository::{DirectoryLock, FragmentRepository, StoreError};
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use tts_repository::TtsRepository;
