pub mod chunker;
pub mod strategy;

pub use chunker::{chunk, chunk_with_limit, Fragment, CHUNK_MAX_SIZE};
pub use strategy::ChunkingStrategy;
