use serde::{Deserialize, Serialize};

/// How paragraphs are grouped into fragments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Merge consecutive small paragraphs to minimise service round-trips
    #[default]
    Smart,
    /// One paragraph maps to one or more fragments, never merged
    Legacy,
}

impl ChunkingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkingStrategy::Smart => "smart",
            ChunkingStrategy::Legacy => "legacy",
        }
    }

    /// Resolve a strategy name. Unknown names fall back to `Smart`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "smart" => ChunkingStrategy::Smart,
            "legacy" => ChunkingStrategy::Legacy,
            other => {
                tracing::warn!(
                    strategy = other,
                    "Unknown chunking strategy, falling back to smart"
                );
                ChunkingStrategy::Smart
            }
        }
    }
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
