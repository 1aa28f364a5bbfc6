use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// One upstream source failed or timed out. Absorbed by the fetcher.
    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The output file could not be written. Fatal to the run.
    #[error("failed to persist {}: {source}", path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("video render failed: {0}")]
    Render(String),

    #[error("config: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn provider(provider: &str, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}
