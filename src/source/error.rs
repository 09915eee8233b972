//! Errors raised while reading a discovery source.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The local file could not be opened.
    #[error("failed to open {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure talking to a remote source.
    #[error("failed to fetch: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The remote source answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Malformed delimited content. The whole read is discarded.
    #[error("failed to parse delimited content: {0}")]
    Parse(#[from] csv::Error),

    /// The blocking read task panicked or was cancelled.
    #[error("read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SourceError {
    /// Short, stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Read { .. } => "read",
            SourceError::Fetch(_) | SourceError::Status { .. } => "fetch",
            SourceError::Parse(_) => "parse",
            SourceError::Task(_) => "task",
        }
    }
}
