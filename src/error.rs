use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("input file not readable: {}: {source}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parameter discovery failed for {domain}: {reason}")]
    DiscoveryFailure { domain: String, reason: String },

    #[error("parameter filtering failed: {reason}")]
    FilterFailure { reason: String },

    #[error("content probe failed for {url}: {reason}")]
    ProbeFailure { url: String, reason: String },

    #[error("confirmation request to {url} failed: {source}")]
    ProbeTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("expected artifact is missing: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("{tool} did not finish within {timeout:?}")]
    ToolTimeout { tool: String, timeout: Duration },

    #[error("failed to spawn {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    LogSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    /// Only unreadable inputs and setup failures stop a run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::InputNotFound { .. } | ScanError::LogSetup { .. } | ScanError::HttpClient(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
