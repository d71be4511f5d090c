use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while tracking, fetching or purging exchange-rate tables
#[derive(Debug, Error)]
pub enum TableError {
    /// A caller handed a malformed value to a setter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request never produced a usable response (timeout, connection, HTTP status)
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] reqwest::Error),

    /// A response arrived but carried no usable table name
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A required file or directory does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An operation was called out of sequence
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    /// Local filesystem failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TableError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only means "no table available right now"
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure(_) | Self::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
