//! Error types for reading and writing map documents and settings

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by file-backed persistence.
///
/// Migration itself never fails; only the I/O around it does.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents were not valid JSON for the expected type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings parsed but hold a value migration cannot use.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
