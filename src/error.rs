// ⚠️ Error types for the entity store
// One enum for everything the library can fail with; the binary wraps it in anyhow.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Backing file could not be read or written
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but is not one valid JSON object
    #[error("malformed storage file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Type tag is not one of the known entity kinds
    #[error("unknown entity type '{0}'")]
    UnknownType(String),

    #[error("record '{0}' has no '__class__' tag")]
    MissingTypeTag(String),

    /// Record is present but one of its fields is unusable
    #[error("invalid field '{field}': {reason}")]
    InvalidRecord { field: String, reason: String },

    #[error("attribute '{0}' can't be updated")]
    ReadOnlyAttribute(String),

    #[error("no instance found for key '{0}'")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
