use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A record could not be converted to or from its persisted shape.
    #[error("invalid record at `{path}`: {message}")]
    InvalidRecord { path: String, message: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an invalid-record error for the given record path.
    pub fn invalid_record(path: impl ToString, message: impl ToString) -> Self {
        StorageError::InvalidRecord {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}
