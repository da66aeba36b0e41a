//! Storage error types.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed underlying cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested backend kind has no implementation.
    #[error("unsupported storage backend: {0}")]
    UnsupportedBackend(String),

    /// Client creation, bucket lookup, or bucket creation failed.
    #[error("failed to initialize storage backend: {message}")]
    InitFailed {
        /// What was being attempted.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// The object could not be written. The message is deliberately generic;
    /// the cause is only reachable through `source()`.
    #[error("unable to upload file")]
    TransferFailed {
        /// Underlying cause.
        #[source]
        source: BoxError,
    },
}

impl StorageError {
    /// Create an unsupported backend error.
    #[must_use]
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedBackend(kind.into())
    }

    /// Create an initialization error with an attached cause.
    #[must_use]
    pub fn init(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::InitFailed {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an initialization error with no underlying cause.
    #[must_use]
    pub fn init_msg(message: impl Into<String>) -> Self {
        Self::InitFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transfer error.
    #[must_use]
    pub fn transfer(source: impl Into<BoxError>) -> Self {
        Self::TransferFailed {
            source: source.into(),
        }
    }
}
