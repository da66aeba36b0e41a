//! Application-wide error types.
//!
//! These are the only errors that cross the HTTP boundary. Their `Display`
//! output is the exact user-facing message; internal causes never reach it.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppError {
    /// The multipart `file` part is missing or unreadable.
    #[error("File is required")]
    FileRequired,

    /// The uploaded part could not be staged for transfer.
    #[error("Failed to open file")]
    StreamOpenFailed,

    /// The storage pipeline rejected the upload.
    #[error("File upload failed")]
    UploadFailed,
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::FileRequired => 400,
            Self::StreamOpenFailed | Self::UploadFailed => 500,
        }
    }

    /// Returns the error code used in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::FileRequired => "VALIDATION_FAILED",
            Self::StreamOpenFailed => "STREAM_OPEN_FAILED",
            Self::UploadFailed => "UPLOAD_FAILED",
        }
    }
}
