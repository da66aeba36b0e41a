//! Upload error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Upload operation errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The service started without a backend.
    #[error("upload service is not initialized")]
    NotInitialized,

    /// The backend rejected the upload.
    #[error("unable to upload file")]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Innermost cause, for logging only.
    #[must_use]
    pub fn root_cause(&self) -> Option<String> {
        let mut cause: &dyn std::error::Error = self;
        let mut found = None;
        while let Some(next) = cause.source() {
            found = Some(next.to_string());
            cause = next;
        }
        found
    }
}
