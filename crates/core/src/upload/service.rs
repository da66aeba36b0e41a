//! Upload service implementation.

use std::sync::Arc;

use stowage_shared::StorageConfig;
use tokio::fs::File;
use tracing::{error, info};

use super::error::UploadError;
use crate::storage::{StorageBackend, StorageError, new_storage_backend};

/// Drives uploads through a storage backend.
///
/// Built once at startup and shared across requests. When backend
/// construction fails the process keeps serving with an uninitialized
/// service, and every upload fails with `UploadError::NotInitialized`.
#[derive(Clone)]
pub struct UploadService {
    backend: Option<Arc<dyn StorageBackend>>,
}

impl UploadService {
    /// Wrap an existing backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Service with no backend.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self { backend: None }
    }

    /// Build the backend named by `config.kind`.
    ///
    /// # Errors
    ///
    /// Returns the factory error if the backend cannot be constructed.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let backend = new_storage_backend(&config.kind, config).await?;
        Ok(Self::new(backend))
    }

    /// Whether a backend is attached.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    /// Kind of the attached backend, if any.
    #[must_use]
    pub fn backend_kind(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|b| b.kind())
    }

    /// Upload `stream` under `filename` and return the object URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotInitialized` when no backend is attached, or
    /// `UploadError::Storage` when the backend fails.
    pub async fn upload_file(
        &self,
        stream: &mut File,
        filename: &str,
    ) -> Result<String, UploadError> {
        info!(filename = %filename, "File upload requested");

        let Some(backend) = &self.backend else {
            error!(filename = %filename, "Upload rejected: storage backend is not initialized");
            return Err(UploadError::NotInitialized);
        };

        backend.upload_file(stream, filename).await.map_err(|e| {
            let err = UploadError::from(e);
            error!(
                filename = %filename,
                bucket = %backend.bucket(),
                cause = err.root_cause().as_deref().unwrap_or("unknown"),
                "Upload failed"
            );
            err
        })
    }
}
