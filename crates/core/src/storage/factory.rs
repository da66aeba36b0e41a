//! Backend selection by discriminator string.

use std::sync::Arc;

use stowage_shared::StorageConfig;
use tracing::debug;

use super::backend::StorageBackend;
use super::error::StorageError;
use super::local::LocalBackend;
use super::s3::S3Backend;

/// Backend kinds this build knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// S3-compatible object store.
    MinIo,
    /// Local filesystem (development only).
    Local,
}

impl BackendKind {
    /// Every supported kind.
    pub const ALL: [Self; 2] = [Self::MinIo, Self::Local];

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn parse(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == kind)
    }

    /// Discriminator string for this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MinIo => S3Backend::KIND,
            Self::Local => LocalBackend::KIND,
        }
    }
}

/// Construct the backend named by `kind` from `config`.
///
/// New backends are added here; callers only ever see
/// `Arc<dyn StorageBackend>`.
///
/// # Errors
///
/// Returns `StorageError::UnsupportedBackend` for an unknown kind, or
/// `StorageError::InitFailed` if the backend cannot be brought up.
pub async fn new_storage_backend(
    kind: &str,
    config: &StorageConfig,
) -> Result<Arc<dyn StorageBackend>, StorageError> {
    let kind = BackendKind::parse(kind).ok_or_else(|| StorageError::unsupported(kind))?;
    debug!(kind = kind.name(), "Constructing storage backend");

    let backend: Arc<dyn StorageBackend> = match kind {
        BackendKind::MinIo => Arc::new(S3Backend::connect(config).await?),
        BackendKind::Local => Arc::new(LocalBackend::connect(config).await?),
    };
    Ok(backend)
}
