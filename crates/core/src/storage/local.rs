//! Local filesystem backend on Apache OpenDAL (development only).

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{Operator, Writer, services};
use stowage_shared::StorageConfig;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use super::backend::{StorageBackend, content_length, object_url};
use super::error::StorageError;

/// Read size used when copying the stream into the writer.
const CHUNK_SIZE: usize = 64 * 1024;

/// Staging directory under the root. Objects are written here and renamed
/// into the bucket on close.
const STAGING_DIR: &str = ".stowage-tmp";

/// Backend that stores objects under `{root}/{bucket}/{filename}`.
#[derive(Clone)]
pub struct LocalBackend {
    operator: Operator,
    bucket: String,
    endpoint_url: String,
}

impl LocalBackend {
    /// Discriminator for this backend.
    pub const KIND: &'static str = "Local";

    /// Open the storage root and make sure the bucket directory exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InitFailed` if the root is not valid UTF-8 or the
    /// bucket directory cannot be created.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::init_msg("storage bucket is not configured"));
        }
        let root = config
            .root
            .to_str()
            .ok_or_else(|| StorageError::init_msg("invalid storage root path"))?;

        let staging = config.root.join(STAGING_DIR);
        let staging = staging
            .to_str()
            .ok_or_else(|| StorageError::init_msg("invalid storage root path"))?;

        let operator = Operator::new(services::Fs::default().root(root).atomic_write_dir(staging))
            .map_err(|e| StorageError::init("failed to open storage root", e))?
            .finish();

        let bucket_dir = format!("{}/", config.bucket);
        let exists = operator
            .exists(&bucket_dir)
            .await
            .map_err(|e| StorageError::init("failed to check bucket", e))?;
        if !exists {
            info!(root = %root, bucket = %config.bucket, "Creating bucket");
            operator
                .create_dir(&bucket_dir)
                .await
                .map_err(|e| StorageError::init("failed to create bucket", e))?;
        }

        Ok(Self {
            operator,
            bucket: config.bucket.clone(),
            endpoint_url: format!("file://{}", root.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn upload_file(&self, stream: &mut File, filename: &str) -> Result<String, StorageError> {
        let size = content_length(stream).await.map_err(StorageError::transfer)?;
        let key = format!("{}/{}", self.bucket, filename);
        debug!(key = %key, size, "Writing object");

        let mut writer = self
            .operator
            .writer(&key)
            .await
            .map_err(StorageError::transfer)?;

        copy_exact(stream, &mut writer, size).await?;

        Ok(object_url(&self.endpoint_url, &self.bucket, filename))
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Copy exactly `size` bytes from `reader` into `writer` and commit.
///
/// The byte count is checked before `close`; on a mismatch the write is
/// aborted so no truncated object is committed.
async fn copy_exact<R>(reader: &mut R, writer: &mut Writer, size: u64) -> Result<(), StorageError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    loop {
        let n = reader.read(&mut buf).await.map_err(StorageError::transfer)?;
        if n == 0 {
            break;
        }
        writer
            .write(Bytes::copy_from_slice(&buf[..n]))
            .await
            .map_err(StorageError::transfer)?;
        written += n as u64;
    }

    if written != size {
        if let Err(e) = writer.abort().await {
            warn!(error = %e, "Failed to abort partial write");
        }
        return Err(StorageError::transfer(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("stream yielded {written} of {size} bytes"),
        )));
    }

    writer.close().await.map_err(StorageError::transfer)?;
    Ok(())
}
