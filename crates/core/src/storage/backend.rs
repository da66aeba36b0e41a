//! Backend trait and helpers shared by every implementation.

use std::io::SeekFrom;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncSeek, AsyncSeekExt};

use super::error::StorageError;

/// Content type attached to every stored object.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An object store that accepts whole-file uploads.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload `stream` under `filename` and return the object URL.
    ///
    /// The filename is used verbatim as the object key. An existing object
    /// with the same key is overwritten.
    async fn upload_file(&self, stream: &mut File, filename: &str) -> Result<String, StorageError>;

    /// Backend discriminator this instance was built for.
    fn kind(&self) -> &'static str;

    /// Target bucket.
    fn bucket(&self) -> &str;
}

/// Determine the stream length by seeking to the end, then rewind to offset 0.
///
/// The transfer protocols need the length up front, so this runs before
/// every upload.
pub async fn content_length<S>(stream: &mut S) -> std::io::Result<u64>
where
    S: AsyncSeek + Unpin + ?Sized,
{
    let size = stream.seek(SeekFrom::End(0)).await?;
    stream.seek(SeekFrom::Start(0)).await?;
    Ok(size)
}

/// Build the URL returned for a stored object: `{endpoint}/{bucket}/{filename}`.
///
/// Plain concatenation. The result does not account for virtual-host
/// addressing or bucket policy and may not be publicly fetchable.
#[must_use]
pub fn object_url(endpoint: &str, bucket: &str, filename: &str) -> String {
    format!("{endpoint}/{bucket}/{filename}")
}
