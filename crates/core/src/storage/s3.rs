//! S3-compatible backend (MinIO, AWS S3, Cloudflare R2) on the AWS SDK.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use stowage_shared::StorageConfig;
use tokio::fs::File;
use tracing::{debug, info};

use super::backend::{DEFAULT_CONTENT_TYPE, StorageBackend, content_length, object_url};
use super::error::StorageError;

/// Backend that writes objects to an S3-compatible store with path-style
/// addressing.
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
    endpoint_url: String,
}

impl S3Backend {
    /// Discriminator for this backend.
    pub const KIND: &'static str = "MinIO";

    /// Build a client from `config` and make sure the bucket exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InitFailed` if the endpoint is missing, the
    /// bucket lookup fails, or the bucket cannot be created.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.endpoint.trim().is_empty() {
            return Err(StorageError::init_msg("storage endpoint is not configured"));
        }
        if config.bucket.trim().is_empty() {
            return Err(StorageError::init_msg("storage bucket is not configured"));
        }

        let endpoint_url = config.endpoint_url();
        let client = Self::create_client(config, &endpoint_url).await;
        Self::ensure_bucket(&client, &config.bucket).await?;

        info!(endpoint = %endpoint_url, bucket = %config.bucket, "S3 storage backend ready");

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            endpoint_url,
        })
    }

    async fn create_client(config: &StorageConfig, endpoint_url: &str) -> Client {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "stowage",
        );

        // The upload pipeline never retries, so the SDK must not either.
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint_url)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true)
                .build(),
        )
    }

    async fn ensure_bucket(client: &Client, bucket: &str) -> Result<(), StorageError> {
        match client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().is_some_and(HeadBucketError::is_not_found) => {
                info!(bucket = %bucket, "Creating bucket");
                client
                    .create_bucket()
                    .bucket(bucket)
                    .send()
                    .await
                    .map_err(|e| StorageError::init("failed to create bucket", e))?;
                Ok(())
            }
            Err(err) => Err(StorageError::init("failed to check bucket", err)),
        }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn upload_file(&self, stream: &mut File, filename: &str) -> Result<String, StorageError> {
        let size = content_length(stream).await.map_err(StorageError::transfer)?;
        debug!(bucket = %self.bucket, key = %filename, size, "Uploading object");

        // The clone shares the rewound cursor; the SDK streams from it.
        let handle = stream.try_clone().await.map_err(StorageError::transfer)?;
        let body = ByteStream::read_from()
            .file(handle)
            .build()
            .await
            .map_err(StorageError::transfer)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(filename)
            .content_length(i64::try_from(size).map_err(StorageError::transfer)?)
            .content_type(DEFAULT_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(StorageError::transfer)?;

        Ok(object_url(&self.endpoint_url, &self.bucket, filename))
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
