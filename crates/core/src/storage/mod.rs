//! Object storage behind a single upload capability.
//!
//! Backends:
//! - S3-compatible: MinIO, AWS S3, Cloudflare R2 (AWS SDK)
//! - Local filesystem, development only (Apache OpenDAL)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            new_storage_backend(kind, &StorageConfig)          │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │ "MinIO" -> S3Backend         │ "Local" -> LocalBackend        │
//! │ HeadBucket / CreateBucket    │ create_dir("{bucket}/")        │
//! │ PutObject(content_length)    │ writer("{bucket}/{key}")       │
//! └──────────────────────────────┴───────────────────────────────┘
//!                  returns "{endpoint}/{bucket}/{filename}"
//! ```

mod backend;
mod error;
mod factory;
mod local;
mod s3;

pub use backend::{DEFAULT_CONTENT_TYPE, StorageBackend, content_length, object_url};
pub use error::{BoxError, StorageError};
pub use factory::{BackendKind, new_storage_backend};
pub use local::LocalBackend;
pub use s3::S3Backend;
