//! Upload service.
//!
//! Sits between the HTTP layer and the storage backend. It either holds a
//! backend or is explicitly uninitialized; there is no implicit zero value.

mod error;
mod service;

pub use error::UploadError;
pub use service::UploadService;
