//! Storage backends and upload pipeline for Stowage.
//!
//! This crate has ZERO web dependencies. It owns the object-store
//! abstraction and the service that drives uploads through it.
//!
//! # Modules
//!
//! - `storage` - Backend trait, S3 and local filesystem backends, factory
//! - `upload` - Upload service with an explicit uninitialized state

pub mod storage;
pub mod upload;
