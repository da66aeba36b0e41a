//! Shared configuration and error types for Stowage.
//!
//! This crate provides the pieces every other crate leans on:
//! - Layered application configuration (`AppConfig`)
//! - The HTTP-facing error taxonomy (`AppError`)

pub mod config;
pub mod error;

pub use config::{AppConfig, LogFormat, LoggingConfig, ServerConfig, StorageConfig, UploadConfig};
pub use error::{AppError, AppResult};
