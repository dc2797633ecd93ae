//! Omnivore Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! URL/filename helpers shared by the database, storage, and API crates.

pub mod config;
pub mod error;
pub mod file_url;
pub mod models;
pub mod slug;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use file_url::{FileUrlError, UrlKind};
pub use storage_types::StorageBackend;
