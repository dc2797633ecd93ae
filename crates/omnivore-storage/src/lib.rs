//! Omnivore Storage Library
//!
//! Storage abstraction for uploaded files, with S3-compatible and local
//! filesystem backends.
//!
//! # Storage key format
//!
//! Every upload lives at `u/{upload_file_id}/{file_name}`. Keys must not
//! start with `/` or contain `.`, `..` or empty segments. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod upload_token;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_upload_file_path_name;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use omnivore_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use upload_token::UploadGrant;
