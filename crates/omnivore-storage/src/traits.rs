//! Storage abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid upload token: {0}")]
    InvalidToken(String),

    #[error("Upload token has expired")]
    TokenExpired,

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend for uploaded files.
///
/// Clients never stream uploads through the API for S3: they receive a
/// signed PUT URL and write the object directly.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Signed URL that accepts a single HTTP PUT of `content_type` content to
    /// `storage_key` until `expires_in` has elapsed.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Publicly readable URL of the object at `storage_key`.
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
