//! Storage backend setup

use anyhow::{Context, Result};
use omnivore_core::{Config, StorageBackend};
use omnivore_storage::factory::create_local_storage;
use omnivore_storage::{create_storage, LocalStorage, Storage};
use std::sync::Arc;

/// Create the configured storage backend. The local backend is also returned
/// as its concrete type so its upload receiver can verify tokens.
pub async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn Storage>, Option<Arc<LocalStorage>>)> {
    match config.storage_backend() {
        StorageBackend::Local => {
            let (storage, local) = create_local_storage(config)
                .await
                .context("Failed to initialize local storage")?;
            Ok((storage, Some(local)))
        }
        StorageBackend::S3 => {
            let storage = create_storage(config)
                .await
                .context("Failed to initialize S3 storage")?;
            Ok((storage, None))
        }
    }
}
