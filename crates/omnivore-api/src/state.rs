//! Application state shared by all handlers

use crate::services::UploadFileService;
use omnivore_db::UploadFileRepositoryTrait;
use omnivore_storage::LocalStorage;
use std::sync::Arc;

/// Receiver for uploads signed by the local storage backend.
#[derive(Clone)]
pub struct LocalUploadState {
    pub storage: Arc<LocalStorage>,
    pub upload_files: Arc<dyn UploadFileRepositoryTrait>,
    pub max_upload_size_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub upload_file_service: UploadFileService,
    /// `None` unless the local storage backend is active
    pub local_uploads: Option<LocalUploadState>,
}
