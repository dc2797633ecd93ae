//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::constants::ANALYTICS_CHANNEL_CAPACITY;
use crate::services::{AnalyticsService, AnalyticsSink, NoopAnalytics, UploadFileService};
use crate::state::{AppState, LocalUploadState};
use anyhow::{Context, Result};
use omnivore_core::Config;
use omnivore_db::{
    PageRepository, PageRepositoryTrait, UploadFileRepository, UploadFileRepositoryTrait,
};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.json_logs())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let (storage, local_storage) = storage::setup_storage(&config).await?;

    let upload_files: Arc<dyn UploadFileRepositoryTrait> =
        Arc::new(UploadFileRepository::new(pool.clone()));
    let pages: Arc<dyn PageRepositoryTrait> = Arc::new(PageRepository::new(pool));

    let analytics: Arc<dyn AnalyticsSink> = if config.analytics_enabled() {
        Arc::new(AnalyticsService::new(ANALYTICS_CHANNEL_CAPACITY))
    } else {
        tracing::info!("Analytics disabled");
        Arc::new(NoopAnalytics)
    };

    let upload_file_service = UploadFileService::new(
        upload_files.clone(),
        pages,
        storage,
        analytics,
        config.upload_signed_url_expiry(),
        config.api_env().to_string(),
    );

    let local_uploads = local_storage.map(|storage| LocalUploadState {
        storage,
        upload_files,
        max_upload_size_bytes: config.max_local_upload_size_bytes(),
    });

    let state = Arc::new(AppState {
        upload_file_service,
        local_uploads,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
