//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p omnivore-api`. Repositories are
//! in-memory fakes; storage is a real `LocalStorage` in a temp directory.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use fakes::{InMemoryPageRepository, InMemoryUploadFileRepository, RecordingAnalytics};
use omnivore_api::auth::jwt::encode_token;
use omnivore_api::auth::Claims;
use omnivore_api::constants;
use omnivore_api::services::UploadFileService;
use omnivore_api::setup::routes;
use omnivore_api::state::{AppState, LocalUploadState};
use omnivore_core::{BaseConfig, Config, StorageBackend, UploadServiceConfig};
use omnivore_storage::LocalStorage;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-32-plus-chars";
pub const TEST_BASE_URL: &str = "http://localhost:4000/uploads";
pub const TEST_UPLOAD_ENDPOINT: &str = "http://localhost:4000/api/uploads/local";
pub const MAX_UPLOAD_BYTES: usize = 1024;

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, fakes, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub upload_files: Arc<InMemoryUploadFileRepository>,
    pub pages: Arc<InMemoryPageRepository>,
    pub analytics: Arc<RecordingAnalytics>,
    pub storage: Arc<LocalStorage>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &std::path::Path {
        self._temp_dir.path()
    }
}

pub fn create_test_config(storage_path: &str) -> Config {
    Config(Box::new(UploadServiceConfig {
        base: BaseConfig {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
            http_concurrency_limit: 64,
            json_logs: false,
        },
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some(storage_path.to_string()),
        local_storage_base_url: Some(TEST_BASE_URL.to_string()),
        local_upload_endpoint: Some(TEST_UPLOAD_ENDPOINT.to_string()),
        upload_signed_url_expiry_secs: 900,
        max_local_upload_size_bytes: MAX_UPLOAD_BYTES,
        analytics_enabled: false,
        api_env: "test".to_string(),
    }))
}

/// Setup test app with in-memory repositories and local storage.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage_path = temp_dir
        .path()
        .to_str()
        .expect("Temp dir path is not UTF-8")
        .to_string();

    let config = create_test_config(&storage_path);

    let storage = Arc::new(
        LocalStorage::new(
            temp_dir.path(),
            TEST_BASE_URL.to_string(),
            TEST_UPLOAD_ENDPOINT.to_string(),
            TEST_JWT_SECRET,
        )
        .await
        .expect("Failed to create local storage"),
    );

    let upload_files = Arc::new(InMemoryUploadFileRepository::default());
    let pages = Arc::new(InMemoryPageRepository::default());
    let analytics = Arc::new(RecordingAnalytics::default());

    let upload_file_service = UploadFileService::new(
        upload_files.clone(),
        pages.clone(),
        storage.clone(),
        analytics.clone(),
        config.upload_signed_url_expiry(),
        config.api_env().to_string(),
    );

    let state = Arc::new(AppState {
        upload_file_service,
        local_uploads: Some(LocalUploadState {
            storage: storage.clone(),
            upload_files: upload_files.clone(),
            max_upload_size_bytes: config.max_local_upload_size_bytes(),
        }),
    });

    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        upload_files,
        pages,
        analytics,
        storage,
        _temp_dir: temp_dir,
    }
}

/// Bearer token for `user_id`, signed with the test secret.
pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        uid: user_id,
        iat: None,
        exp: None,
    };
    encode_token(&claims, TEST_JWT_SECRET).expect("Failed to sign test token")
}
