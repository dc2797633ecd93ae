//! Configuration module
//!
//! Configuration is read once from the environment (after `.env` has been
//! loaded by `dotenvy`) and then passed around explicitly.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_SIGNED_URL_EXPIRY_SECS: u64 = 15 * 60;
const MAX_LOCAL_UPLOAD_SIZE_MB: usize = 50;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Server, database, and auth settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
    /// Max in-flight HTTP requests across the server
    pub http_concurrency_limit: usize,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Settings for the upload workflow and the storage it signs URLs for
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Where clients PUT bytes for local signed upload URLs
    pub local_upload_endpoint: Option<String>,
    pub upload_signed_url_expiry_secs: u64,
    pub max_local_upload_size_bytes: usize,
    pub analytics_enabled: bool,
    pub api_env: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn inner(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.inner().base.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn json_logs(&self) -> bool {
        self.inner().base.json_logs
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    /// Upload receiver URL for the local backend, defaulting to this server
    pub fn local_upload_endpoint(&self) -> String {
        self.inner()
            .local_upload_endpoint
            .clone()
            .unwrap_or_else(|| {
                format!(
                    "http://localhost:{}/api/uploads/local",
                    self.inner().base.server_port
                )
            })
    }

    pub fn upload_signed_url_expiry(&self) -> Duration {
        Duration::from_secs(self.inner().upload_signed_url_expiry_secs)
    }

    pub fn max_local_upload_size_bytes(&self) -> usize {
        self.inner().max_local_upload_size_bytes
    }

    pub fn analytics_enabled(&self) -> bool {
        self.inner().analytics_enabled
    }

    pub fn api_env(&self) -> &str {
        &self.inner().api_env
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_production = is_production_env(&environment);

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment: environment.clone(),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            json_logs: env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let config = UploadServiceConfig {
            base,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            local_upload_endpoint: env::var("LOCAL_UPLOAD_ENDPOINT").ok(),
            upload_signed_url_expiry_secs: env::var("UPLOAD_SIGNED_URL_EXPIRY_SECS")
                .unwrap_or_else(|_| UPLOAD_SIGNED_URL_EXPIRY_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_SIGNED_URL_EXPIRY_SECS),
            max_local_upload_size_bytes: env::var("MAX_LOCAL_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| MAX_LOCAL_UPLOAD_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_LOCAL_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            analytics_enabled: env::var("ANALYTICS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            api_env: env::var("API_ENV").unwrap_or(environment),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.upload_signed_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_SIGNED_URL_EXPIRY_SECS must be greater than zero"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when STORAGE_BACKEND=s3"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when STORAGE_BACKEND=s3"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when STORAGE_BACKEND=local"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(backend: StorageBackend) -> UploadServiceConfig {
        UploadServiceConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                database_url: "postgres://localhost/omnivore".to_string(),
                db_max_connections: 5,
                db_timeout_seconds: 5,
                jwt_secret: "a-very-long-test-secret-of-at-least-32-chars".to_string(),
                environment: "test".to_string(),
                http_concurrency_limit: 100,
                json_logs: false,
            },
            storage_backend: backend,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            local_upload_endpoint: None,
            upload_signed_url_expiry_secs: 900,
            max_local_upload_size_bytes: 1024,
            analytics_enabled: false,
            api_env: "test".to_string(),
        }
    }

    #[test]
    fn test_s3_backend_requires_bucket_and_region() {
        let mut config = test_config(StorageBackend::S3);
        assert!(config.validate().is_err());

        config.s3_bucket = Some("omnivore-uploads".to_string());
        assert!(config.validate().is_err());

        config.aws_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_backend_requires_path_and_url() {
        let mut config = test_config(StorageBackend::Local);
        config.local_storage_path = Some("/tmp/omnivore".to_string());
        assert!(config.validate().is_err());

        config.local_storage_base_url = Some("http://localhost:4000/uploads".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = test_config(StorageBackend::Local);
        config.local_storage_path = Some("/tmp/omnivore".to_string());
        config.local_storage_base_url = Some("http://localhost:4000/uploads".to_string());
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expiry_is_exposed_as_duration() {
        let mut inner = test_config(StorageBackend::Local);
        inner.upload_signed_url_expiry_secs = 120;
        let config = Config(Box::new(inner));
        assert_eq!(config.upload_signed_url_expiry(), Duration::from_secs(120));
        assert!(!config.is_production());
        assert_eq!(config.http_concurrency_limit(), 100);
        assert!(!config.json_logs());
        assert_eq!(
            config.local_upload_endpoint(),
            "http://localhost:4000/api/uploads/local"
        );
    }
}
