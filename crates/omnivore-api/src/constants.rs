//! Application-wide constants

/// API path prefix
pub const API_PREFIX: &str = "/api";

/// Analytics event emitted for every authenticated upload request
pub const FILE_UPLOAD_REQUEST_EVENT: &str = "file_upload_request";

/// Capacity of the in-memory analytics queue
pub const ANALYTICS_CHANNEL_CAPACITY: usize = 10_000;
