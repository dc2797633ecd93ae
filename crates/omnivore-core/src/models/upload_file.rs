use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Upload lifecycle status (matches database enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "upload_file_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadFileStatus {
    Initialized,
    Completed,
    Failed,
}

impl Display for UploadFileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadFileStatus::Initialized => write!(f, "INITIALIZED"),
            UploadFileStatus::Completed => write!(f, "COMPLETED"),
            UploadFileStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Record of a requested upload. `url` is the source URL until the content
/// lands in storage, then the public URL of the stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct UploadFile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub file_name: String,
    pub content_type: String,
    pub status: UploadFileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a new upload record
#[derive(Debug, Clone)]
pub struct NewUploadFile {
    pub user_id: Uuid,
    pub url: String,
    pub file_name: String,
    pub content_type: String,
}
