use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;
use validator::Validate;

/// Request for a signed upload target
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequestInput {
    /// `file://` reference to device content, or a remote URL
    #[validate(length(min = 1, max = 4096, message = "URL must be between 1 and 4096 characters"))]
    pub url: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
    #[serde(default)]
    pub create_page_entry: Option<bool>,
    /// Client-chosen id for the page, if one gets created
    #[serde(default)]
    pub client_request_id: Option<String>,
}

impl UploadFileRequestInput {
    pub fn wants_page_entry(&self) -> bool {
        self.create_page_entry.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadFileRequestErrorCode {
    Unauthorized,
    BadInput,
    FailedCreate,
}

impl Display for UploadFileRequestErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadFileRequestErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            UploadFileRequestErrorCode::BadInput => write!(f, "BAD_INPUT"),
            UploadFileRequestErrorCode::FailedCreate => write!(f, "FAILED_CREATE"),
        }
    }
}

/// Outcome of an upload-file request. Flow failures are reported here as
/// error codes rather than as transport errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadFileRequestResult {
    #[serde(rename_all = "camelCase")]
    Success {
        id: Uuid,
        upload_signed_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_page_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        error_codes: Vec<UploadFileRequestErrorCode>,
    },
}

impl UploadFileRequestResult {
    pub fn error(code: UploadFileRequestErrorCode) -> Self {
        UploadFileRequestResult::Error {
            error_codes: vec![code],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadFileRequestResult::Success { .. })
    }

    pub fn error_codes(&self) -> &[UploadFileRequestErrorCode] {
        match self {
            UploadFileRequestResult::Error { error_codes } => error_codes,
            UploadFileRequestResult::Success { .. } => &[],
        }
    }
}
