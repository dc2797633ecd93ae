//! Receiver for local-backend signed upload URLs

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use omnivore_core::models::UploadFileStatus;
use omnivore_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LocalUploadParams {
    pub token: String,
}

/// Media type without parameters, lowercased
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Upload id from a `u/{upload_file_id}/{file_name}` storage key
fn upload_file_id_from_key(storage_key: &str) -> Option<Uuid> {
    let mut parts = storage_key.splitn(3, '/');
    match (parts.next(), parts.next()) {
        (Some("u"), Some(id)) => Uuid::parse_str(id).ok(),
        _ => None,
    }
}

/// Store the request body at the key granted by the URL's token.
#[tracing::instrument(skip(state, params, headers, body), fields(size_bytes = body.len()))]
pub async fn local_upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocalUploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let local = state
        .local_uploads
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Local uploads are not enabled".to_string()))?;

    let grant = local.storage.verify_upload_token(&params.token)?;

    let request_content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if essence(request_content_type) != essence(&grant.content_type) {
        return Err(AppError::BadRequest(format!(
            "Content-Type must be {}",
            grant.content_type
        ))
        .into());
    }

    if body.len() > local.max_upload_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "{} bytes exceeds max {} bytes",
            body.len(),
            local.max_upload_size_bytes
        ))
        .into());
    }

    let url = local
        .storage
        .upload_with_key(&grant.storage_key, body.to_vec())
        .await?;

    if let Some(upload_file_id) = upload_file_id_from_key(&grant.storage_key) {
        match local
            .upload_files
            .update_status(upload_file_id, UploadFileStatus::Completed)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(upload_file_id = %upload_file_id, "No upload file for stored object");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    upload_file_id = %upload_file_id,
                    "Failed to mark upload file completed"
                );
            }
        }
    }

    Ok(Json(serde_json::json!({ "url": url })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_essence_ignores_parameters_and_case() {
        assert_eq!(essence("Application/PDF; charset=binary"), "application/pdf");
        assert_eq!(essence(""), "");
    }

    #[test]
    fn test_upload_file_id_from_key() {
        let id = Uuid::new_v4();
        assert_eq!(
            upload_file_id_from_key(&format!("u/{}/a.pdf", id)),
            Some(id)
        );
        assert_eq!(upload_file_id_from_key("media/a.pdf"), None);
        assert_eq!(upload_file_id_from_key("u/not-a-uuid/a.pdf"), None);
    }
}
