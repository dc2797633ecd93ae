//! Upload-file request handler

use crate::auth::RequestContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use omnivore_core::models::{UploadFileRequestInput, UploadFileRequestResult};
use std::sync::Arc;

/// Request a signed upload URL, optionally linking the upload to a page.
///
/// Always responds 200 with either `{ id, uploadSignedUrl, createdPageId? }`
/// or `{ errorCodes: [...] }`. Only an unparseable body yields an HTTP error.
#[tracing::instrument(skip_all)]
pub async fn upload_file_request(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    ValidatedJson(input): ValidatedJson<UploadFileRequestInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result: UploadFileRequestResult = state
        .upload_file_service
        .upload_file_request(&ctx, input)
        .await;

    Ok(Json(result))
}
