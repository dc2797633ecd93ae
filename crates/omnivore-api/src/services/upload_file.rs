//! Upload-file request workflow
//!
//! Creates the upload record, signs an upload target for it, and optionally
//! links the upload to a page in the caller's library: an existing page for
//! the same device file is revived, otherwise a new page is created.
//!
//! Every failure is reported as an error code in the result. Nothing here
//! returns an HTTP error.

use crate::auth::RequestContext;
use crate::constants::FILE_UPLOAD_REQUEST_EVENT;
use crate::services::analytics::{AnalyticsEvent, AnalyticsSink};
use chrono::Utc;
use omnivore_core::file_url::{self, UrlKind};
use omnivore_core::models::{
    page_type_for_content_type, NewPage, NewUploadFile, PageState, UploadFileRequestErrorCode,
    UploadFileRequestInput, UploadFileRequestResult, UploadFileStatus,
};
use omnivore_core::slug::generate_slug;
use omnivore_db::{PageRepositoryTrait, UploadFileRepositoryTrait};
use omnivore_storage::{generate_upload_file_path_name, Storage, StorageResult};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

/// Where and how a client uploads the bytes for an upload record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub storage_path: String,
    pub upload_signed_url: String,
    pub public_url: String,
}

/// Values derived from the request URL before anything is written
struct ParsedSource {
    kind: UrlKind,
    title: String,
    file_name: String,
}

#[derive(Clone)]
pub struct UploadFileService {
    upload_files: Arc<dyn UploadFileRepositoryTrait>,
    pages: Arc<dyn PageRepositoryTrait>,
    storage: Arc<dyn Storage>,
    analytics: Arc<dyn AnalyticsSink>,
    signed_url_expiry: Duration,
    api_env: String,
}

impl UploadFileService {
    pub fn new(
        upload_files: Arc<dyn UploadFileRepositoryTrait>,
        pages: Arc<dyn PageRepositoryTrait>,
        storage: Arc<dyn Storage>,
        analytics: Arc<dyn AnalyticsSink>,
        signed_url_expiry: Duration,
        api_env: String,
    ) -> Self {
        Self {
            upload_files,
            pages,
            storage,
            analytics,
            signed_url_expiry,
            api_env,
        }
    }

    /// Storage path, signed PUT URL, and public URL for an upload record.
    pub async fn issue_upload_target(
        &self,
        upload_file_id: Uuid,
        file_name: &str,
        content_type: &str,
    ) -> StorageResult<UploadTarget> {
        let storage_path = generate_upload_file_path_name(upload_file_id, file_name);
        let upload_signed_url = self
            .storage
            .presigned_put_url(&storage_path, content_type, self.signed_url_expiry)
            .await?;
        let public_url = self.storage.public_url(&storage_path);

        Ok(UploadTarget {
            storage_path,
            upload_signed_url,
            public_url,
        })
    }

    #[tracing::instrument(
        skip(self, ctx, input),
        fields(user_id = tracing::field::Empty, url = %input.url)
    )]
    pub async fn upload_file_request(
        &self,
        ctx: &RequestContext,
        input: UploadFileRequestInput,
    ) -> UploadFileRequestResult {
        let Some(user_id) = ctx.user_id() else {
            return UploadFileRequestResult::error(UploadFileRequestErrorCode::Unauthorized);
        };
        tracing::Span::current().record("user_id", tracing::field::display(user_id));

        self.analytics.capture(AnalyticsEvent::new(
            user_id,
            FILE_UPLOAD_REQUEST_EVENT,
            json!({ "url": input.url, "env": self.api_env }),
        ));

        if let Err(e) = input.validate() {
            tracing::info!(error = %e, "Invalid upload file request");
            return UploadFileRequestResult::error(UploadFileRequestErrorCode::BadInput);
        }

        let source = match parse_source(&input.url) {
            Ok(source) => source,
            Err(e) => {
                tracing::info!(error = %e, "Illegal file input url");
                return UploadFileRequestResult::error(UploadFileRequestErrorCode::BadInput);
            }
        };

        let created = self
            .upload_files
            .create(NewUploadFile {
                user_id,
                url: input.url.clone(),
                file_name: source.file_name.clone(),
                content_type: input.content_type.clone(),
            })
            .await;
        let upload_file = match created {
            Ok(Some(upload_file)) => upload_file,
            Ok(None) => {
                tracing::warn!("Upload file insert returned no record");
                return UploadFileRequestResult::error(UploadFileRequestErrorCode::FailedCreate);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create upload file record");
                return UploadFileRequestResult::error(UploadFileRequestErrorCode::FailedCreate);
            }
        };

        let target = match self
            .issue_upload_target(upload_file.id, &source.file_name, &input.content_type)
            .await
        {
            Ok(target) => target,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    upload_file_id = %upload_file.id,
                    "Failed to sign upload URL"
                );
                self.mark_failed(upload_file.id).await;
                return UploadFileRequestResult::error(UploadFileRequestErrorCode::FailedCreate);
            }
        };

        if source.kind.is_local_file() {
            match self
                .upload_files
                .swap_public_url(upload_file.id, &target.public_url)
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!(
                        upload_file_id = %upload_file.id,
                        "Upload file disappeared before its public URL was set"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        upload_file_id = %upload_file.id,
                        "Failed to set public URL on upload file"
                    );
                    self.mark_failed(upload_file.id).await;
                    return UploadFileRequestResult::error(
                        UploadFileRequestErrorCode::FailedCreate,
                    );
                }
            }
        }

        let mut created_page_id = None;
        if input.wants_page_entry() {
            match self
                .reconcile_page(user_id, upload_file.id, &input, &source, &target)
                .await
            {
                Ok(page_id) => created_page_id = Some(page_id),
                Err(code) => {
                    self.mark_failed(upload_file.id).await;
                    return UploadFileRequestResult::error(code);
                }
            }
        }

        tracing::info!(
            upload_file_id = %upload_file.id,
            created_page_id = ?created_page_id,
            "Upload file request accepted"
        );

        UploadFileRequestResult::Success {
            id: upload_file.id,
            upload_signed_url: target.upload_signed_url,
            created_page_id,
        }
    }

    /// Best effort: the caller already reports `FailedCreate`.
    async fn mark_failed(&self, upload_file_id: Uuid) {
        match self
            .upload_files
            .update_status(upload_file_id, UploadFileStatus::Failed)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(upload_file_id = %upload_file_id, "No upload file to mark failed");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    upload_file_id = %upload_file_id,
                    "Failed to mark upload file failed"
                );
            }
        }
    }

    /// Find-or-create the page for this upload and return its id.
    ///
    /// Only device files are matched against existing pages; remote URLs
    /// always get a new page. The lookup and the insert are not atomic.
    async fn reconcile_page(
        &self,
        user_id: Uuid,
        upload_file_id: Uuid,
        input: &UploadFileRequestInput,
        source: &ParsedSource,
        target: &UploadTarget,
    ) -> Result<String, UploadFileRequestErrorCode> {
        let existing = if source.kind.is_local_file() {
            self.pages
                .find_by_user_and_url(user_id, &input.url)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to look up existing page");
                    UploadFileRequestErrorCode::FailedCreate
                })?
        } else {
            None
        };

        let now = Utc::now();

        if let Some(page) = existing {
            return match self.pages.revive(&page.id, now).await {
                Ok(true) => {
                    tracing::debug!(page_id = %page.id, "Revived existing page");
                    Ok(page.id)
                }
                Ok(false) => {
                    tracing::warn!(page_id = %page.id, "Existing page could not be updated");
                    Err(UploadFileRequestErrorCode::FailedCreate)
                }
                Err(e) => {
                    tracing::error!(error = %e, page_id = %page.id, "Failed to revive page");
                    Err(UploadFileRequestErrorCode::FailedCreate)
                }
            };
        }

        let original_url = if source.kind.is_local_file() {
            target.public_url.clone()
        } else {
            input.url.clone()
        };

        let new_page = NewPage {
            id: input.client_request_id.clone().unwrap_or_default(),
            user_id,
            original_url,
            title: source.title.clone(),
            slug: generate_slug(&target.storage_path),
            hash: target.storage_path.clone(),
            content: String::new(),
            page_type: page_type_for_content_type(&input.content_type),
            upload_file_id: Some(upload_file_id),
            state: PageState::Succeeded,
            reading_progress_percent: 0.0,
            reading_progress_anchor_index: 0,
            created_at: now,
            saved_at: now,
        };

        match self.pages.create(new_page).await {
            Ok(Some(page_id)) => Ok(page_id),
            Ok(None) => {
                tracing::warn!("Page insert returned no id");
                Err(UploadFileRequestErrorCode::FailedCreate)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create page");
                Err(UploadFileRequestErrorCode::FailedCreate)
            }
        }
    }
}

fn parse_source(url: &str) -> Result<ParsedSource, file_url::FileUrlError> {
    let title = file_url::derive_title(url)?;
    let file_name = file_url::derive_file_name(url)?;
    let kind = file_url::classify(url)?;

    if kind == UrlKind::Remote {
        file_url::validate_remote_url(url)?;
    }

    Ok(ParsedSource {
        kind,
        title,
        file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_local_file() {
        let source = parse_source("file:///Users/me/My%20Book.pdf").unwrap();
        assert_eq!(source.kind, UrlKind::LocalFile);
        assert_eq!(source.title, "My Book");
        assert_eq!(source.file_name, "MyBook.pdf");
    }

    #[test]
    fn test_parse_source_rejects_private_remote() {
        assert!(parse_source("http://127.0.0.1/file.pdf").is_err());
        assert!(parse_source("not a url").is_err());
    }

    #[test]
    fn test_parse_source_remote() {
        let source = parse_source("https://example.com/papers/a.pdf").unwrap();
        assert_eq!(source.kind, UrlKind::Remote);
        assert_eq!(source.title, "a");
        assert_eq!(source.file_name, "a.pdf");
    }
}
