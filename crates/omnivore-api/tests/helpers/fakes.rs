//! In-memory repositories and analytics sink for integration tests.

use chrono::{DateTime, Utc};
use omnivore_api::services::{AnalyticsEvent, AnalyticsSink};
use omnivore_core::models::{
    NewPage, NewUploadFile, Page, PageState, PageType, UploadFile, UploadFileStatus,
};
use omnivore_core::AppError;
use omnivore_db::{PageRepositoryTrait, UploadFileRepositoryTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryUploadFileRepository {
    records: Mutex<Vec<UploadFile>>,
    /// When set, `create` behaves like an insert that returned no row
    create_returns_none: AtomicBool,
}

impl InMemoryUploadFileRepository {
    pub fn fail_creates(&self) {
        self.create_returns_none.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<UploadFile> {
        self.records.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<UploadFile> {
        self.all().into_iter().find(|record| record.id == id)
    }
}

#[async_trait::async_trait]
impl UploadFileRepositoryTrait for InMemoryUploadFileRepository {
    async fn create(&self, upload: NewUploadFile) -> Result<Option<UploadFile>, AppError> {
        if self.create_returns_none.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let now = Utc::now();
        let record = UploadFile {
            id: Uuid::new_v4(),
            user_id: upload.user_id,
            url: upload.url,
            file_name: upload.file_name,
            content_type: upload.content_type,
            status: UploadFileStatus::Initialized,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(Some(record))
    }

    async fn swap_public_url(
        &self,
        upload_id: Uuid,
        public_url: &str,
    ) -> Result<Option<UploadFile>, AppError> {
        let mut records = self.records.lock().unwrap();
        Ok(records.iter_mut().find(|r| r.id == upload_id).map(|record| {
            record.url = public_url.to_string();
            record.status = UploadFileStatus::Initialized;
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn update_status(
        &self,
        upload_id: Uuid,
        status: UploadFileStatus,
    ) -> Result<Option<UploadFile>, AppError> {
        let mut records = self.records.lock().unwrap();
        Ok(records.iter_mut().find(|r| r.id == upload_id).map(|record| {
            record.status = status;
            record.updated_at = Utc::now();
            record.clone()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryPageRepository {
    pages: Mutex<Vec<Page>>,
    /// `revive` matches no row
    revive_updates_nothing: AtomicBool,
    /// `revive` fails like a lost database connection
    revive_errors: AtomicBool,
    /// `create` behaves like an insert that returned no id
    create_returns_none: AtomicBool,
}

impl InMemoryPageRepository {
    pub fn fail_revives_silently(&self) {
        self.revive_updates_nothing.store(true, Ordering::SeqCst);
    }

    pub fn fail_revives_with_error(&self) {
        self.revive_errors.store(true, Ordering::SeqCst);
    }

    pub fn fail_creates(&self) {
        self.create_returns_none.store(true, Ordering::SeqCst);
    }

    pub fn set_state(&self, id: &str, state: PageState) {
        let mut pages = self.pages.lock().unwrap();
        if let Some(page) = pages.iter_mut().find(|page| page.id == id) {
            page.state = state;
        }
    }

    pub fn all(&self) -> Vec<Page> {
        self.pages.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<Page> {
        self.all().into_iter().find(|page| page.id == id)
    }

    /// Seed an existing page, as if saved earlier and since archived.
    pub fn insert_archived(&self, user_id: Uuid, original_url: &str, saved_at: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        let page = Page {
            id: id.clone(),
            user_id,
            original_url: original_url.to_string(),
            title: "Existing".to_string(),
            slug: "existing".to_string(),
            hash: String::new(),
            content: String::new(),
            page_type: PageType::File,
            upload_file_id: None,
            state: PageState::Succeeded,
            reading_progress_percent: 42.0,
            reading_progress_anchor_index: 7,
            created_at: saved_at,
            saved_at,
            archived_at: Some(saved_at),
            updated_at: saved_at,
        };
        self.pages.lock().unwrap().push(page);
        id
    }
}

#[async_trait::async_trait]
impl PageRepositoryTrait for InMemoryPageRepository {
    async fn find_by_user_and_url(
        &self,
        user_id: Uuid,
        url: &str,
    ) -> Result<Option<Page>, AppError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|page| {
                page.user_id == user_id
                    && page.original_url == url
                    && page.state != PageState::Deleted
            })
            .max_by_key(|page| page.saved_at))
    }

    async fn revive(&self, page_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        if self.revive_errors.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset".to_string()));
        }
        if self.revive_updates_nothing.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut pages = self.pages.lock().unwrap();
        match pages.iter_mut().find(|page| page.id == page_id) {
            Some(page) => {
                page.saved_at = now;
                page.archived_at = None;
                page.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create(&self, page: NewPage) -> Result<Option<String>, AppError> {
        if self.create_returns_none.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let id = if page.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            page.id
        };

        self.pages.lock().unwrap().push(Page {
            id: id.clone(),
            user_id: page.user_id,
            original_url: page.original_url,
            title: page.title,
            slug: page.slug,
            hash: page.hash,
            content: page.content,
            page_type: page.page_type,
            upload_file_id: page.upload_file_id,
            state: page.state,
            reading_progress_percent: page.reading_progress_percent,
            reading_progress_anchor_index: page.reading_progress_anchor_index,
            created_at: page.created_at,
            saved_at: page.saved_at,
            archived_at: None,
            updated_at: page.created_at,
        });

        Ok(Some(id))
    }
}

#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn capture(&self, event: AnalyticsEvent) {
        self.events.lock().unwrap().push(event);
    }
}
