use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

const EPUB_CONTENT_TYPE: &str = "application/epub+zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "page_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    Article,
    Book,
    File,
}

impl Display for PageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PageType::Article => write!(f, "ARTICLE"),
            PageType::Book => write!(f, "BOOK"),
            PageType::File => write!(f, "FILE"),
        }
    }
}

/// Page type for uploaded content: EPUBs are books, everything else a file.
pub fn page_type_for_content_type(content_type: &str) -> PageType {
    if content_type.eq_ignore_ascii_case(EPUB_CONTENT_TYPE) {
        PageType::Book
    } else {
        PageType::File
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "page_state", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageState {
    Processing,
    Succeeded,
    Failed,
    Deleted,
}

/// A saved page in a user's library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Page {
    pub id: String,
    pub user_id: Uuid,
    pub original_url: String,
    pub title: String,
    pub slug: String,
    /// Storage path for uploaded files
    pub hash: String,
    pub content: String,
    pub page_type: PageType,
    pub upload_file_id: Option<Uuid>,
    pub state: PageState,
    pub reading_progress_percent: f32,
    pub reading_progress_anchor_index: i32,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Fields for a page insert. An empty `id` lets the repository assign one.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub id: String,
    pub user_id: Uuid,
    pub original_url: String,
    pub title: String,
    pub slug: String,
    pub hash: String,
    pub content: String,
    pub page_type: PageType,
    pub upload_file_id: Option<Uuid>,
    pub state: PageState,
    pub reading_progress_percent: f32,
    pub reading_progress_anchor_index: i32,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_type_for_content_type() {
        assert_eq!(
            page_type_for_content_type("application/epub+zip"),
            PageType::Book
        );
        assert_eq!(page_type_for_content_type("application/pdf"), PageType::File);
        assert_eq!(page_type_for_content_type(""), PageType::File);
    }

    #[test]
    fn test_page_enums_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&PageType::Book).unwrap(), "\"BOOK\"");
        assert_eq!(
            serde_json::to_string(&PageState::Succeeded).unwrap(),
            "\"SUCCEEDED\""
        );
    }
}
