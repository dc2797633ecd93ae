//! Database repositories for data access layer
//
// Upload records
pub mod upload_file;
//
// Library pages
pub mod page;
//
// Transaction utilities
pub mod transaction;

pub use page::{PageRepositoryTrait, PostgresPageRepository, PostgresPageRepository as PageRepository};
pub use upload_file::{
    PostgresUploadFileRepository, PostgresUploadFileRepository as UploadFileRepository,
    UploadFileRepositoryTrait,
};
