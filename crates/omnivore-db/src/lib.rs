//! Omnivore Database Layer
//!
//! Postgres repositories for upload records and pages, each behind an async
//! trait so callers can run against in-memory implementations.

pub mod db;

pub use db::{
    PageRepository, PageRepositoryTrait, PostgresPageRepository, PostgresUploadFileRepository,
    UploadFileRepository, UploadFileRepositoryTrait,
};

// Re-exports: Transaction utilities
pub use db::transaction::with_transaction;
