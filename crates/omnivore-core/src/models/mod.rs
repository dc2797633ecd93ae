//! Data models for the upload workflow
//!
//! Database rows (`UploadFile`, `Page`) and the request/result types of the
//! upload-file operation.

mod page;
mod upload_file;
pub mod upload_request;

pub use page::*;
pub use upload_file::*;
pub use upload_request::*;
