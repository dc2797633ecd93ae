pub mod health;
pub mod local_upload;
pub mod upload_file;
