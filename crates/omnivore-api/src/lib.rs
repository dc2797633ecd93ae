//! Omnivore API Library
//!
//! HTTP surface for the upload workflow: auth middleware, handlers, the
//! upload service, and application setup.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;

// Re-exports
pub use error::ErrorResponse;
