pub mod analytics;
pub mod upload_file;

pub use analytics::{AnalyticsEvent, AnalyticsService, AnalyticsSink, NoopAnalytics};
pub use upload_file::{UploadFileService, UploadTarget};
