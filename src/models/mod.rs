mod draft;
mod integration;
mod query;

pub use draft::{DraftListResult, DraftStats, DraftStatus, DraftSummary};
pub use integration::{platform_label, ConnectionHealth, IntegrationStatus};
pub use query::{DateRange, DraftListQuery, StatusFilter};
