mod api;

pub use api::{DraftsApi, DraftsClient};
