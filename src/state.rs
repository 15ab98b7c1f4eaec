//! Shared application state for all routes.

use crate::service::RecordsStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordsStore>,
}

impl AppState {
    pub fn new(records: RecordsStore) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}
