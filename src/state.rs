use std::sync::Arc;

use crate::repository::Records;

#[derive(Clone)]
pub struct AppState {
    pub records: Records,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(records: Records, jwt_secret: &str) -> Self {
        Self { records, jwt_secret: Arc::from(jwt_secret) }
    }
}
