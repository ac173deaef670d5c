use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::RateLimiter;
use crate::services::{FileStorage, Geocoder};

/// Handles shared by every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub geocoder: Arc<dyn Geocoder>,
    pub files: Arc<dyn FileStorage>,
    pub config: Arc<AppConfig>,
    /// Absent when rate limiting is disabled
    pub limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        geocoder: Arc<dyn Geocoder>,
        files: Arc<dyn FileStorage>,
        config: AppConfig,
    ) -> Self {
        let limiter = RateLimiter::from_config(&config.api).map(Arc::new);
        Self { store, geocoder, files, config: Arc::new(config), limiter }
    }
}
