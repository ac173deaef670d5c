use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;

const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later";

/// Fixed-window request counter keyed by client address
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    hits: Mutex<HashMap<String, (u32, Instant)>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window, hits: Mutex::new(HashMap::new()) }
    }

    /// `None` when limiting is switched off
    pub fn from_config(config: &ApiConfig) -> Option<Self> {
        config
            .enable_rate_limiting
            .then(|| Self::new(config.rate_limit_requests, Duration::from_secs(config.rate_limit_window_secs)))
    }

    /// Count a request from `key`; false once the window's allowance is spent
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        // A panic elsewhere leaves the counts usable
        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        hits.retain(|_, (_, started)| now.duration_since(*started) < self.window);

        let (count, _) = hits.entry(key.to_string()).or_insert((0, now));
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }
}

/// Rejects clients over their allowance with 429
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    if let Some(limiter) = state.limiter.as_deref() {
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if !limiter.check(&client) {
            warn!(%client, "rate limit exceeded");
            return Err(ApiError::TooManyRequests(TOO_MANY_REQUESTS.to_string()));
        }
    }
    Ok(next.run(request).await)
}
