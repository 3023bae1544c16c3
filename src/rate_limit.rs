//! Request throttling
//!
//! Fixed-window counters per caller: anonymous callers are keyed by
//! client address, authenticated callers by user id, each with its own quota.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;

use crate::AppState;
use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::metrics::RATE_LIMITED_TOTAL;

const DEFAULT_MAX_TRACKED_KEYS: usize = 10_000;

/// Rate limiter entry
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of requests in current window
    count: u32,
    /// Window start time
    window_start: Instant,
}

impl RateLimitEntry {
    fn is_new_window(&self, window_duration: Duration) -> bool {
        self.window_start.elapsed() >= window_duration
    }

    fn increment(&mut self, window_duration: Duration) {
        if self.is_new_window(window_duration) {
            self.count = 1;
            self.window_start = Instant::now();
        } else {
            self.count += 1;
        }
    }
}

/// Per-key request counter
pub struct RateLimiter {
    entries: Arc<RwLock<HashMap<String, RateLimitEntry>>>,
    /// Maximum requests per window
    max_requests: u32,
    window_duration: Duration,
    /// Maximum number of tracked keys in memory
    max_tracked_keys: usize,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_duration: Duration) -> Self {
        Self::with_max_tracked_keys(max_requests, window_duration, DEFAULT_MAX_TRACKED_KEYS)
    }

    /// Create new rate limiter with explicit in-memory key cap.
    pub fn with_max_tracked_keys(
        max_requests: u32,
        window_duration: Duration,
        max_tracked_keys: usize,
    ) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
            max_tracked_keys: max_tracked_keys.max(1),
        }
    }

    fn prune_expired_locked(
        entries: &mut HashMap<String, RateLimitEntry>,
        window_duration: Duration,
    ) -> usize {
        let before = entries.len();
        entries.retain(|_, value| !value.is_new_window(window_duration));
        before - entries.len()
    }

    fn evict_oldest_locked(entries: &mut HashMap<String, RateLimitEntry>) -> bool {
        let Some(oldest_key) = entries
            .iter()
            .min_by_key(|(_, value)| value.window_start)
            .map(|(key, _)| key.clone())
        else {
            return false;
        };
        entries.remove(&oldest_key);
        true
    }

    /// Count a request against `key`.
    ///
    /// # Returns
    /// Ok if allowed, `RateLimited` once the window's quota is spent
    pub async fn check_and_increment(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_tracked_keys {
            let removed = Self::prune_expired_locked(&mut entries, self.window_duration);
            if removed > 0 {
                tracing::debug!(removed, "Pruned expired rate limit entries");
            }
            if entries.len() >= self.max_tracked_keys {
                let _ = Self::evict_oldest_locked(&mut entries);
            }
        }

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                window_start: Instant::now(),
            });

        if !entry.is_new_window(self.window_duration) && entry.count >= self.max_requests {
            Err(AppError::RateLimited)
        } else {
            entry.increment(self.window_duration);
            Ok(())
        }
    }

    /// Get current count for a key
    pub async fn get_count(&self, key: &str) -> u32 {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| !e.is_new_window(self.window_duration))
            .map(|e| e.count)
            .unwrap_or(0)
    }

    pub async fn tracked_keys(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Separate quotas for anonymous and authenticated callers
pub struct RequestThrottle {
    pub anonymous: RateLimiter,
    pub authenticated: RateLimiter,
}

impl RequestThrottle {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_seconds);
        Self {
            anonymous: RateLimiter::new(config.anon_requests, window),
            authenticated: RateLimiter::new(config.user_requests, window),
        }
    }
}

/// First `X-Forwarded-For` hop, else the socket peer, else a shared bucket.
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applying the caller's quota before the handler runs
pub async fn throttle(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();

    let result = match crate::auth::access_token_user_id(headers, &state.config.auth.token_secret)
    {
        Some(user_id) => {
            let key = format!("user:{user_id}");
            state
                .throttle
                .authenticated
                .check_and_increment(&key)
                .await
                .inspect_err(|_| {
                    RATE_LIMITED_TOTAL.with_label_values(&["user"]).inc();
                    tracing::warn!(user_id, "Authenticated caller throttled");
                })
        }
        None => {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0);
            let address = client_address(headers, peer);
            let key = format!("anon:{address}");
            state
                .throttle
                .anonymous
                .check_and_increment(&key)
                .await
                .inspect_err(|_| {
                    RATE_LIMITED_TOTAL.with_label_values(&["anon"]).inc();
                    tracing::warn!(client = %address, "Anonymous caller throttled");
                })
        }
    };
    result?;

    Ok(next.run(request).await)
}
