use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::middlewares::proxy::ClientIp;
use crate::state::AppState;

/// Buckets idle for this long are dropped once the map grows past `PURGE_THRESHOLD`.
const STALE_AFTER: Duration = Duration::from_secs(600);
const PURGE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

/// Per-client token bucket limiter.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    /// Takes one token for `key`. Returns false when the bucket is empty.
    pub fn try_acquire(&self, key: &str, now: Instant) -> bool {
        let RateLimitConfig { rate_per_sec, burst } = self.config;

        let allowed = {
            let mut bucket = self
                .buckets
                .entry(key.to_string())
                .or_insert(Bucket { tokens: burst, last: now });

            let elapsed = now.saturating_duration_since(bucket.last).as_secs_f64();
            bucket.tokens = (bucket.tokens + elapsed * rate_per_sec).min(burst);
            bucket.last = now;

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                true
            } else {
                false
            }
        };

        if self.buckets.len() > PURGE_THRESHOLD {
            self.purge_stale(now, STALE_AFTER);
        }
        allowed
    }

    /// Removes buckets untouched for at least `idle`. Returns how many were dropped.
    pub fn purge_stale(&self, now: Instant, idle: Duration) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last) < idle);
        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            tracing::debug!(removed, "purged idle rate limit buckets");
        }
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Key for the caller: resolved client IP, then socket peer, then "unknown".
fn client_key(req: &Request) -> String {
    if let Some(ClientIp(ip)) = req.extensions().get::<ClientIp>() {
        return ip.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limiter(req: Request, next: Next) -> Result<Response, AppError> {
    let state = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state missing".into()))?;

    let key = client_key(&req);
    if !state.rate_limiter.try_acquire(&key, Instant::now()) {
        tracing::warn!(client = %key, path = %req.uri().path(), "rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(req).await)
}
