//! Per-client token bucket rate limiting.
//!
//! Each client key starts with a full bucket of `capacity` tokens that refills
//! continuously over `window`. IPv6 clients are grouped by their /56 prefix, so
//! a single allocation cannot dodge the limit by rotating addresses.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;

pub const DEFAULT_CAPACITY: u32 = 100;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Buckets beyond this count make idle ones eligible for a sweep, at most once per window.
const SWEEP_THRESHOLD: usize = 10_000;
const IPV6_PREFIX_BITS: u32 = 56;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
struct Buckets {
    map: HashMap<String, Bucket>,
    last_sweep: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    window: Duration,
    sweep_threshold: usize,
    buckets: Mutex<Buckets>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = f64::from(capacity);
        Self {
            capacity,
            refill_per_sec: capacity / window.as_secs_f64(),
            window,
            sweep_threshold: SWEEP_THRESHOLD,
            buckets: Mutex::new(Buckets {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Take one token for `key`. On refusal, returns how long until a token is available.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut buckets = self.buckets.lock();

        if buckets.map.len() > self.sweep_threshold
            && now.duration_since(buckets.last_sweep) >= self.window
        {
            let window = self.window;
            buckets
                .map
                .retain(|_, bucket| now.duration_since(bucket.last_refill) < window);
            buckets.last_sweep = now;
            tracing::debug!(remaining = buckets.map.len(), "Swept idle rate limit buckets");
        }

        let bucket = buckets.map.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64(
                (1.0 - bucket.tokens) / self.refill_per_sec,
            ))
        }
    }
}

/// Whole seconds for a `Retry-After` header, rounded up so a client never retries early.
fn retry_after_secs(wait: Duration) -> u64 {
    (wait.as_secs_f64().ceil() as u64).max(1)
}

/// Bucket key for a peer address.
pub fn client_key(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => {
                let prefix = u128::from(v6) & (u128::MAX << (128 - IPV6_PREFIX_BITS));
                format!("{}/{IPV6_PREFIX_BITS}", Ipv6Addr::from(prefix))
            }
        },
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| client_key(addr.ip()))
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            let seconds = retry_after_secs(retry_after).to_string();
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(RETRY_AFTER, seconds)],
                "Too many requests, please try again later.",
            )
                .into_response()
        }
    }
}
