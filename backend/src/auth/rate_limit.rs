//! Fixed-window request limiting keyed by client address.
//!
//! The limiter is constructed once at startup and injected into the routes
//! that need it. [`InMemoryRateLimiter`] keeps its buckets in process memory,
//! so every running instance enforces its own independent limit; a
//! horizontally scaled deployment needs a [`RateLimiter`] backed by shared
//! storage instead.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-key counter and the start of its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitBucket {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    #[cfg(test)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

pub trait RateLimiter: Send + Sync {
    /// Records one request for `key` at `now` and decides whether it may proceed.
    fn check(&self, key: &str, now: Instant) -> RateLimitDecision;

    /// Forgets all buckets.
    #[cfg(test)]
    fn reset(&self);
}

pub struct InMemoryRateLimiter {
    window: Duration,
    max_requests: u32,
    // No eviction: a bucket lives until the process exits.
    buckets: Mutex<HashMap<String, RateLimitBucket>>,
}

impl InMemoryRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn bucket(&self, key: &str) -> Option<RateLimitBucket> {
        self.lock().get(key).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, RateLimitBucket>> {
        // A panic while holding the lock cannot leave a bucket half-written.
        self.buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut buckets = self.lock();
        let bucket = buckets
            .entry(key.to_string())
            .or_insert(RateLimitBucket {
                count: 0,
                window_start: now,
            });

        if now.saturating_duration_since(bucket.window_start) >= self.window {
            *bucket = RateLimitBucket {
                count: 0,
                window_start: now,
            };
        }

        if bucket.count >= self.max_requests {
            let elapsed = now.saturating_duration_since(bucket.window_start);
            return RateLimitDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        bucket.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - bucket.count,
        }
    }

    #[cfg(test)]
    fn reset(&self) {
        self.lock().clear();
    }
}
