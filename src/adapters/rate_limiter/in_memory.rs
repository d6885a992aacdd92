//! In-memory rate limiter.
//!
//! Fixed-window counter over an in-memory map. Correct only within a
//! single process instance: in a multi-server deployment each instance
//! counts independently, so the effective limit is `max * instances`.
//! That relaxation is deliberate; a distributed backend can implement
//! the same [`RateLimiter`] port.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{RateLimitDecision, RateLimitKey, RateLimiter};

/// State for a single rate limit window.
#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

/// In-memory fixed-window implementation of [`RateLimiter`].
///
/// The increment-and-compare runs under a single write guard, so
/// concurrent checks on the same key never lose counts.
#[derive(Debug, Default)]
pub struct InMemoryRateLimiter {
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

impl InMemoryRateLimiter {
    /// Creates an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(
        &self,
        key: RateLimitKey,
        max: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, DomainError> {
        let store_key = key.as_store_key();
        let now = Instant::now();

        let mut windows = self.windows.write().await;

        let state = windows.entry(store_key).or_insert(WindowState {
            count: 0,
            window_start: now,
        });

        // Reset once the window has elapsed.
        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        if state.count >= max {
            let elapsed = now.duration_since(state.window_start);
            let retry_after = window.saturating_sub(elapsed);
            return Ok(RateLimitDecision::Denied {
                limit: max,
                retry_after_secs: (retry_after.as_secs() as u32).max(1),
            });
        }

        state.count += 1;
        let remaining = max.saturating_sub(state.count);
        let window_remaining = window.saturating_sub(now.duration_since(state.window_start));
        Ok(RateLimitDecision::Allowed {
            limit: max,
            remaining,
            reset_at: Timestamp::now().add_secs(window_remaining.as_secs() as i64),
        })
    }

    async fn reset(&self, key: RateLimitKey) -> Result<(), DomainError> {
        let mut windows = self.windows.write().await;
        windows.remove(&key.as_store_key());
        Ok(())
    }
}
