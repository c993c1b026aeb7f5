//! Fixed-window limiter for outbound AI requests.
//!
//! # Invariants
//! - Check-and-increment happens under one lock, so concurrent callers
//!   can never push the count past `max_requests` within a window.
//! - A rejected call does not consume budget.

use super::error::AiError;
use log::warn;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            window: Duration::from_secs(60),
        }
    }
}

/// Snapshot of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    pub request_count: u32,
    pub window_start: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Mutex<RateLimitWindow>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window: Mutex::new(RateLimitWindow {
                request_count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Reserves one request slot against the wall clock.
    pub fn try_acquire(&self) -> Result<(), AiError> {
        self.try_acquire_at(Instant::now())
    }

    /// Reserves one request slot as of `now`.
    ///
    /// Resets the window once more than `window` has elapsed since it
    /// started, then fails with `RateLimitExceeded` if the budget is spent.
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), AiError> {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        if now.saturating_duration_since(window.window_start) > self.config.window {
            window.request_count = 0;
            window.window_start = now;
        }

        if window.request_count >= self.config.max_requests {
            warn!(
                "event=ai_rate_limit module=analysis status=rejected request_count={} max_requests={}",
                window.request_count, self.config.max_requests
            );
            return Err(AiError::RateLimitExceeded);
        }

        window.request_count += 1;
        Ok(())
    }

    pub fn snapshot(&self) -> RateLimitWindow {
        *self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
