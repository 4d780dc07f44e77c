// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter for contact form submissions.
//!
//! Each key keeps the timestamps of its admitted attempts. A check prunes
//! timestamps older than the window, denies when `max_attempts` remain, and
//! otherwise records the attempt. Expired timestamps are only dropped when
//! their key is checked again (or by [`RateLimiter::cleanup`]).
//!
//! This deters double submits and scripted abuse; it is not an access
//! control.

use crate::config::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Attempt admitted and recorded
    Allowed {
        /// Attempts left in the current window
        remaining: u32,
        /// Time until the oldest recorded attempt leaves the window
        reset_in: Duration,
    },
    /// Attempt denied and not recorded
    Limited {
        /// Time until the next attempt would be admitted
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Thread-safe sliding-window rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Admitted attempt timestamps per key, oldest first
    attempts: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and record an attempt for `key`.
    ///
    /// The prune, the count and the append happen under one write guard, so
    /// concurrent callers can never push a key past `max_attempts`.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let window = self.config.window_duration();
        let max_attempts = self.config.max_attempts as usize;
        let now = Instant::now();

        let mut attempts = self.attempts.write().await;
        let history = attempts.entry(key.to_string()).or_default();

        // Timestamps are appended in order, so expired ones sit at the front.
        while let Some(oldest) = history.front() {
            if now.duration_since(*oldest) >= window {
                history.pop_front();
            } else {
                break;
            }
        }

        if history.len() >= max_attempts {
            let retry_after = history
                .front()
                .map(|oldest| (*oldest + window).saturating_duration_since(now))
                .unwrap_or(window);
            debug!(key = %key, ?retry_after, attempts = history.len(), "Rate limit exceeded");
            return RateLimitResult::Limited { retry_after };
        }

        history.push_back(now);
        let oldest = history.front().copied().unwrap_or(now);
        let remaining = (max_attempts - history.len()) as u32;
        debug!(key = %key, remaining, "Attempt admitted");

        RateLimitResult::Allowed {
            remaining,
            reset_in: (oldest + window).saturating_duration_since(now),
        }
    }

    /// Check and record an attempt, reduced to admit/deny.
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.check(key).await.is_allowed()
    }

    /// Forget every attempt recorded for `key`.
    pub async fn reset(&self, key: &str) {
        let mut attempts = self.attempts.write().await;
        if attempts.remove(key).is_some() {
            debug!(key = %key, "Rate limit history cleared");
        }
    }

    /// Drop keys whose whole history has left the window. Such keys behave
    /// exactly like unseen ones, so this only reclaims memory.
    pub async fn cleanup(&self) {
        let window = self.config.window_duration();
        let now = Instant::now();

        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|_, history| {
            history
                .back()
                .is_some_and(|newest| now.duration_since(*newest) < window)
        });
        let removed = before - attempts.len();
        if removed > 0 {
            debug!(removed, remaining = attempts.len(), "Rate limiter cleanup");
        }
    }

    /// Number of keys currently holding state.
    pub async fn tracked_keys(&self) -> usize {
        self.attempts.read().await.len()
    }
}
