// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for contact form security testing.

use std::time::Duration;

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Simulated gap between submissions
    pub interval: Duration,
    /// Number of distinct client keys to rotate through
    pub unique_clients: usize,
    /// Whether submissions carry valid field values
    pub valid_payload: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 50,
            interval: Duration::from_millis(100),
            unique_clients: 1,
            valid_payload: true,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// Scripted resubmission from one client.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            interval: Duration::from_millis(10),
            ..Default::default()
        }
    }

    /// Many clients, each sending a handful.
    pub fn distributed_clients() -> Self {
        Self {
            total_requests: 500,
            interval: Duration::from_millis(10),
            unique_clients: 100,
            ..Default::default()
        }
    }

    /// Garbage payloads hammering validation.
    pub fn invalid_payload_flood() -> Self {
        Self {
            total_requests: 100,
            interval: Duration::from_millis(10),
            unique_clients: 20,
            valid_payload: false,
        }
    }

    /// Double-click style burst: a few submissions back to back.
    pub fn double_submit() -> Self {
        Self {
            total_requests: 8,
            interval: Duration::ZERO,
            ..Default::default()
        }
    }

    /// One client staying under the limit: one submission every 15s.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 40,
            interval: Duration::from_secs(15),
            ..Default::default()
        }
    }

    /// Simulated wall-clock span of the pattern.
    pub fn expected_duration(&self) -> Duration {
        self.interval * self.total_requests as u32
    }

    /// Upper bound on admissions for a limiter allowing `max_attempts` per
    /// `window` for each client.
    pub fn max_admissions(&self, max_attempts: u32, window: Duration) -> usize {
        let per_client = self.total_requests.div_ceil(self.unique_clients);
        let windows = if window.is_zero() {
            1
        } else {
            (self.interval * per_client as u32).as_millis() / window.as_millis() + 1
        };
        (max_attempts as usize * windows as usize).min(per_client) * self.unique_clients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_duration() {
        assert_eq!(
            AttackConfig::slow_drip().expected_duration(),
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_max_admissions_single_window() {
        let config = AttackConfig::single_client_flood();
        assert_eq!(config.max_admissions(5, Duration::from_secs(60)), 5);
    }
}
