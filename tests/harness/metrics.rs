// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tally for abuse simulations.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// How the pipeline answered one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Submitted,
    RateLimited,
    Invalid,
    TransportFailed,
    Busy,
}

/// Outcomes of a simulation, per kind and per client.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    clients: HashSet<String>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_default() += 1;
        self.clients.insert(client.to_string());
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn report(&self) -> MetricsReport {
        let total_requests = self.outcomes.values().sum();
        let submitted = self.count(Outcome::Submitted);
        MetricsReport {
            total_requests,
            submitted,
            rate_limited: self.count(Outcome::RateLimited),
            invalid: self.count(Outcome::Invalid),
            busy: self.count(Outcome::Busy),
            block_rate: if total_requests == 0 {
                0.0
            } else {
                (total_requests - submitted) as f64 / total_requests as f64
            },
            unique_clients: self.clients.len(),
        }
    }
}

/// Summary of one simulation.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub submitted: usize,
    pub rate_limited: usize,
    pub invalid: usize,
    pub busy: usize,
    /// Share of submissions that were not delivered
    pub block_rate: f64,
    pub unique_clients: usize,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} submissions from {} clients: {} delivered, {} rate limited, {} invalid, {} busy ({:.1}% blocked)",
            self.total_requests,
            self.unique_clients,
            self.submitted,
            self.rate_limited,
            self.invalid,
            self.busy,
            self.block_rate * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_clients_and_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Submitted, "session-1");
        }
        for _ in 0..6 {
            metrics.record(Outcome::RateLimited, "session-1");
        }
        metrics.record(Outcome::Busy, "session-2");

        let report = metrics.report();
        assert_eq!(report.total_requests, 10);
        assert_eq!(report.busy, 1);
        assert_eq!(report.unique_clients, 2);
        assert!((report.block_rate - 0.7).abs() < 1e-9);
    }
}
