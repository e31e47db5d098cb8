//! Sliding window of recent provider failures.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

pub const PROVIDER_ERROR_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Case-insensitive substrings that identify an error as a model-provider failure.
pub const PROVIDER_FAILURE_SIGNATURES: &[&str] = &[
    "rate limit",
    "429",
    "500",
    "502",
    "503",
    "timeout",
    "timed out",
    "connection refused",
    "connection reset",
    "provider",
    "overloaded",
];

pub fn is_provider_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    PROVIDER_FAILURE_SIGNATURES
        .iter()
        .any(|signature| lower.contains(signature))
}

/// Times of failures newer than the window, oldest first. Callers pass `now` so the window is testable.
#[derive(Debug)]
pub struct ProviderHealth {
    window: Duration,
    failures: VecDeque<Instant>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self::new(PROVIDER_ERROR_WINDOW)
    }
}

impl ProviderHealth {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            failures: VecDeque::new(),
        }
    }

    /// Record `message` if it looks like a provider failure. Returns whether it was recorded.
    pub fn observe(&mut self, now: Instant, message: &str) -> bool {
        if !is_provider_failure(message) {
            return false;
        }
        self.prune(now);
        self.failures.push_back(now);
        true
    }

    pub fn prune(&mut self, now: Instant) {
        while let Some(&at) = self.failures.front() {
            if now.saturating_duration_since(at) <= self.window {
                break;
            }
            self.failures.pop_front();
        }
    }

    pub fn recent_count(&self, now: Instant) -> usize {
        self.failures
            .iter()
            .filter(|&&at| now.saturating_duration_since(at) <= self.window)
            .count()
    }
}
