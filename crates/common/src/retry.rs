//! Retry-with-backoff policy.
//!
//! Used around collaborators whose startup can fail transiently (camera
//! handles, model downloads). The classifier and quality gate never retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means a single attempt.
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,

    /// Growth factor applied per retry.
    pub multiplier: f64,

    /// Upper bound for any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 8000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.max(1.0).powi(retry as i32 - 1);
        let ms = (self.base_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(ms as u64)
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the next attempt, given how many retries have already
    /// happened, or `None` once the policy is exhausted.
    pub fn next_delay(&self, retries_so_far: u32) -> Option<Duration> {
        (retries_so_far < self.max_retries).then(|| self.delay_for(retries_so_far + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_exponentially_and_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(5), Duration::from_millis(8000));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn next_delay_stops_after_max_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay_ms: 500,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.next_delay(0), Some(Duration::from_millis(500)));
        assert_eq!(policy.next_delay(1), Some(Duration::from_millis(1000)));
        assert_eq!(policy.next_delay(2), None);
    }

    #[test]
    fn none_policy_never_retries() {
        assert_eq!(RetryPolicy::none().next_delay(0), None);
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[test]
    fn shrinking_multiplier_is_treated_as_constant() {
        let policy = RetryPolicy {
            multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_retries":5}"#).unwrap();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay_ms, 1000);
    }
}
