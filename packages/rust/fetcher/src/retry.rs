//! Pluggable retry policy for timeline fetches.
//!
//! Backoff used to be ad-hoc sleep calls in the scraping loop; pulling it
//! into a policy value makes zero-delay deterministic tests possible.

use std::time::Duration;

use courtline_shared::EnrichConfig;

/// Bounded exponential backoff schedule for one fetch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Network attempts before the fetch reports a transient failure.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per subsequent attempt.
    pub base_delay: Duration,
    /// Delay ceiling.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            // at least one attempt, or fetch() would never touch the network
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Single attempt, no delays. For deterministic tests.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to sleep after `failed_attempts` failures (1-based).
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let factor = 2u32.saturating_pow(failed_attempts.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl From<&EnrichConfig> for RetryPolicy {
    fn from(config: &EnrichConfig) -> Self {
        Self::new(
            config.fetch_attempts,
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_schedule_with_ceiling() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_millis(500),
            Duration::from_millis(3_000),
        );
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2_000));
        // capped
        assert_eq!(policy.delay_for(4), Duration::from_millis(3_000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(3_000));
    }

    #[test]
    fn none_policy_is_single_zero_delay_attempt() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
    }

    #[test]
    fn at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn from_enrich_config() {
        let config = EnrichConfig::default();
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_millis(8_000));
    }
}
