//! Retry policy for extraction calls

use crate::config::{seconds, RetrySettings};
use std::time::Duration;

/// Bounded attempts with clamped exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl RetryPolicy {
    /// Retry without waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier: Duration::ZERO,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Wait before the attempt following `attempt` (1-based)
    pub fn wait_after(&self, attempt: u32) -> Duration {
        let exp = 2u32.saturating_pow(attempt.saturating_sub(1));
        let wait = self.multiplier.saturating_mul(exp);
        wait.clamp(self.min_wait, self.max_wait)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        let min_wait = seconds(settings.min_wait);
        Self {
            max_attempts: settings.max_attempts.max(1),
            multiplier: seconds(settings.multiplier),
            min_wait,
            max_wait: seconds(settings.max_wait).max(min_wait),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_waits_are_clamped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        // 1s and 2s are raised to the 4s floor
        assert_eq!(policy.wait_after(1), Duration::from_secs(4));
        assert_eq!(policy.wait_after(2), Duration::from_secs(4));
        assert_eq!(policy.wait_after(3), Duration::from_secs(4));
        assert_eq!(policy.wait_after(4), Duration::from_secs(8));
        assert_eq!(policy.wait_after(5), Duration::from_secs(10));
        assert_eq!(policy.wait_after(40), Duration::from_secs(10));
    }

    #[test]
    fn test_waits_double() {
        let policy = RetryPolicy {
            max_attempts: 5,
            multiplier: Duration::from_millis(100),
            min_wait: Duration::ZERO,
            max_wait: Duration::from_secs(60),
        };
        assert_eq!(policy.wait_after(1), Duration::from_millis(100));
        assert_eq!(policy.wait_after(2), Duration::from_millis(200));
        assert_eq!(policy.wait_after(3), Duration::from_millis(400));
    }

    #[test]
    fn test_oversized_settings_saturate() {
        let settings = RetrySettings {
            max_attempts: 3,
            multiplier: 1.0,
            min_wait: 0.0,
            max_wait: 1e20,
        };
        let policy = RetryPolicy::from(&settings);
        assert_eq!(policy.max_wait, Duration::MAX);
        assert_eq!(policy.wait_after(2), Duration::from_secs(2));
    }

    #[test]
    fn test_immediate_never_waits() {
        let policy = RetryPolicy::immediate(0);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.wait_after(3), Duration::ZERO);
    }
}
