//! Fixed-delay retry policy.
//!
//! Every failure waits the same delay, optionally spread by random jitter.
//! There is no back-off growth and no retry ceiling.

use std::time::Duration;

use crate::models::PollConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    jitter: Duration,
}

impl RetryPolicy {
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self { delay, jitter }
    }

    /// Zero-delay policy for tests.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            Duration::from_secs(config.retry_delay_secs),
            Duration::from_millis(config.jitter_ms),
        )
    }

    /// Delay before the next attempt.
    pub fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let extra = fastrand::u64(0..=self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(extra)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PollConfig::default())
    }
}
