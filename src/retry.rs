//! Retry policy for the update loop.
//!
//! A [`RetryPolicy`] bounds the number of write attempts and shapes the
//! backoff between them: capped exponential, with no delay before the
//! first attempt. The policy is an explicit value threaded into the
//! control's constructor rather than a process-wide default, so tests
//! can run with a zero-backoff policy and a small bound.

use std::time::Duration;

/// Bounded retry with capped exponential backoff.
///
/// `steps` is the total number of write attempts, not the number of
/// retries; a policy with `steps == 1` makes exactly one attempt. The
/// exact numeric defaults are a tunable, not a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of write attempts. Treated as at least 1.
    pub steps: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    /// Values below 1 are treated as 1.
    pub factor: u32,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            steps: 5,
            initial_backoff: Duration::from_millis(10),
            factor: 2,
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy with no backoff at all, for deterministic tests.
    pub fn immediate(steps: u32) -> Self {
        RetryPolicy {
            steps,
            initial_backoff: Duration::ZERO,
            factor: 1,
            max_backoff: Duration::ZERO,
        }
    }

    /// Number of attempts the loop will make, never less than one.
    pub fn attempts(&self) -> u32 {
        self.steps.max(1)
    }

    /// Delay before retry number `retry` (zero-based: `backoff(0)` is
    /// the delay between the first and second attempts).
    pub fn backoff(&self, retry: u32) -> Duration {
        if self.initial_backoff.is_zero() {
            return Duration::ZERO;
        }
        let factor = self.factor.max(1);
        let mut delay = self.initial_backoff;
        for _ in 0..retry {
            if delay >= self.max_backoff {
                return self.max_backoff;
            }
            delay = delay.saturating_mul(factor);
        }
        delay.min(self.max_backoff)
    }
}
