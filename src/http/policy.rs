//! Retry policy: attempt budget, exponential backoff and additive jitter.

use std::time::Duration;

/// How many times to try a request and how long to wait in between.
///
/// The delay before retry number `k + 1` (after the failed attempt `k`,
/// counted from zero) is
///
/// ```text
/// 2^k × base_delay + uniform[0, max_jitter)
/// ```
///
/// Jitter only ever adds to the exponential floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, 1 s base delay, up to 500 ms jitter.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1_000), Duration::from_millis(500))
    }
}

impl RetryPolicy {
    /// Build a policy.  A `max_attempts` of zero is raised to one so every
    /// call issues at least one request.
    pub fn new(max_attempts: u32, base_delay: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_jitter,
        }
    }

    /// A single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_jitter(&self) -> Duration {
        self.max_jitter
    }

    /// Deterministic part of the delay after failed attempt `attempt`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use studio_assist::http::RetryPolicy;
    ///
    /// let p = RetryPolicy::new(4, Duration::from_millis(100), Duration::ZERO);
    /// assert_eq!(p.backoff(0), Duration::from_millis(100));
    /// assert_eq!(p.backoff(1), Duration::from_millis(200));
    /// assert_eq!(p.backoff(2), Duration::from_millis(400));
    /// ```
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// A uniformly random jitter in `[0, max_jitter)`.
    pub fn jitter(&self) -> Duration {
        let max_nanos = u64::try_from(self.max_jitter.as_nanos()).unwrap_or(u64::MAX);
        if max_nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(fastrand::u64(0..max_nanos))
    }

    /// Full delay after failed attempt `attempt`: backoff plus jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff(attempt).saturating_add(self.jitter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
