//! Process-wide token-bucket admission limiter.
//!
//! One token is replenished per second up to the configured burst;
//! an aggregation may start only if a token is available. Requests
//! over the rate are rejected immediately — there is no backpressure
//! queue, only admission rejection.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Gates how many aggregations may start per unit time.
pub struct AdmissionLimiter {
    inner: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl AdmissionLimiter {
    /// Create a limiter replenishing one token per second up to `burst`.
    ///
    /// A zero burst is clamped to one (config validation rejects it
    /// upstream anyway).
    pub fn new(burst: u32) -> Self {
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = match Quota::with_period(Duration::from_secs(1)) {
            Some(quota) => quota.allow_burst(burst),
            // 1s is non-zero, so this arm is unreachable; keep a sane quota anyway.
            None => Quota::per_second(burst),
        };
        Self {
            inner: RateLimiter::direct(quota),
        }
    }

    /// Try to take a token. `false` means the caller must reject the
    /// request now rather than queue it.
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_tokens_available_immediately() {
        let limiter = AdmissionLimiter::new(3);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
    }

    #[test]
    fn exhausted_bucket_rejects() {
        let limiter = AdmissionLimiter::new(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire(), "third request within the same second must be rejected");
    }

    #[test]
    fn tokens_replenish_over_time() {
        let limiter = AdmissionLimiter::new(1);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        std::thread::sleep(Duration::from_millis(1100));
        assert!(limiter.try_acquire(), "one token replenishes per second");
    }

    #[test]
    fn zero_burst_clamped_to_one() {
        let limiter = AdmissionLimiter::new(0);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
