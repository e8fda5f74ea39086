use rand::Rng;

use std::time::Duration;

use super::config::RetryConfig;

/// Exponential reconnect schedule: `base * 2^attempt` capped at `max_delay`,
/// plus random jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn next_delay(&self, attempt: u32) -> Duration {
        let max_jitter = u64::try_from(self.config.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter));
        self.delay_with_jitter(attempt, jitter)
    }

    pub fn delay_with_jitter(&self, attempt: u32, jitter: Duration) -> Duration {
        let backoff = self
            .config
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        backoff.min(self.config.max_delay).saturating_add(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_per_attempt() {
        let policy = RetryPolicy::new(RetryConfig::default());
        assert_eq!(
            policy.delay_with_jitter(0, Duration::ZERO),
            Duration::from_secs(1)
        );
        assert_eq!(
            policy.delay_with_jitter(1, Duration::ZERO),
            Duration::from_secs(2)
        );
        assert_eq!(
            policy.delay_with_jitter(3, Duration::from_millis(500)),
            Duration::from_millis(8_500)
        );
    }

    #[test]
    fn capped_at_max_delay() {
        let policy = RetryPolicy::new(RetryConfig::default());
        assert_eq!(
            policy.delay_with_jitter(7, Duration::from_secs(1)),
            Duration::from_secs(121)
        );
        assert_eq!(
            policy.delay_with_jitter(u32::MAX, Duration::ZERO),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = RetryPolicy::new(RetryConfig::default());
        for _ in 0..100 {
            let delay = policy.next_delay(1);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(3));
        }
    }
}
