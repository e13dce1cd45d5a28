use std::time::Duration;

use rand::Rng;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
pub const DEFAULT_JITTER_MS: u64 = 100;

/// Backoff schedule for rate-limited chat requests.
///
/// `delay(attempt) = min(base * 2^(attempt-1), max) + jitter`, with jitter drawn
/// uniformly from `[-jitter_ms, +jitter_ms]` on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first request.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_ms: DEFAULT_JITTER_MS,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_jitter_ms(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    /// Whether another request may follow the given (1-based) attempt.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Capped exponential delay after `attempt`, before jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let scaled = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(scaled.min(self.max_delay_ms))
    }

    /// Delay after `attempt` with a fixed jitter offset in milliseconds.
    pub fn delay_with_jitter(&self, attempt: u32, jitter_ms: i64) -> Duration {
        let base = self.base_delay(attempt).as_millis() as i64;
        Duration::from_millis(base.saturating_add(jitter_ms).max(0) as u64)
    }

    /// Delay after `attempt` with a fresh random jitter draw.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let spread = self.jitter_ms as i64;
        let jitter = if spread == 0 {
            0
        } else {
            rand::thread_rng().gen_range(-spread..=spread)
        };
        self.delay_with_jitter(attempt, jitter)
    }
}
