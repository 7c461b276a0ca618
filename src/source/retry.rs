use anyhow::Result;
use std::time::Duration;
use tracing::debug;

/// Attempts per query before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// First backoff delay; doubled after every failed attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Bounded retry with exponential backoff for a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping. Used by tests.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    ///
    /// Formula: base * 2^attempt, so 1s, 2s, 4s with the default base.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Longest time `run` can take when every attempt costs `per_attempt`.
    pub fn worst_case(&self, per_attempt: Duration) -> Duration {
        let attempts = self.attempts.max(1);
        (0..attempts - 1).fold(per_attempt.saturating_mul(attempts), |total, attempt| {
            total.saturating_add(self.backoff(attempt))
        })
    }

    /// Run `op` until it succeeds or the attempts are exhausted.
    ///
    /// Sleeps between attempts but not after the last one. Returns the last error.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < attempts => {
                    let delay = self.backoff(attempt);
                    debug!(
                        "{what} failed (attempt {}/{attempts}): {e:#}; retrying in {delay:?}",
                        attempt + 1
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
