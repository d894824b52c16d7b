use std::time::Duration;

/// Error messages of the failed attempts of one logical request, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RetryHistory {
    errors: Vec<String>,
}

impl RetryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Error message of the most recent failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Bounded exponential backoff shared by every outbound request loop.
///
/// Attempts are 0-based. The delay after attempt `n` is `base_delay * 2^n`,
/// so the default policy waits 1s, 2s and 4s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after the given 0-based attempt fails.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay)
    }

    /// Whether the given 0-based attempt is the final one allowed.
    pub fn is_last(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }
}

/// Calculate exponential backoff delay without jitter.
///
/// Formula: `base * 2^attempt` (saturating).
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    base.saturating_mul(factor)
}
