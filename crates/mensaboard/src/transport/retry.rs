//! Bounded retry with exponential backoff.

use std::time::Duration;

/// Statuses worth retrying: rate limiting and transient upstream failures.
const RETRY_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Upper bound for a single backoff sleep.
pub const MAX_DELAY: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    /// Base delay in seconds, doubled for each further retry
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            backoff_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff_factor: 0.0,
        }
    }

    /// Delay before retry number `retry` (1-based): `backoff_factor * 2^(retry-1)`,
    /// capped at [`MAX_DELAY`]. A negative or NaN factor means no delay.
    pub fn delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exp = (retry - 1).min(16) as i32;
        let secs = self.backoff_factor * 2f64.powi(exp);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_DELAY)
            .min(MAX_DELAY)
    }

    pub fn should_retry_status(status: u16) -> bool {
        RETRY_STATUSES.contains(&status)
    }

    /// Connect failures and timeouts are transient; decode errors are not.
    pub fn should_retry_error(err: &reqwest::Error) -> bool {
        err.is_connect() || err.is_timeout()
    }
}
