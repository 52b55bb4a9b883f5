//! Retry classification and backoff for image fetches

use rand::Rng;
use std::time::Duration;

use crate::error::FailureKind;

/// Map a transport error onto the failure taxonomy.
///
/// Timeouts are reported separately from other transport failures; both
/// qualify for the single retry.
pub(crate) fn classify(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Connection
    }
}

/// Delay before the next attempt: exponential backoff plus jitter.
///
/// `retries` is the number of attempts already failed. Jitter keeps
/// simultaneous retries against one host from landing in the same
/// instant.
pub(crate) fn backoff_delay(retries: u32, base: Duration) -> Duration {
    let base_ms = (base.as_millis() as u64).max(1);
    let delay = 2u64.pow(retries) * base_ms + rand::rng().random_range(0..base_ms);
    Duration::from_millis(delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_retry_delay_stays_within_one_backoff_step() {
        let base = Duration::from_millis(500);
        for _ in 0..50 {
            let delay = backoff_delay(0, base);
            assert!(delay >= base);
            assert!(delay < base * 2);
        }
    }

    #[test]
    fn delay_doubles_per_failed_attempt() {
        let base = Duration::from_millis(100);
        for _ in 0..50 {
            let delay = backoff_delay(2, base);
            assert!(delay >= base * 4);
            assert!(delay < base * 5);
        }
    }

    #[test]
    fn zero_base_does_not_panic() {
        let delay = backoff_delay(0, Duration::ZERO);
        assert!(delay < Duration::from_millis(2));
    }
}
