//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Delay before retry `attempt` (1-based): `base_ms * 2^(attempt-1)`, capped
/// at `max_ms`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let Some(exponent) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let delay_ms = base_ms
        .saturating_mul(2u64.saturating_pow(exponent))
        .min(max_ms);

    let jitter_ms = match delay_ms / 10 {
        0 => 0,
        range => rand::thread_rng().gen_range(0..range),
    };

    Duration::from_millis(delay_ms + jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100);
        assert!(b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000);
        assert!(max.as_millis() < 1100);
    }

    #[test]
    fn test_zeroth_attempt_has_no_delay() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let d = calculate_backoff(200, 250, 5000);
        assert!(d.as_millis() >= 5000);
    }
}
