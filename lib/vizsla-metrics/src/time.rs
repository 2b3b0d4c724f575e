//! Elapsed-time helpers for latency measurements.

use std::time::{Duration, Instant};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Converts an elapsed duration to milliseconds, the unit of the roundtrip latency measure.
///
/// The conversion is nanoseconds divided by 10^6, preserving sub-millisecond precision as the
/// fractional part.
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / NANOS_PER_MILLI
}

/// Gets the time elapsed since `start`, in milliseconds.
///
/// `start` comes from the monotonic clock ([`Instant::now`]), so the result is non-negative and
/// unaffected by wall-clock adjustments.
pub fn since_ms(start: Instant) -> f64 {
    duration_to_ms(start.elapsed())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn converts_known_durations() {
        assert_eq!(duration_to_ms(Duration::ZERO), 0.0);
        assert_eq!(duration_to_ms(Duration::from_millis(1)), 1.0);
        assert_eq!(duration_to_ms(Duration::from_micros(2300)), 2.3);
        assert_eq!(duration_to_ms(Duration::from_secs(1)), 1000.0);
    }

    #[test]
    fn since_is_non_negative() {
        let start = Instant::now();
        assert!(since_ms(start) >= 0.0);
    }

    proptest! {
        #[test]
        fn conversion_is_non_negative_and_monotonic(a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
            let (shorter, longer) = if a <= b { (a, b) } else { (b, a) };
            let shorter_ms = duration_to_ms(Duration::from_nanos(shorter));
            let longer_ms = duration_to_ms(Duration::from_nanos(longer));

            prop_assert!(shorter_ms >= 0.0);
            prop_assert!(shorter_ms <= longer_ms);
        }

        #[test]
        fn conversion_is_proportional(millis in 0u64..1_000_000) {
            let converted = duration_to_ms(Duration::from_millis(millis));
            prop_assert_eq!(converted, millis as f64);
        }
    }
}
