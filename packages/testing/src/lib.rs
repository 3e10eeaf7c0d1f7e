#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in `tsc_timer`.

use std::hint;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with a timeout, so a calibration that never publishes fails the test instead
/// of hanging the build.
///
/// The timeout is 10 seconds, or 60 seconds under Miri.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled
/// and the test function is executed directly, so mutation testing can detect hangs itself.
///
/// # Panics
///
/// Panics if the test exceeds the timeout or if the test itself panics.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if std::env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the receiver has already timed out.
        drop(tx.send(result));
    });

    let timeout = if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    };

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded {timeout:?} timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected unexpectedly"),
            Err(e) => std::panic::resume_unwind(e),
        },
    }
}

/// Keeps the current thread busy for at least `duration`, as measured by the monotonic clock.
///
/// Unlike sleeping, this keeps the thread on a processor, which is what a measured code
/// region usually does. Returns the time that actually elapsed.
pub fn busy_wait(duration: Duration) -> Duration {
    let start = Instant::now();

    loop {
        let elapsed = start.elapsed();

        if elapsed >= duration {
            return elapsed;
        }

        hint::spin_loop();
    }
}

/// Calculates the difference between two f64 values and considers
/// them equal if the difference is not more than `close_enough`.
///
/// This is a "correctly performed" floating point equality comparison.
#[must_use]
pub fn f64_diff_abs(a: f64, b: f64, close_enough: f64) -> f64 {
    let diff = (a - b).abs();

    if diff <= close_enough { 0.0 } else { diff }
}

/// Whether `measured` is within `relative` (a fraction, e.g. 0.05 for 5%) plus `absolute`
/// of `expected`.
#[must_use]
pub fn duration_is_near(
    measured: Duration,
    expected: Duration,
    relative: f64,
    absolute: Duration,
) -> bool {
    let allowed = expected.mul_f64(relative).saturating_add(absolute);

    measured.abs_diff(expected) <= allowed
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn watchdog_returns_correct_value() {
        let result = with_watchdog(|| "hello world");
        assert_eq!(result, "hello world");
    }

    #[cfg(not(miri))] // Too slow under Miri.
    #[test]
    fn busy_wait_waits_at_least_requested() {
        let requested = Duration::from_millis(2);

        let start = Instant::now();
        let reported = busy_wait(requested);

        assert!(reported >= requested);
        assert!(start.elapsed() >= requested);
    }

    #[test]
    fn duration_is_near_applies_both_tolerances() {
        let expected = Duration::from_millis(100);

        assert!(duration_is_near(
            Duration::from_millis(104),
            expected,
            0.05,
            Duration::ZERO
        ));
        assert!(!duration_is_near(
            Duration::from_millis(106),
            expected,
            0.05,
            Duration::ZERO
        ));
        assert!(duration_is_near(
            Duration::from_millis(106),
            expected,
            0.05,
            Duration::from_millis(1)
        ));
        assert!(duration_is_near(
            Duration::from_millis(96),
            expected,
            0.05,
            Duration::ZERO
        ));
    }

    #[test]
    fn f64_diff_abs_treats_close_values_as_equal() {
        assert_eq!(f64_diff_abs(1.0, 1.0 + 1e-9, 1e-6), 0.0);
        assert_eq!(f64_diff_abs(1.0, 1.5, 1e-6), 0.5);
    }
}
