//! Tests that measure real time with the real processor counter.
//!
//! The expected durations are measured with `std::time::Instant` around the same regions, so
//! the tests compare two clocks instead of trusting sleeps or busy-waits to be exact.

#![cfg(not(miri))] // Miri cannot execute counter instructions.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use testing::{busy_wait, duration_is_near, with_watchdog};
use tsc_timer::{Calibration, CounterRead, Label, TimeUnit, Timer};

#[test]
fn sleep_is_measured_within_five_percent() {
    let calibration = Arc::new(Calibration::new());
    let mut timer = Timer::<1>::builder().calibration(calibration).build();

    let start = Instant::now();
    timer.start(&[Label::Start(0)]);
    thread::sleep(Duration::from_millis(100));
    timer.end(&[0]);
    let expected = start.elapsed();

    let measured = timer.get(0);

    assert!(
        duration_is_near(measured, expected, 0.05, Duration::ZERO),
        "measured {measured:?}, expected {expected:?}"
    );
}

#[test]
fn consecutive_regions_are_measured_separately() {
    for counter_read in [CounterRead::Serialized, CounterRead::Light] {
        let mut timer = Timer::<2>::builder()
            .counter_read(counter_read)
            .unit(TimeUnit::Millis)
            .calibration(Arc::new(Calibration::new()))
            .build();

        timer.start(&[Label::Start(0)]);
        let first = busy_wait(Duration::from_millis(10));
        timer.start(&[Label::Stop(0), Label::Start(1)]);
        let second = busy_wait(Duration::from_millis(20));
        timer.end(&[1]);

        let tolerance = Duration::from_millis(2);

        assert!(
            duration_is_near(timer.get(0), first, 0.05, tolerance),
            "{counter_read:?}: slot 0 measured {:?}, expected {first:?}",
            timer.get(0)
        );
        assert!(
            duration_is_near(timer.get(1), second, 0.05, tolerance),
            "{counter_read:?}: slot 1 measured {:?}, expected {second:?}",
            timer.get(1)
        );

        // The unit only affects the floating-point view.
        let in_millis = timer.get_in_unit(1);
        assert!(in_millis > 15.0, "slot 1 measured {in_millis}ms");
    }
}

#[test]
fn nested_slot_contains_inner_slots() {
    let mut timer = Timer::<3>::builder()
        .calibration(Arc::new(Calibration::new()))
        .build();

    timer.start(&[Label::Start(0)]);

    for _ in 0..100 {
        timer.start(&[Label::Start(0), Label::Start(1)]);
        busy_wait(Duration::from_micros(10));
        timer.start(&[Label::Start(0), Label::Stop(1), Label::Start(2)]);
        busy_wait(Duration::from_micros(10));
        timer.end(&[2]);
    }

    timer.end(&[0]);

    assert!(timer.ticks(0) >= timer.ticks(1) + timer.ticks(2));
    // Each inner slot busy-waited at least 1ms in total.
    assert!(timer.get(1) >= Duration::from_micros(900));
    assert!(timer.get(2) >= Duration::from_micros(900));
}

#[test]
fn timers_sharing_fresh_calibration_agree_on_scale() {
    const THREADS: usize = 8;

    with_watchdog(|| {
        let calibration = Arc::new(Calibration::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        // Give the base point some distance so the scale is meaningful.
        busy_wait(Duration::from_millis(5));

        let handles = (0..THREADS)
            .map(|_| {
                let calibration = Arc::clone(&calibration);
                let barrier = Arc::clone(&barrier);

                thread::spawn(move || {
                    let mut timer = Timer::<1>::builder()
                        .calibration(Arc::clone(&calibration))
                        .build();

                    timer.start(&[Label::Start(0)]);
                    busy_wait(Duration::from_millis(1));
                    timer.end(&[0]);

                    barrier.wait();

                    // Every thread races to calibrate here.
                    _ = timer.get(0);

                    calibration.scale().to_bits()
                })
            })
            .collect::<Vec<_>>();

        let scales = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert!(calibration.is_calibrated());
        assert!(scales.iter().all(|scale| *scale == scales[0]));
    });
}

#[test]
fn timer_can_be_moved_between_threads() {
    let mut timer = Timer::<1>::new();

    timer.start(&[Label::Start(0)]);

    let timer = thread::spawn(move || {
        busy_wait(Duration::from_millis(1));
        timer.end(&[0]);
        timer
    })
    .join()
    .unwrap();

    assert!(!timer.is_running(0));
    assert!(timer.ticks(0) > 0);
}

#[test]
fn global_calibration_is_shared_by_default() {
    let timer = Timer::<1>::new();

    _ = timer.get(0);

    assert!(Calibration::global().is_calibrated());
}
