use std::array;
use std::hint;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::CounterRead;
#[cfg(test)]
use crate::pal::MockBindings;
use crate::pal::{Bindings, BindingsFacade};

/// How many clock samples `now_pair()` brackets with counter reads.
const SAMPLE_TRIES: usize = 5;

/// Bit pattern of the scale before calibration. This is `0.0_f64`, which is never a valid scale.
const UNCALIBRATED: u64 = 0;

static GLOBAL: LazyLock<Calibration> =
    LazyLock::new(|| Calibration::from_bindings(BindingsFacade::real()));

/// A hardware counter reading paired with the monotonic clock timestamp taken alongside it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CounterClockPair {
    counter: u64,
    instant: Instant,
}

impl CounterClockPair {
    /// The hardware counter reading.
    #[must_use]
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    /// The monotonic clock timestamp.
    #[must_use]
    pub const fn instant(&self) -> Instant {
        self.instant
    }

    /// Nanoseconds per counter tick between `self` and a later pair.
    ///
    /// Returns `None` if either the counter or the clock made no progress, as no meaningful
    /// scale can be derived from that.
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 precision is far beyond the accuracy of the calibration itself"
    )]
    fn nanos_per_tick_until(&self, later: &Self) -> Option<f64> {
        let elapsed_nanos = later
            .instant
            .saturating_duration_since(self.instant)
            .as_nanos();
        let elapsed_ticks = later.counter.wrapping_sub(self.counter);

        if elapsed_nanos == 0 || elapsed_ticks == 0 {
            return None;
        }

        let scale = elapsed_nanos as f64 / elapsed_ticks as f64;

        (scale.is_finite() && scale > 0.0).then_some(scale)
    }
}

/// Relates hardware counter ticks to nanoseconds of monotonic clock time.
///
/// A base point is captured when the calibration is created. The scale (nanoseconds per tick)
/// is derived the first time it is requested, by comparing a fresh sample against the base
/// point, and never changes after that. The longer the gap between the two samples, the more
/// accurate the scale, which is why the scale is derived lazily.
///
/// Most code uses the process-wide instance from [`Calibration::global()`], which every
/// [`Timer`][crate::Timer] uses unless configured otherwise.
///
/// # Thread safety
///
/// Any number of threads may request the scale at the same time. Each thread that finds the
/// scale missing derives a candidate and tries to publish it. Exactly one candidate is
/// published; every caller, including the ones whose candidate was discarded, returns the
/// published value.
///
/// # Limitations
///
/// There is no recalibration. If the counter rate changes after calibration (e.g. the
/// processor has no invariant counter and changes frequency), durations are wrong.
#[derive(Debug)]
pub struct Calibration {
    base_point: CounterClockPair,

    // f64 bits, `UNCALIBRATED` until the first successful publish.
    scale: AtomicU64,

    bindings: BindingsFacade,
}

impl Calibration {
    /// Creates an independent calibration with its base point captured now.
    ///
    /// Prefer [`Calibration::global()`] unless you need a calibration that is isolated from
    /// the rest of the process.
    #[must_use]
    pub fn new() -> Self {
        Self::from_bindings(BindingsFacade::real())
    }

    /// The process-wide calibration.
    ///
    /// The base point is captured by the first call, so calling this early in the process
    /// (e.g. at the top of `main()`) gives the most accurate scale.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub(crate) fn from_bindings(bindings: BindingsFacade) -> Self {
        let base_point = now_pair(&bindings);

        debug!(
            counter = base_point.counter,
            "captured cycle counter calibration base point"
        );

        Self {
            base_point,
            scale: AtomicU64::new(UNCALIBRATED),
            bindings,
        }
    }

    /// The counter reading and clock timestamp captured when this calibration was created.
    #[must_use]
    pub const fn base_point(&self) -> CounterClockPair {
        self.base_point
    }

    /// Takes a counter reading and clock timestamp as close together as possible.
    ///
    /// The clock is sampled several times, each sample bracketed by counter reads. The bracket
    /// with the fewest elapsed ticks had the least interference (interrupts, preemption), so
    /// its clock sample is paired with the midpoint of its counter reads.
    #[must_use]
    pub fn now_pair(&self) -> CounterClockPair {
        now_pair(&self.bindings)
    }

    /// Nanoseconds per counter tick.
    ///
    /// The first call on a calibration derives the scale, which samples the counter and clock
    /// a handful of times. Every later call is a single atomic load.
    #[must_use]
    #[inline]
    pub fn scale(&self) -> f64 {
        let bits = self.scale.load(Ordering::Acquire);

        if bits == UNCALIBRATED {
            return self.calibrate();
        }

        f64::from_bits(bits)
    }

    /// Whether the scale has been published.
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.scale.load(Ordering::Acquire) != UNCALIBRATED
    }

    /// Converts counter ticks into nanoseconds, keeping fractional nanoseconds.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "tick counts beyond 2^53 are centuries away at realistic counter rates"
    )]
    pub fn ticks_to_nanos(&self, ticks: u64) -> f64 {
        ticks as f64 * self.scale()
    }

    /// Converts counter ticks into a [`Duration`], truncating fractional nanoseconds.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the value is a non-negative whole number of nanoseconds, saturating on overflow"
    )]
    pub fn ticks_to_duration(&self, ticks: u64) -> Duration {
        Duration::from_nanos(self.ticks_to_nanos(ticks).trunc() as u64)
    }

    /// A calibration that is already published with `scale` and never reads the bindings.
    #[cfg(test)]
    pub(crate) fn with_scale(scale: f64) -> Self {
        Self {
            base_point: CounterClockPair {
                counter: 0,
                instant: Instant::now(),
            },
            scale: AtomicU64::new(scale.to_bits()),
            bindings: MockBindings::new().into(),
        }
    }

    #[cold]
    fn calibrate(&self) -> f64 {
        let candidate = loop {
            let now = now_pair(&self.bindings);

            if let Some(scale) = self.base_point.nanos_per_tick_until(&now) {
                break scale;
            }

            // Called so soon after the base point that nothing has moved yet.
            hint::spin_loop();
        };

        self.publish(candidate)
    }

    /// Publishes `candidate` unless another scale is already published.
    ///
    /// Returns the scale that is published after the call.
    fn publish(&self, candidate: f64) -> f64 {
        debug_assert!(candidate.to_bits() != UNCALIBRATED);

        match self.scale.compare_exchange(
            UNCALIBRATED,
            candidate.to_bits(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                debug!(scale = candidate, "published cycle counter calibration");
                candidate
            }
            Err(published) => {
                // A failed exchange means the value was not UNCALIBRATED, so it is a real scale.
                let published = f64::from_bits(published);
                trace!(
                    discarded = candidate,
                    scale = published,
                    "cycle counter calibration was already published"
                );
                published
            }
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

/// The calibration a timer converts its ticks with.
#[derive(Clone, Debug)]
pub(crate) enum CalibrationRef {
    Global(&'static Calibration),
    Shared(Arc<Calibration>),
}

impl Deref for CalibrationRef {
    type Target = Calibration;

    fn deref(&self) -> &Calibration {
        match self {
            Self::Global(calibration) => calibration,
            Self::Shared(calibration) => calibration,
        }
    }
}

fn now_pair(bindings: &BindingsFacade) -> CounterClockPair {
    let first_counter = bindings.read_counter(CounterRead::Serialized);

    // `from_fn` calls the closure in index order, so the reads interleave as
    // counter, clock, counter, clock, ..., counter.
    let samples: [(Instant, u64); SAMPLE_TRIES] = array::from_fn(|_| {
        let instant = bindings.now();
        (instant, bindings.read_counter(CounterRead::Serialized))
    });

    let mut before = first_counter;
    let mut best: Option<(u64, CounterClockPair)> = None;

    for (instant, after) in samples {
        let delta = after.wrapping_sub(before);

        if best.is_none_or(|(best_delta, _)| delta < best_delta) {
            best = Some((
                delta,
                CounterClockPair {
                    counter: before.wrapping_add(delta >> 1),
                    instant,
                },
            ));
        }

        before = after;
    }

    let (_, pair) = best.expect("SAMPLE_TRIES is non-zero so there is always a best sample");
    pair
}
