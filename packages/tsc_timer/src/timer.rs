use std::fmt;
use std::time::Duration;

use crate::pal::{Bindings, BindingsFacade};
use crate::{CalibrationRef, CounterRead, Error, Label, Result, SlotSet, TimeUnit, TimerBuilder};

#[derive(Clone, Copy, Debug)]
struct Slot {
    accumulated_ticks: u64,

    // Some if and only if the slot is running.
    pending_start: Option<u64>,
}

impl Slot {
    const IDLE: Self = Self {
        accumulated_ticks: 0,
        pending_start: None,
    };
}

/// Accumulates elapsed hardware counter ticks in `N` independent slots.
///
/// Each slot is either idle or running. Starting a slot records the current counter reading,
/// stopping it adds the ticks elapsed since then to the slot's total. Starting a running slot
/// or stopping an idle one does nothing.
///
/// Every [`start()`][Self::start] and [`end()`][Self::end] call takes exactly one counter
/// reading and applies all of its transitions at that reading, so consecutive regions measured
/// by stopping one slot and starting the next in the same call leave no gap between them.
///
/// Totals are converted to time with the timer's [`Calibration`][crate::Calibration].
///
/// # Examples
///
/// ```
/// use tsc_timer::{Label, Timer};
///
/// let mut timer = Timer::<2>::new();
///
/// timer.start(&[Label::Start(0)]);
/// std::thread::sleep(std::time::Duration::from_millis(1));
/// timer.start(&[Label::Stop(0), Label::Start(1)]);
/// std::thread::sleep(std::time::Duration::from_millis(2));
/// timer.end(&[1]);
///
/// assert!(timer.get(0) > std::time::Duration::ZERO);
/// assert!(timer.get(1) > std::time::Duration::ZERO);
/// ```
///
/// # Panics
///
/// The operations without a `try_` prefix panic if given a slot index outside `0..N` or more
/// than `N` `Start` labels. The `try_` variants return an [`Error`] instead. Either way the
/// labels are checked before anything else happens, so a rejected call leaves the timer
/// untouched.
///
/// # Threading
///
/// A timer is meant to be used by one thread. It can be moved between threads but its
/// counter readings are only comparable if the counters of all processors involved are
/// synchronized.
#[derive(Debug)]
pub struct Timer<const N: usize> {
    slots: [Slot; N],
    running: SlotSet<N>,

    unit: TimeUnit,
    counter_read: CounterRead,

    calibration: CalibrationRef,
    bindings: BindingsFacade,
}

impl<const N: usize> Timer<N> {
    /// Creates a timer with default configuration, see [`TimerBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts configuring a new timer.
    pub fn builder() -> TimerBuilder<N> {
        TimerBuilder::new()
    }

    pub(crate) const fn new_inner(
        unit: TimeUnit,
        counter_read: CounterRead,
        calibration: CalibrationRef,
        bindings: BindingsFacade,
    ) -> Self {
        Self {
            slots: [Slot::IDLE; N],
            running: SlotSet::new(),
            unit,
            counter_read,
            calibration,
            bindings,
        }
    }

    /// Moves the timer to a new set of running slots at a single counter reading.
    ///
    /// The `Stop` labels are applied first. After that, the `Start` labels are the complete set
    /// of slots that should be running: idle slots in the set are started, running slots
    /// outside the set are stopped and running slots in the set keep running.
    ///
    /// Listing `[Label::Stop(a), Label::Start(b)]` ends slot `a` exactly where slot `b` begins.
    /// Listing `[Label::Stop(a), Label::Start(a)]` closes the current interval of slot `a` and
    /// opens a new one, which makes the elapsed time visible to [`get()`][Self::get] without
    /// pausing the slot.
    ///
    /// At most `N` `Start` labels may be given. `Stop` labels are not counted against that
    /// limit and may repeat; stopping an idle slot does nothing.
    ///
    /// # Panics
    ///
    /// Panics if more than `N` `Start` labels are given or any label refers to a slot outside
    /// `0..N`. All labels are checked before the counter is read, so a panicking call leaves
    /// the timer untouched.
    #[inline]
    pub fn start(&mut self, labels: &[Label]) {
        if let Err(error) = Self::check_labels(labels) {
            panic!("{error}");
        }

        self.apply_labels(labels);
    }

    /// Like [`start()`][Self::start] but returns an error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyLabels`] if more than `N` `Start` labels are given and
    /// [`Error::SlotOutOfRange`] if any label refers to a slot outside `0..N`. The timer is not
    /// modified and the counter is not read in either case.
    pub fn try_start(&mut self, labels: &[Label]) -> Result<()> {
        Self::check_labels(labels)?;

        self.apply_labels(labels);
        Ok(())
    }

    /// Stops exactly the given slots at a single counter reading.
    ///
    /// Slots that are not listed are not affected. Listing an idle slot does nothing.
    ///
    /// # Panics
    ///
    /// Panics if any index is outside `0..N`. The indexes are checked before the counter is
    /// read, so a panicking call leaves the timer untouched.
    #[inline]
    pub fn end(&mut self, indexes: &[usize]) {
        if let Err(error) = Self::check_indexes(indexes) {
            panic!("{error}");
        }

        self.stop_slots(indexes);
    }

    /// Like [`end()`][Self::end] but returns an error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotOutOfRange`] if any index is outside `0..N`. The timer is not
    /// modified and the counter is not read in that case.
    pub fn try_end(&mut self, indexes: &[usize]) -> Result<()> {
        Self::check_indexes(indexes)?;

        self.stop_slots(indexes);
        Ok(())
    }

    /// The time accumulated by a slot, truncated to whole nanoseconds.
    ///
    /// Only completed intervals count: if the slot is running, the time since it was last
    /// started is not included.
    ///
    /// The first call on a timer using a calibration that is not yet calibrated derives the
    /// scale, see [`Calibration::scale()`][crate::Calibration::scale].
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside `0..N`.
    #[must_use]
    pub fn get(&self, index: usize) -> Duration {
        self.calibration.ticks_to_duration(self.ticks(index))
    }

    /// Like [`get()`][Self::get] but validates the index first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotOutOfRange`] if `index` is outside `0..N`.
    pub fn try_get(&self, index: usize) -> Result<Duration> {
        Self::check_index(index)?;

        Ok(self.get(index))
    }

    /// The time accumulated by a slot in the configured [`TimeUnit`], with fractional
    /// nanoseconds preserved.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside `0..N`.
    #[must_use]
    pub fn get_in_unit(&self, index: usize) -> f64 {
        self.unit
            .nanos_to_unit(self.calibration.ticks_to_nanos(self.ticks(index)))
    }

    /// The raw counter ticks accumulated by a slot in completed intervals.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside `0..N`.
    #[must_use]
    pub fn ticks(&self, index: usize) -> u64 {
        self.slot(index).accumulated_ticks
    }

    /// Whether the slot is currently running.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside `0..N`.
    #[must_use]
    pub fn is_running(&self, index: usize) -> bool {
        self.slot(index).pending_start.is_some()
    }

    /// The number of slots, `N`.
    #[must_use]
    pub const fn slot_count(&self) -> usize {
        N
    }

    /// The unit used by [`get_in_unit()`][Self::get_in_unit] and the printed report.
    #[must_use]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// How the timer reads the hardware counter.
    #[must_use]
    pub const fn counter_read(&self) -> CounterRead {
        self.counter_read
    }

    /// Prints the time of every slot to stdout, one line per slot in index order.
    #[cfg_attr(test, mutants::skip)] // Stdout output is checked manually, `Display` is tested.
    pub fn print_to_stdout(&self) {
        print!("{self}");
    }

    // Labels must have been checked.
    fn apply_labels(&mut self, labels: &[Label]) {
        let now = self.bindings.read_counter(self.counter_read);

        let mut target = SlotSet::<N>::new();

        for label in labels {
            match *label {
                Label::Stop(index) => self.stop_slot(index, now),
                Label::Start(index) => target.insert(index),
            }
        }

        for index in 0..N {
            match (target.contains(index), self.running.contains(index)) {
                (true, false) => self.start_slot(index, now),
                (false, true) => self.stop_slot(index, now),
                _ => {}
            }
        }
    }

    // Indexes must have been checked.
    fn stop_slots(&mut self, indexes: &[usize]) {
        let now = self.bindings.read_counter(self.counter_read);

        for &index in indexes {
            self.stop_slot(index, now);
        }
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "out of range slot index is a caller bug, panic is the documented outcome"
    )]
    fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "indexes are checked by every caller before the counter is read"
    )]
    fn start_slot(&mut self, index: usize, now: u64) {
        self.slots[index].pending_start = Some(now);
        self.running.insert(index);
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "indexes are checked by every caller before the counter is read"
    )]
    fn stop_slot(&mut self, index: usize, now: u64) {
        let slot = &mut self.slots[index];

        if let Some(started) = slot.pending_start.take() {
            // Overflow needs centuries of accumulated time, so it is not checked.
            slot.accumulated_ticks = slot
                .accumulated_ticks
                .wrapping_add(now.wrapping_sub(started));
            self.running.remove(index);
        }
    }

    fn check_index(index: usize) -> Result<()> {
        if index < N {
            Ok(())
        } else {
            Err(Error::SlotOutOfRange {
                index,
                slot_count: N,
            })
        }
    }

    fn check_indexes(indexes: &[usize]) -> Result<()> {
        indexes.iter().try_for_each(|&index| Self::check_index(index))
    }

    fn check_labels(labels: &[Label]) -> Result<()> {
        for label in labels {
            Self::check_index(label.index())?;
        }

        let start_count = labels
            .iter()
            .filter(|label| matches!(label, Label::Start(_)))
            .count();

        if start_count <= N {
            Ok(())
        } else {
            Err(Error::TooManyLabels {
                count: start_count,
                slot_count: N,
            })
        }
    }
}

impl<const N: usize> Default for Timer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Display for Timer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..N {
            writeln!(
                f,
                "{index}: {}{}",
                self.get_in_unit(index),
                self.unit.suffix()
            )?;
        }

        Ok(())
    }
}
