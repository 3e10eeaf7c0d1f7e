//! Configuration of a [`Timer`].

use std::sync::Arc;

use crate::pal::BindingsFacade;
use crate::{Calibration, CalibrationRef, CounterRead, TimeUnit, Timer};

/// Builder for a [`Timer`] with `N` slots.
///
/// # Examples
///
/// ```
/// use tsc_timer::{CounterRead, TimeUnit, Timer};
///
/// let timer = Timer::<4>::builder()
///     .unit(TimeUnit::Micros)
///     .counter_read(CounterRead::Light)
///     .build();
///
/// assert_eq!(timer.slot_count(), 4);
/// assert_eq!(timer.unit(), TimeUnit::Micros);
/// ```
#[derive(Debug)]
#[must_use]
pub struct TimerBuilder<const N: usize> {
    unit: TimeUnit,
    counter_read: CounterRead,
    calibration: Option<Arc<Calibration>>,
    bindings: BindingsFacade,
}

impl<const N: usize> TimerBuilder<N> {
    pub(crate) const fn new() -> Self {
        Self {
            unit: TimeUnit::Nanos,
            counter_read: CounterRead::Serialized,
            calibration: None,
            bindings: BindingsFacade::real(),
        }
    }

    /// Sets the unit of [`Timer::get_in_unit()`] and of the printed report.
    ///
    /// Defaults to [`TimeUnit::Nanos`].
    pub fn unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets how the timer reads the hardware counter at slot boundaries.
    ///
    /// Defaults to [`CounterRead::Serialized`].
    pub fn counter_read(mut self, counter_read: CounterRead) -> Self {
        self.counter_read = counter_read;
        self
    }

    /// Converts ticks with the given calibration instead of [`Calibration::global()`].
    pub fn calibration(mut self, calibration: Arc<Calibration>) -> Self {
        self.calibration = Some(calibration);
        self
    }

    #[cfg(test)]
    pub(crate) fn bindings(mut self, bindings: BindingsFacade) -> Self {
        self.bindings = bindings;
        self
    }

    /// Creates the timer with every slot idle and zeroed.
    ///
    /// Unless a calibration was given, this captures the base point of the process-wide
    /// calibration if nothing has done so yet.
    #[must_use]
    pub fn build(self) -> Timer<N> {
        let calibration = self.calibration.map_or_else(
            || CalibrationRef::Global(Calibration::global()),
            CalibrationRef::Shared,
        );

        Timer::new_inner(self.unit, self.counter_read, calibration, self.bindings)
    }
}

impl<const N: usize> Default for TimerBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
