/// The unit in which a [`Timer`][crate::Timer] reports floating-point durations.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum TimeUnit {
    /// Seconds.
    Seconds,

    /// Milliseconds.
    Millis,

    /// Microseconds.
    Micros,

    /// Nanoseconds.
    #[default]
    Nanos,
}

impl TimeUnit {
    /// How many nanoseconds make up one of this unit.
    #[must_use]
    pub const fn nanos_per_unit(self) -> f64 {
        match self {
            Self::Seconds => 1_000_000_000.0,
            Self::Millis => 1_000_000.0,
            Self::Micros => 1_000.0,
            Self::Nanos => 1.0,
        }
    }

    /// Converts a nanosecond count into this unit, keeping the fractional part.
    #[must_use]
    pub fn nanos_to_unit(self, nanos: f64) -> f64 {
        nanos / self.nanos_per_unit()
    }

    /// The conventional suffix for this unit, e.g. `ms` for milliseconds.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Millis => "ms",
            Self::Micros => "µs",
            Self::Nanos => "ns",
        }
    }
}
