#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Accumulates the elapsed time of labeled code regions using the processor cycle counter.
//!
//! Reading the hardware cycle counter is far cheaper than asking the operating system for the
//! time, which makes it suitable for timing short regions inside hot loops. The counter is not
//! denominated in real time, so the ticks are converted to nanoseconds via a one-time
//! calibration against the monotonic clock.
//!
//! The core functionality includes:
//! - [`Timer`] - Accumulates ticks in `N` independent slots with start/stop semantics
//! - [`TimerBuilder`] - Configures the time unit, counter read strategy and calibration source
//! - [`Calibration`] - Relates counter ticks to nanoseconds, calibrated exactly once per process
//! - [`Label`] - Tells [`Timer::start()`] which slots to start and which to stop
//!
//! This package is a development tool for benchmarks and performance investigations.
//!
//! # Simple usage
//!
//! ```
//! use tsc_timer::{Label, TimeUnit, Timer};
//!
//! let mut timer = Timer::<2>::builder().unit(TimeUnit::Millis).build();
//!
//! timer.start(&[Label::Start(0)]);
//! std::hint::black_box((0..10_000).sum::<u64>());
//!
//! // Stops slot 0 and starts slot 1 at the same counter reading.
//! timer.start(&[Label::Stop(0), Label::Start(1)]);
//! std::hint::black_box((0..10_000).product::<u64>());
//!
//! timer.end(&[1]);
//!
//! for index in 0..timer.slot_count() {
//!     println!("{index}: {:?}", timer.get(index));
//! }
//! ```
//!
//! # Nested slots
//!
//! [`Timer::start()`] treats its `Start` labels as the complete set of slots that should be
//! running afterwards. Slots that are running but not listed are stopped. To keep an outer
//! slot running while the inner slots change, list it again:
//!
//! ```
//! use tsc_timer::{Label, Timer};
//!
//! let mut timer = Timer::<3>::new();
//!
//! timer.start(&[Label::Start(0)]);
//!
//! for _ in 0..10 {
//!     timer.start(&[Label::Start(0), Label::Start(1)]);
//!     std::hint::black_box(1 + 1);
//!     timer.start(&[Label::Start(0), Label::Stop(1), Label::Start(2)]);
//!     std::hint::black_box(2 + 2);
//!     timer.end(&[2]);
//! }
//!
//! timer.end(&[0]);
//!
//! assert!(timer.ticks(0) >= timer.ticks(1) + timer.ticks(2));
//! ```
//!
//! # Hardware assumptions
//!
//! The counter must tick at a constant rate and be synchronized between the processors the
//! measuring thread runs on. Frequency changes after calibration are not corrected.
//!
//! Only `x86_64` (RDTSC/RDTSCP) and `aarch64` (CNTVCT) targets are supported. Building for any
//! other target architecture fails at compile time.

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("tsc_timer requires a hardware cycle counter and supports only x86_64 and aarch64");

mod pal;

mod calibration;
mod counter_read;
mod error;
mod label;
mod slot_set;
mod time_unit;
mod timer;
mod timer_builder;

pub use calibration::*;
pub use counter_read::*;
pub use error::*;
pub use label::*;
pub(crate) use slot_set::*;
pub use time_unit::*;
pub use timer::*;
pub use timer_builder::*;
