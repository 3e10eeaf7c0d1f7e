use std::fmt::Debug;
use std::time::Instant;

use crate::CounterRead;

/// Bindings for the processor and operating system facilities that the timer reads.
///
/// All counter and clock reads must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// Reads the hardware cycle counter of the current processor.
    fn read_counter(&self, strategy: CounterRead) -> u64;

    // Rust has no clock abstraction, so this is what we mock to control monotonic time.
    fn now(&self) -> Instant;
}
