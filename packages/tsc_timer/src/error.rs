use thiserror::Error;

/// Errors returned by the checked [`Timer`][crate::Timer] operations.
///
/// The unchecked operations panic instead, as they are meant for use in hot loops.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A slot index was outside the range of slots the timer was created with.
    #[error("slot {index} does not exist, the timer has {slot_count} slots")]
    SlotOutOfRange {
        /// The offending slot index.
        index: usize,

        /// The number of slots in the timer.
        slot_count: usize,
    },

    /// More `Start` labels were given in one call than the timer has slots.
    ///
    /// `Stop` labels are not counted.
    #[error("{count} start labels given but the timer has only {slot_count} slots")]
    TooManyLabels {
        /// The number of `Start` labels given.
        count: usize,

        /// The number of slots in the timer.
        slot_count: usize,
    },
}

/// A specialized `Result` type for timer operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
