/// A fixed-size set of slot indexes in `0..N`.
///
/// `N` is expected to be small, so whole-set scans are linear in `N` and never allocate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SlotSet<const N: usize> {
    members: [bool; N],
}

impl<const N: usize> SlotSet<N> {
    pub(crate) const fn new() -> Self {
        Self {
            members: [false; N],
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is not in `0..N`.
    #[expect(
        clippy::indexing_slicing,
        reason = "out of range slot index is a caller bug, panic is the documented outcome"
    )]
    pub(crate) fn insert(&mut self, index: usize) {
        self.members[index] = true;
    }

    /// # Panics
    ///
    /// Panics if `index` is not in `0..N`.
    #[expect(
        clippy::indexing_slicing,
        reason = "out of range slot index is a caller bug, panic is the documented outcome"
    )]
    pub(crate) fn remove(&mut self, index: usize) {
        self.members[index] = false;
    }

    /// Returns `false` for indexes outside `0..N`.
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.members.get(index).copied().unwrap_or(false)
    }
}
