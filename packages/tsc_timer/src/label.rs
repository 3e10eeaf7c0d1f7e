/// One entry in the label list passed to [`Timer::start()`][crate::Timer::start].
///
/// All labels in one call are applied at the same counter reading, so
/// `[Label::Stop(0), Label::Start(1)]` ends slot 0 exactly where slot 1 begins.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Label {
    /// The slot should be running after the call.
    Start(usize),

    /// The slot should be stopped before the slots to start are considered.
    Stop(usize),
}

impl Label {
    /// The slot index this label refers to.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Start(index) | Self::Stop(index) => index,
        }
    }
}
