use std::fmt::Debug;
#[cfg(test)]
use std::sync::Arc;
use std::time::Instant;

use crate::CounterRead;
#[cfg(test)]
use crate::pal::MockBindings;
use crate::pal::{Bindings, BuildTargetBindings};

#[derive(Clone)]
pub(crate) enum BindingsFacade {
    Real(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    pub(crate) const fn real() -> Self {
        Self::Real(&BuildTargetBindings)
    }
}

impl Bindings for BindingsFacade {
    #[inline]
    fn read_counter(&self, strategy: CounterRead) -> u64 {
        match self {
            Self::Real(bindings) => bindings.read_counter(strategy),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.read_counter(strategy),
        }
    }

    fn now(&self) -> Instant {
        match self {
            Self::Real(bindings) => bindings.now(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.now(),
        }
    }
}

#[cfg(test)]
impl From<MockBindings> for BindingsFacade {
    fn from(bindings: MockBindings) -> Self {
        Self::Mock(Arc::new(bindings))
    }
}

impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(bindings) => bindings.fmt(f),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_receives_requested_strategy() {
        let mut bindings = MockBindings::new();

        bindings
            .expect_read_counter()
            .withf(|strategy| *strategy == CounterRead::Light)
            .once()
            .return_const(7_u64);

        bindings
            .expect_read_counter()
            .withf(|strategy| *strategy == CounterRead::Serialized)
            .once()
            .return_const(9_u64);

        let facade = BindingsFacade::from(bindings);

        assert_eq!(facade.read_counter(CounterRead::Light), 7);
        assert_eq!(facade.read_counter(CounterRead::Serialized), 9);
    }

    #[cfg(not(miri))] // Miri cannot execute counter instructions.
    #[test]
    fn real_counter_does_not_go_backwards() {
        let facade = BindingsFacade::real();

        for strategy in [CounterRead::Light, CounterRead::Serialized] {
            let first = facade.read_counter(strategy);
            let second = facade.read_counter(strategy);

            assert!(second >= first);
        }
    }
}
