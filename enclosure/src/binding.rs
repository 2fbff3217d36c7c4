#[cfg(not(feature = "thread-safe"))]
use std::marker::PhantomData;
#[cfg(feature = "thread-safe")]
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::lifetime::Lifetime;
use crate::producer::{Constructor, Factory, Wrap};

/// What an identifier is bound to, instances aside.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub(crate) enum Binding {
    Alias(String),
    Factory(Factory),
    Wrap(Wrap),
    Constructor(Constructor),
}

impl Binding {
    /// True for the kinds `build` can construct from.
    pub(crate) fn is_buildable(&self) -> bool {
        !matches!(self, Binding::Alias(_))
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Binding::Alias(_) => "alias",
            Binding::Factory(_) => "factory",
            Binding::Wrap(_) => "wrap",
            Binding::Constructor(_) => "constructor",
        }
    }
}

/// A registry entry: the binding plus the lifetime of what it builds.
#[cfg_attr(feature = "debug", derive(Debug))]
pub(crate) struct Entry {
    binding: Binding,
    lifetime: Lifetime,
    /// Held while a shared entry builds its cached object, so concurrent
    /// first requests run the producer once.
    #[cfg(feature = "thread-safe")]
    build_lock: Mutex<()>,
}

impl Entry {
    pub(crate) fn new(binding: Binding, lifetime: Lifetime) -> Self {
        Self {
            binding,
            lifetime,
            #[cfg(feature = "thread-safe")]
            build_lock: Mutex::new(()),
        }
    }

    /// Serialises first builds of this entry across threads.
    #[cfg(feature = "thread-safe")]
    pub(crate) fn lock_build(&self) -> MutexGuard<'_, ()> {
        self.build_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Single-threaded builds need no serialising.
    #[cfg(not(feature = "thread-safe"))]
    pub(crate) fn lock_build(&self) -> PhantomData<&'_ ()> {
        PhantomData
    }

    pub(crate) fn binding(&self) -> &Binding {
        &self.binding
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::object;

    #[test]
    fn aliases_are_not_buildable() {
        assert!(!Binding::Alias("ServiceOne".to_string()).is_buildable());
        assert!(Binding::Factory(Factory::new(|_, _| Ok(object(1u8)))).is_buildable());
        assert!(Binding::Wrap(Wrap::leaf(|_, _| Ok(object(1u8)))).is_buildable());
        assert!(Binding::Constructor(Constructor::new(|_, _| Ok(object(1u8)))).is_buildable());
    }

    #[test]
    fn entry_keeps_lifetime() {
        let entry = Entry::new(Binding::Alias("ServiceOne".to_string()), Lifetime::Shared);

        assert!(entry.lifetime().is_shared());
        assert_eq!(entry.binding().kind_name(), "alias");
    }
}
