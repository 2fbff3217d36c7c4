//! Runtime type definitions for shared ownership and interior mutability.
//!
//! This module provides conditional type aliases based on the `thread-safe` feature flag:
//!
//! - When `thread-safe` is enabled: Uses thread-safe types (`Arc` and `RwLock`)
//! - When `thread-safe` is disabled: Uses single-threaded types (`Rc` and `RefCell`)
//!
//! # Type Aliases
//!
//! - [`Shared<T>`]: Smart pointer for shared ownership
//! - [`Store<T>`]: Container providing interior mutability
//! - [`Object`]: A type-erased, shared value handed out by the container
//!
//! # Examples
//!
//! ```
//! use enclosure::runtime::{downcast, object, Shared};
//!
//! let value = object(String::from("Hello"));
//! let text: Shared<String> = downcast(value).unwrap();
//! assert_eq!(text.as_str(), "Hello");
//! ```

use std::any::Any;

#[cfg(feature = "thread-safe")]
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(not(feature = "thread-safe"))]
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// Type alias for shared ownership of data.
///
/// [`Arc<T>`] with the `thread-safe` feature, [`Rc<T>`] without it.
#[cfg(feature = "thread-safe")]
pub type Shared<T> = Arc<T>;
#[cfg(not(feature = "thread-safe"))]
pub type Shared<T> = Rc<T>;

/// Type alias for interior mutability.
///
/// [`RwLock<T>`] with the `thread-safe` feature, [`RefCell<T>`] without it.
#[cfg(feature = "thread-safe")]
pub type Store<T> = RwLock<T>;
#[cfg(not(feature = "thread-safe"))]
pub type Store<T> = RefCell<T>;

/// A built value, type-erased. Cloning an `Object` shares the same value, so
/// identity can be checked with [`Shared::ptr_eq`].
#[cfg(feature = "thread-safe")]
pub type Object = Shared<dyn Any + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type Object = Shared<dyn Any>;

/// Bound carried by everything the container stores or hands out.
///
/// `Send + Sync` with the `thread-safe` feature, no requirement otherwise.
#[cfg(feature = "thread-safe")]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(feature = "thread-safe")]
impl<T: ?Sized + Send + Sync> MaybeSendSync for T {}

#[cfg(not(feature = "thread-safe"))]
pub trait MaybeSendSync {}
#[cfg(not(feature = "thread-safe"))]
impl<T: ?Sized> MaybeSendSync for T {}

/// Wraps a value into an [`Object`].
pub fn object<T>(value: T) -> Object
where
    T: Any + MaybeSendSync,
{
    Shared::new(value)
}

/// Recovers the concrete type of an [`Object`], or `None` on a type mismatch.
pub fn downcast<T>(value: Object) -> Option<Shared<T>>
where
    T: Any + MaybeSendSync,
{
    value.downcast::<T>().ok()
}

#[cfg(feature = "thread-safe")]
pub(crate) fn read<T>(store: &Store<T>) -> RwLockReadGuard<'_, T> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(feature = "thread-safe")]
pub(crate) fn write<T>(store: &Store<T>) -> RwLockWriteGuard<'_, T> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(not(feature = "thread-safe"))]
pub(crate) fn read<T>(store: &Store<T>) -> Ref<'_, T> {
    store.borrow()
}

#[cfg(not(feature = "thread-safe"))]
pub(crate) fn write<T>(store: &Store<T>) -> RefMut<'_, T> {
    store.borrow_mut()
}
