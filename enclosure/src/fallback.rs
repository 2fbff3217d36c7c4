//! Secondary resolution path for identifiers with no explicit binding.
//!
//! The container consults its fallback only after alias resolution ends at an
//! identifier nothing is bound to, and only when [`Fallback::has`] says the
//! identifier can be supplied. Explicit bindings always win.

use crate::error::Error;
use crate::producer::Constructor;
use crate::runtime::MaybeSendSync;

pub trait Fallback: MaybeSendSync {
    fn has(&self, id: &str) -> bool;

    /// Returns the constructor for `id`. Only called after `has(id)` returned true.
    fn get(&self, id: &str) -> Result<Constructor, Error>;
}
