//! Pluggable discovery of a bare constructor's dependencies.
//!
//! A [`Constructor`] carries no dependency list of its own. When the
//! container builds one it asks its [`Introspect`] strategy which identifiers
//! to resolve, in order. The default, [`DeclaredParameters`], returns the
//! parameter names the constructor was declared with.

use crate::error::Error;
use crate::producer::Constructor;
use crate::runtime::MaybeSendSync;

pub trait Introspect: MaybeSendSync {
    fn dependency_names(&self, constructor: &Constructor) -> Result<Vec<String>, Error>;
}

/// Uses the constructor's declared parameter names as dependency identifiers.
#[derive(Clone, Copy, Default)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct DeclaredParameters;

impl Introspect for DeclaredParameters {
    fn dependency_names(&self, constructor: &Constructor) -> Result<Vec<String>, Error> {
        Ok(constructor.parameters().to_vec())
    }
}
