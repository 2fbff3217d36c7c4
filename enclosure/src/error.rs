//! Error types for the Enclosure container.
//!
//! Every fallible operation in the crate reports an [`Error`]: a coarse
//! [`ErrorKind`] for programmatic handling plus a human-readable message.
//! Failures are returned to the immediate caller and never recovered from
//! inside the container.
//!
//! # Feature Flags
//!
//! - `tracing`: emits a `debug` event whenever an error is created.
//! - `debug`: prefixes the kind in `Display` output. Unlike the other public
//!   types, `Error` and `ErrorKind` derive `Debug` with or without this
//!   feature, since `std::error::Error` requires it.
//!
//! # Examples
//!
//! ```
//! use enclosure::error::{Error, ErrorKind};
//!
//! let err = Error::unresolved_abstract("Billing/InvoiceService");
//! assert_eq!(err.kind, ErrorKind::UnresolvedAbstract);
//! assert!(err.message.contains("Billing/InvoiceService"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Error categories for the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// No binding, alias target or fallback can supply the identifier.
    UnresolvedAbstract,
    /// The build stack grew past the configured maximum depth.
    ///
    /// This is how circular dependencies surface.
    MaxDepthExceeded,
    /// The identifier has no factory, wrap or constructor to build from.
    NotInstantiable,
    /// `bind` received a value the registry does not know how to bind.
    UnsupportedBindingKind,
    /// A built object could not be downcast to the requested type.
    TypeMismatch,
    /// A producer reported a failure.
    BuildFailed,
    /// No class map knows the requested class.
    ClassNotFound,
    /// A class path string is malformed.
    InvalidClassPath,
    /// A service provider lifecycle hook failed.
    ProviderFailed,
}

/// Container error structure.
#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// With the `tracing` feature the error is logged at debug level; it is
    /// still the caller's job to decide whether it matters.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
        };

        #[cfg(feature = "tracing")]
        debug!("{}", error);

        error
    }

    pub fn unresolved_abstract(id: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedAbstract,
            format!("Unable to resolve concrete type for: {}", id),
        )
    }

    /// An alias chain starting at `id` ends at `terminus`, which has no binding.
    pub fn dangling_alias(id: &str, terminus: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedAbstract,
            format!(
                "Unable to resolve concrete type for: {} (alias target {} is not bound)",
                id, terminus
            ),
        )
    }

    /// An alias chain loops back on itself.
    pub fn alias_cycle(chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::UnresolvedAbstract,
            format!("Alias cycle detected: {}", chain.join(" -> ")),
        )
    }

    /// The build stack exceeded `max_depth`; `chain` is the tail of the stack.
    pub fn max_depth_exceeded(max_depth: usize, chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::MaxDepthExceeded,
            format!(
                "Max dependency depth ({}) reached, possible circular dependency: ... -> {}",
                max_depth,
                chain.join(" -> ")
            ),
        )
    }

    pub fn not_instantiable(id: &str) -> Self {
        Self::new(
            ErrorKind::NotInstantiable,
            format!("The concrete type is not instantiable: {}", id),
        )
    }

    pub fn unsupported_binding_kind(id: &str, value_type: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedBindingKind,
            format!("Unsupported binding type for {}: {}", id, value_type),
        )
    }

    pub fn type_mismatch(id: &str, expected: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Type mismatch when resolving {}: expected {}", id, expected),
        )
    }

    /// Convenience for producers that need to report their own failure.
    pub fn build_failed(id: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::BuildFailed,
            format!("Failed to build {}: {}", id, reason),
        )
    }

    pub fn class_not_found(class_name: &str) -> Self {
        Self::new(
            ErrorKind::ClassNotFound,
            format!("Class not found: {}", class_name),
        )
    }

    pub fn invalid_class_path(path: &str) -> Self {
        Self::new(
            ErrorKind::InvalidClassPath,
            format!("ClassPath is not valid: {:?}", path),
        )
    }

    pub fn provider_failed(provider: &str, hook: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::ProviderFailed,
            format!("Provider {} failed during {}: {}", provider, hook, reason),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "debug")]
        {
            write!(f, "({:?}) - {}", self.kind, self.message)
        }
        #[cfg(not(feature = "debug"))]
        {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for Error {}
