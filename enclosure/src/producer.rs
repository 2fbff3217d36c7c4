//! Producers: the callables the container builds objects with.
//!
//! Three shapes are supported, each mapping to a binding kind:
//!
//! - [`Factory`]: receives the container and the extra build parameters and
//!   is fully responsible for resolving whatever it needs.
//! - [`Wrap`]: an ordered list of dependency identifiers plus a constructor.
//!   The container resolves every dependency first and calls the constructor
//!   with the dependencies followed by the extra parameters.
//! - [`Constructor`]: a constructor without a declared dependency list. Its
//!   dependency identifiers come from the container's
//!   [`Introspect`](crate::introspect::Introspect) strategy at build time.
//!
//! # Feature Flags
//!
//! With `thread-safe` every producer must be `Send + Sync`.
//!
//! # Examples
//!
//! ```
//! use enclosure::{argument, object, Container, Shared, Wrap};
//!
//! struct Engine;
//! struct Car {
//!     engine: Shared<Engine>,
//! }
//!
//! let container = Container::new();
//! container.bind_wrap("Engine", Wrap::leaf(|_, _| Ok(object(Engine))));
//! container.bind_wrap(
//!     "Car",
//!     Wrap::new(["Engine"], |_, args| {
//!         Ok(object(Car {
//!             engine: argument(&args, 0)?,
//!         }))
//!     }),
//! );
//!
//! let car = container.make_as::<Car>("Car").unwrap();
//! let _engine: &Engine = &car.engine;
//! ```

use std::any::Any;

use crate::container::Container;
use crate::error::Error;
use crate::runtime::{downcast, MaybeSendSync, Object, Shared};

#[cfg(feature = "thread-safe")]
type FactoryFn = dyn Fn(&Container, &[Object]) -> Result<Object, Error> + Send + Sync;
#[cfg(not(feature = "thread-safe"))]
type FactoryFn = dyn Fn(&Container, &[Object]) -> Result<Object, Error>;

#[cfg(feature = "thread-safe")]
type ConstructFn = dyn Fn(&Container, Vec<Object>) -> Result<Object, Error> + Send + Sync;
#[cfg(not(feature = "thread-safe"))]
type ConstructFn = dyn Fn(&Container, Vec<Object>) -> Result<Object, Error>;

/// An opaque producer called with the container and the extra parameters.
#[derive(Clone)]
pub struct Factory {
    producer: Shared<FactoryFn>,
}

impl Factory {
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn(&Container, &[Object]) -> Result<Object, Error> + MaybeSendSync + 'static,
    {
        Self {
            producer: Shared::new(producer),
        }
    }

    pub(crate) fn produce(&self, container: &Container, parameters: &[Object]) -> Result<Object, Error> {
        (self.producer)(container, parameters)
    }
}

/// A constructor paired with the ordered identifiers of its dependencies.
///
/// The constructor receives the container, then one argument per dependency
/// in declaration order, then any extra build parameters.
#[derive(Clone)]
pub struct Wrap {
    dependencies: Vec<String>,
    constructor: Shared<ConstructFn>,
}

impl Wrap {
    pub fn new<I, S, F>(dependencies: I, constructor: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Container, Vec<Object>) -> Result<Object, Error> + MaybeSendSync + 'static,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            constructor: Shared::new(constructor),
        }
    }

    /// A wrap with no dependencies.
    pub fn leaf<F>(constructor: F) -> Self
    where
        F: Fn(&Container, Vec<Object>) -> Result<Object, Error> + MaybeSendSync + 'static,
    {
        Self::new(Vec::<String>::new(), constructor)
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub(crate) fn construct(&self, container: &Container, arguments: Vec<Object>) -> Result<Object, Error> {
        (self.constructor)(container, arguments)
    }
}

/// A constructor whose dependencies are discovered by introspection.
///
/// `parameters` plays the role of a function's declared argument names; the
/// default [`DeclaredParameters`](crate::introspect::DeclaredParameters)
/// strategy reads them back as dependency identifiers.
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<String>,
    construct: Shared<ConstructFn>,
}

impl Constructor {
    pub fn new<F>(construct: F) -> Self
    where
        F: Fn(&Container, Vec<Object>) -> Result<Object, Error> + MaybeSendSync + 'static,
    {
        Self {
            parameters: Vec::new(),
            construct: Shared::new(construct),
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub(crate) fn construct(&self, container: &Container, arguments: Vec<Object>) -> Result<Object, Error> {
        (self.construct)(container, arguments)
    }
}

/// Something whose dependency identifiers the container can list.
pub trait Dependent {
    fn dependency_names(&self, container: &Container) -> Result<Vec<String>, Error>;
}

impl Dependent for Wrap {
    fn dependency_names(&self, _container: &Container) -> Result<Vec<String>, Error> {
        Ok(self.dependencies.clone())
    }
}

impl Dependent for Constructor {
    fn dependency_names(&self, container: &Container) -> Result<Vec<String>, Error> {
        container.introspect().dependency_names(self)
    }
}

/// Reads the argument at `index` as a `T`.
///
/// Meant for use inside wrap and constructor closures.
pub fn argument<T>(arguments: &[Object], index: usize) -> Result<Shared<T>, Error>
where
    T: Any + MaybeSendSync,
{
    let type_name = std::any::type_name::<T>();
    let value = arguments.get(index).cloned().ok_or_else(|| {
        Error::build_failed(type_name, format!("missing argument at position {}", index))
    })?;

    downcast::<T>(value).ok_or_else(|| Error::type_mismatch(&format!("argument {}", index), type_name))
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory").finish_non_exhaustive()
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Wrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wrap")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
