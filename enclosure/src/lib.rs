//! Enclosure: an Inversion-of-Control container with string-keyed bindings.
//!
//! See [`Container`] for binding and resolution, [`Application`] for service
//! providers and [`Loader`] for resolving unbound class names.

pub mod application;
pub mod build_stack;
pub mod class_path;
pub mod config;
pub mod container;
pub mod error;
pub mod fallback;
pub mod introspect;
pub mod lifetime;
pub mod loader;
pub mod producer;
pub mod provider;
pub mod runtime;

mod binding;

pub use application::*;
pub use build_stack::*;
pub use class_path::*;
pub use config::*;
pub use container::*;
pub use error::*;
pub use fallback::*;
pub use introspect::*;
pub use lifetime::*;
pub use loader::*;
pub use producer::*;
pub use provider::*;
pub use runtime::*;
