//! In-memory class maps and the loader that searches them.
//!
//! A [`ClassMap`] maps absolute class paths to [`Constructor`]s. A [`Loader`]
//! searches its maps in the order they were added and is the stock
//! [`Fallback`] for a container: identifiers with no binding are looked up as
//! class names.
//!
//! ```
//! use enclosure::{object, ClassMap, Constructor, Container, Loader};
//!
//! struct InvoiceService;
//!
//! let mut map = ClassMap::new();
//! map.add_constructor("/Billing/InvoiceService", Constructor::new(|_, _| Ok(object(InvoiceService))))
//!     .unwrap();
//!
//! let mut loader = Loader::new();
//! loader.add_map(map);
//!
//! let container = Container::new();
//! container.set_fallback(loader);
//! assert!(container.make_as::<InvoiceService>("Billing/InvoiceService").is_ok());
//! ```

use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::class_path::ClassPath;
use crate::error::Error;
use crate::fallback::Fallback;
use crate::producer::Constructor;

/// Class names mapped to their constructors. Names are stored in their
/// absolute form, so `Billing/InvoiceService` and `/Billing/InvoiceService`
/// are the same class.
#[derive(Clone, Default)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct ClassMap {
    constructors: HashMap<String, Constructor>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `full_class_name` to `constructor`, replacing any previous entry.
    pub fn add_constructor(&mut self, full_class_name: &str, constructor: Constructor) -> Result<(), Error> {
        let key = absolute_name(full_class_name)?;

        #[cfg(feature = "tracing")]
        trace!("Mapping class {}", key);

        self.constructors.insert(key, constructor);
        Ok(())
    }

    pub fn has(&self, full_class_name: &str) -> bool {
        absolute_name(full_class_name)
            .map(|key| self.constructors.contains_key(&key))
            .unwrap_or(false)
    }

    pub fn get(&self, full_class_name: &str) -> Result<Constructor, Error> {
        let key = absolute_name(full_class_name)?;

        self.constructors
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::class_not_found(full_class_name))
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

fn absolute_name(full_class_name: &str) -> Result<String, Error> {
    Ok(ClassPath::parse(full_class_name)?.to_absolute().to_string())
}

/// Looks classes up across several maps, first match wins.
#[derive(Clone, Default)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Loader {
    maps: Vec<ClassMap>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_map(&mut self, map: ClassMap) {
        self.maps.push(map);
    }

    /// False for unknown classes and for names that are not class paths.
    pub fn has(&self, full_class_name: &str) -> bool {
        self.maps.iter().any(|map| map.has(full_class_name))
    }

    pub fn get(&self, full_class_name: &str) -> Result<Constructor, Error> {
        // Surfaces InvalidClassPath before searching.
        ClassPath::parse(full_class_name)?;

        self.maps
            .iter()
            .find(|map| map.has(full_class_name))
            .ok_or_else(|| Error::class_not_found(full_class_name))?
            .get(full_class_name)
    }
}

impl Fallback for Loader {
    fn has(&self, id: &str) -> bool {
        Loader::has(self, id)
    }

    fn get(&self, id: &str) -> Result<Constructor, Error> {
        Loader::get(self, id)
    }
}
