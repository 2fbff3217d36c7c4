//! A container that manages service providers.
//!
//! [`Application`] dereferences to its [`Container`], so every binding and
//! resolution method is available on it directly. On top of that it keeps an
//! ordered list of [`ServiceProvider`]s and runs their lifecycle:
//!
//! 1. **Registration**: [`register()`](Application::register) calls `register`
//!    on each provider not registered yet
//! 2. **Boot**: [`boot_providers()`](Application::boot_providers) calls `boot`
//!    on each provider not booted yet
//!
//! Each hook runs at most once per provider, in the order providers were
//! added. [`bootstrap()`](Application::bootstrap) does both.
//!
//! # Thread Safety
//!
//! With the `thread-safe` feature enabled providers must be `Send + Sync`, and
//! the application can be shared across threads like a container.

use std::ops::Deref;

#[cfg(feature = "tracing")]
use tracing::info;

use crate::config::Config;
use crate::container::Container;
use crate::error::Error;
use crate::provider::ServiceProvider;
use crate::runtime::{downcast, read, write, Shared, Store};

#[derive(Clone)]
struct Slot {
    name: String,
    provider: Shared<dyn ServiceProvider>,
    registered: bool,
    booted: bool,
}

#[derive(Clone, Copy)]
enum Hook {
    Register,
    Boot,
}

impl Hook {
    fn name(self) -> &'static str {
        match self {
            Hook::Register => "register",
            Hook::Boot => "boot",
        }
    }
}

/// A [`Container`] with service providers.
///
/// ```
/// use enclosure::{object, Application, Error, ServiceProvider, Wrap};
///
/// struct Counter;
///
/// impl ServiceProvider for Counter {
///     fn register(&self, app: &Application) -> Result<(), Error> {
///         app.bind_value("Start", 1u32);
///         Ok(())
///     }
///
///     fn boot(&self, app: &Application) -> Result<(), Error> {
///         let start = app.make_as::<u32>("Start")?;
///         app.bind_value("Next", *start + 1);
///         Ok(())
///     }
/// }
///
/// let app = Application::new();
/// app.add_provider(Counter);
/// app.bootstrap().unwrap();
///
/// assert_eq!(*app.make_as::<u32>("Next").unwrap(), 2);
/// ```
pub struct Application {
    container: Container,
    providers: Store<Vec<Slot>>,
}

impl Application {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        #[cfg(feature = "tracing")]
        info!("Creating new Application instance");

        Self {
            container: Container::with_config(config),
            providers: Store::new(Vec::new()),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Adds a provider. It takes part in the next `register` and
    /// `boot_providers` calls.
    pub fn add_provider<P>(&self, provider: P)
    where
        P: ServiceProvider + 'static,
    {
        self.push(std::any::type_name::<P>().to_string(), Shared::new(provider));
    }

    /// Resolves `id` from the container and adds the result as a provider.
    ///
    /// The bound object must be a `Shared<dyn ServiceProvider>` (see
    /// [`provider_object`](crate::provider::provider_object)); anything else
    /// fails with `TypeMismatch`.
    pub fn add_provider_named(&self, id: &str) -> Result<(), Error> {
        let made = self.container.make(id)?;
        let provider = downcast::<Shared<dyn ServiceProvider>>(made)
            .ok_or_else(|| Error::type_mismatch(id, "dyn ServiceProvider"))?;

        self.push(id.to_string(), Shared::clone(&*provider));
        Ok(())
    }

    fn push(&self, name: String, provider: Shared<dyn ServiceProvider>) {
        #[cfg(feature = "tracing")]
        info!("Adding provider {}", name);

        write(&self.providers).push(Slot {
            name,
            provider,
            registered: false,
            booted: false,
        });
    }

    pub fn provider_count(&self) -> usize {
        read(&self.providers).len()
    }

    /// Registers every provider that has not been registered yet.
    ///
    /// Providers added by a `register` hook are registered in the same call.
    /// The first failure stops the pass; providers after it stay pending.
    pub fn register(&self) -> Result<(), Error> {
        self.run(Hook::Register)
    }

    /// Boots every provider that has not been booted yet.
    pub fn boot_providers(&self) -> Result<(), Error> {
        self.run(Hook::Boot)
    }

    /// Registers then boots every pending provider.
    pub fn bootstrap(&self) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        info!("Starting application bootstrap process");

        self.register()?;
        self.boot_providers()?;

        #[cfg(feature = "tracing")]
        info!("Application bootstrap completed successfully");

        Ok(())
    }

    fn run(&self, hook: Hook) -> Result<(), Error> {
        let mut index = 0;

        // Hooks may add providers, so the length is re-read every step and the
        // lock is released before a hook runs.
        while let Some((name, provider)) = self.claim(index, hook) {
            index += 1;

            let Some(provider) = provider else {
                continue;
            };

            #[cfg(feature = "tracing")]
            info!("Running {} for provider {}", hook.name(), name);

            let outcome = match hook {
                Hook::Register => provider.register(self),
                Hook::Boot => provider.boot(self),
            };

            outcome.map_err(|err| Error::provider_failed(&name, hook.name(), err))?;
        }

        Ok(())
    }

    /// Marks the slot at `index` as done for `hook` and hands out its provider
    /// if it was still pending. `None` once past the end of the list.
    fn claim(&self, index: usize, hook: Hook) -> Option<(String, Option<Shared<dyn ServiceProvider>>)> {
        let mut providers = write(&self.providers);
        let slot = providers.get_mut(index)?;

        let done = match hook {
            Hook::Register => &mut slot.registered,
            Hook::Boot => &mut slot.booted,
        };

        if *done {
            return Some((slot.name.clone(), None));
        }

        *done = true;
        Some((slot.name.clone(), Some(slot.provider.clone())))
    }

    /// Every identifier the providers declare, in provider order, without
    /// duplicates.
    pub fn provided_services(&self) -> Vec<String> {
        let providers: Vec<Shared<dyn ServiceProvider>> =
            read(&self.providers).iter().map(|slot| slot.provider.clone()).collect();

        let mut services: Vec<String> = Vec::new();
        for service in providers.iter().flat_map(|provider| provider.provides()) {
            if !services.contains(&service) {
                services.push(service);
            }
        }
        services
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Application {
    type Target = Container;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<String> = read(&self.providers).iter().map(|slot| slot.name.clone()).collect();

        f.debug_struct("Application")
            .field("container", &self.container)
            .field("providers", &providers)
            .finish()
    }
}
