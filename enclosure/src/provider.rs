//! Service providers: objects that register services into an [`Application`].
//!
//! A provider's [`register`](ServiceProvider::register) hook binds services
//! and its [`boot`](ServiceProvider::boot) hook runs once every provider has
//! registered, so it can resolve services other providers bound.
//!
//! # Feature Flags
//!
//! With `thread-safe` every provider must be `Send + Sync`.
//!
//! # Examples
//!
//! ```
//! use enclosure::{object, Application, Error, ServiceProvider, Wrap};
//!
//! struct MailProvider;
//!
//! impl ServiceProvider for MailProvider {
//!     fn register(&self, app: &Application) -> Result<(), Error> {
//!         app.bind_wrap_shared("Mailer", Wrap::leaf(|_, _| Ok(object(String::from("smtp")))));
//!         Ok(())
//!     }
//!
//!     fn provides(&self) -> Vec<String> {
//!         vec!["Mailer".to_string()]
//!     }
//! }
//!
//! let app = Application::new();
//! app.add_provider(MailProvider);
//! app.bootstrap().unwrap();
//!
//! assert_eq!(app.make_as::<String>("Mailer").unwrap().as_str(), "smtp");
//! assert_eq!(app.provided_services(), ["Mailer"]);
//! ```

use crate::application::Application;
use crate::error::Error;
use crate::runtime::{object, MaybeSendSync, Object, Shared};

pub trait ServiceProvider: MaybeSendSync {
    /// Binds this provider's services into the application.
    fn register(&self, app: &Application) -> Result<(), Error>;

    /// Runs after every provider has registered.
    fn boot(&self, _app: &Application) -> Result<(), Error> {
        Ok(())
    }

    /// Identifiers of the services this provider binds.
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Wraps a provider into an [`Object`] that
/// [`Application::add_provider_named`] can resolve from the container.
///
/// ```
/// use enclosure::{provider_object, Application, Error, ServiceProvider};
///
/// struct Noop;
///
/// impl ServiceProvider for Noop {
///     fn register(&self, _app: &Application) -> Result<(), Error> {
///         Ok(())
///     }
/// }
///
/// let app = Application::new();
/// app.bind_instance("Providers/Noop", provider_object(Noop));
/// app.add_provider_named("Providers/Noop").unwrap();
/// ```
pub fn provider_object<P>(provider: P) -> Object
where
    P: ServiceProvider + 'static,
{
    let provider: Shared<dyn ServiceProvider> = Shared::new(provider);
    object(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::downcast;

    struct Empty;

    impl ServiceProvider for Empty {
        fn register(&self, _app: &Application) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn default_hooks() {
        let app = Application::new();

        assert!(Empty.boot(&app).is_ok());
        assert!(Empty.provides().is_empty());
    }

    #[test]
    fn provider_object_holds_a_trait_object() {
        let made = provider_object(Empty);

        assert!(downcast::<Shared<dyn ServiceProvider>>(made).is_some());
    }
}
