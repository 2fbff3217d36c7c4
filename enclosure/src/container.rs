//! The binding registry and the build engine.
//!
//! Public API:
//! - `bind_instance` / `bind_value`: register an already built object
//! - `bind_alias`: point one identifier at another
//! - `bind_factory` / `bind_factory_shared`: register an opaque producer
//! - `bind_wrap` / `bind_wrap_shared`: register a constructor with declared dependencies
//! - `bind_constructor` / `bind_constructor_shared`: register a constructor whose
//!   dependencies come from the introspection strategy
//! - `bind`: untyped entry point that rejects values it cannot bind
//! - `make` / `make_as`: resolve an identifier, honouring shared lifetimes
//! - `build` / `build_as`: construct a concrete identifier without the cache
//!
//! Registry locks are never held while a producer runs, so producers may
//! resolve and bind re-entrantly. The first build of a shared binding holds
//! that binding's own build lock, so concurrent first requests for it run
//! the producer once.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::binding::{Binding, Entry};
use crate::build_stack::BuildGuard;
use crate::config::Config;
use crate::error::Error;
use crate::fallback::Fallback;
use crate::introspect::{DeclaredParameters, Introspect};
use crate::lifetime::Lifetime;
use crate::producer::{Constructor, Dependent, Factory, Wrap};
use crate::runtime::{downcast, object, read, write, MaybeSendSync, Object, Shared, Store};

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

/// Where an alias chain ends.
enum Concrete {
    /// An identifier with an instance or a non-alias binding.
    Bound(String),
    /// An identifier nothing is bound to.
    Unbound(String),
}

/// The IoC container.
///
/// ```
/// use enclosure::{argument, object, Container, Shared, Wrap};
///
/// struct One;
/// struct Two {
///     one: Shared<One>,
/// }
///
/// let container = Container::new();
/// container.bind_wrap("One", Wrap::leaf(|_, _| Ok(object(One))));
/// container.bind_wrap(
///     "Two",
///     Wrap::new(["One"], |_, args| Ok(object(Two { one: argument(&args, 0)? }))),
/// );
/// container.bind_alias("Greeter", "Two");
///
/// let two = container.make_as::<Two>("Greeter").unwrap();
/// let _one: &One = &two.one;
/// ```
pub struct Container {
    id: usize,
    config: Config,
    bindings: Store<HashMap<String, Shared<Entry>>>,
    instances: Store<HashMap<String, Object>>,
    introspect: Store<Shared<dyn Introspect>>,
    fallback: Store<Option<Shared<dyn Fallback>>>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "tracing")]
        debug!("Creating container #{} (max depth {})", id, config.max_depth);

        Self {
            id,
            config,
            bindings: Store::new(HashMap::new()),
            instances: Store::new(HashMap::new()),
            introspect: Store::new(Shared::new(DeclaredParameters)),
            fallback: Store::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the strategy used to list a bare constructor's dependencies.
    pub fn set_introspect<I>(&self, introspect: I)
    where
        I: Introspect + 'static,
    {
        *write(&self.introspect) = Shared::new(introspect);
    }

    /// Attaches the collaborator consulted for identifiers with no binding.
    pub fn set_fallback<F>(&self, fallback: F)
    where
        F: Fallback + 'static,
    {
        *write(&self.fallback) = Some(Shared::new(fallback));
    }

    pub(crate) fn introspect(&self) -> Shared<dyn Introspect> {
        read(&self.introspect).clone()
    }

    fn fallback(&self) -> Option<Shared<dyn Fallback>> {
        read(&self.fallback).clone()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Registers a pre-built object. It is returned as-is by every `make` and
    /// takes priority over any other binding of the same identifier.
    pub fn bind_instance(&self, id: impl Into<String>, instance: Object) {
        let id = id.into();

        #[cfg(feature = "tracing")]
        trace!("Binding instance for {}", id);

        write(&self.instances).insert(id, instance);
    }

    /// Wraps `value` into an [`Object`] and registers it as an instance.
    pub fn bind_value<T>(&self, id: impl Into<String>, value: T)
    where
        T: Any + MaybeSendSync,
    {
        self.bind_instance(id, object(value));
    }

    /// Makes `id` resolve to whatever `target` resolves to. `target` does not
    /// need to be bound yet.
    pub fn bind_alias(&self, id: impl Into<String>, target: impl Into<String>) {
        self.bind_internal(id.into(), Binding::Alias(target.into()), Lifetime::Transient);
    }

    pub fn bind_factory<F>(&self, id: impl Into<String>, producer: F)
    where
        F: Fn(&Container, &[Object]) -> Result<Object, Error> + MaybeSendSync + 'static,
    {
        self.bind_internal(id.into(), Binding::Factory(Factory::new(producer)), Lifetime::Transient);
    }

    /// Like [`bind_factory`](Self::bind_factory), but the first object made is cached.
    pub fn bind_factory_shared<F>(&self, id: impl Into<String>, producer: F)
    where
        F: Fn(&Container, &[Object]) -> Result<Object, Error> + MaybeSendSync + 'static,
    {
        self.bind_internal(id.into(), Binding::Factory(Factory::new(producer)), Lifetime::Shared);
    }

    pub fn bind_wrap(&self, id: impl Into<String>, wrap: Wrap) {
        self.bind_internal(id.into(), Binding::Wrap(wrap), Lifetime::Transient);
    }

    pub fn bind_wrap_shared(&self, id: impl Into<String>, wrap: Wrap) {
        self.bind_internal(id.into(), Binding::Wrap(wrap), Lifetime::Shared);
    }

    pub fn bind_constructor(&self, id: impl Into<String>, constructor: Constructor) {
        self.bind_internal(id.into(), Binding::Constructor(constructor), Lifetime::Transient);
    }

    pub fn bind_constructor_shared(&self, id: impl Into<String>, constructor: Constructor) {
        self.bind_internal(id.into(), Binding::Constructor(constructor), Lifetime::Shared);
    }

    /// Binds an untyped concrete: a [`Wrap`], a [`Constructor`], a [`Factory`],
    /// or a `String`/`&'static str` naming another identifier (an alias).
    ///
    /// ```
    /// use enclosure::{Container, ErrorKind};
    ///
    /// let container = Container::new();
    /// container.bind("HelloService", "ServiceOne").unwrap();
    ///
    /// let err = container.bind("ServiceTwo", 42u32).unwrap_err();
    /// assert_eq!(err.kind, ErrorKind::UnsupportedBindingKind);
    /// ```
    pub fn bind<C>(&self, id: impl Into<String>, concrete: C) -> Result<(), Error>
    where
        C: Any,
    {
        let id = id.into();
        let concrete: Box<dyn Any> = Box::new(concrete);

        let binding = match concrete.downcast::<Wrap>() {
            Ok(wrap) => Binding::Wrap(*wrap),
            Err(concrete) => match concrete.downcast::<Constructor>() {
                Ok(constructor) => Binding::Constructor(*constructor),
                Err(concrete) => match concrete.downcast::<Factory>() {
                    Ok(factory) => Binding::Factory(*factory),
                    Err(concrete) => match concrete.downcast::<String>() {
                        Ok(target) => Binding::Alias(*target),
                        Err(concrete) => match concrete.downcast::<&'static str>() {
                            Ok(target) => Binding::Alias(target.to_string()),
                            Err(_) => {
                                return Err(Error::unsupported_binding_kind(&id, std::any::type_name::<C>()));
                            }
                        },
                    },
                },
            },
        };

        self.bind_internal(id, binding, Lifetime::Transient);
        Ok(())
    }

    fn bind_internal(&self, id: String, binding: Binding, lifetime: Lifetime) {
        #[cfg(feature = "tracing")]
        trace!("Binding {} ({}) for {}", binding.kind_name(), lifetime, id);

        write(&self.bindings).insert(id, Shared::new(Entry::new(binding, lifetime)));
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn has_binding(&self, id: &str) -> bool {
        read(&self.bindings).contains_key(id)
    }

    pub fn has_instance(&self, id: &str) -> bool {
        read(&self.instances).contains_key(id)
    }

    fn entry(&self, id: &str) -> Option<Shared<Entry>> {
        read(&self.bindings).get(id).cloned()
    }

    fn cached(&self, id: &str) -> Option<Object> {
        read(&self.instances).get(id).cloned()
    }

    /// Follows alias bindings from `id` until an identifier with an instance
    /// or a non-alias binding, or one with nothing bound at all.
    fn follow_aliases(&self, id: &str) -> Result<Concrete, Error> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = id.to_string();

        loop {
            if self.has_instance(&current) {
                return Ok(Concrete::Bound(current));
            }

            let target = match self.entry(&current) {
                None => return Ok(Concrete::Unbound(current)),
                Some(entry) => match entry.binding() {
                    Binding::Alias(target) => target.clone(),
                    _ => return Ok(Concrete::Bound(current)),
                },
            };

            chain.push(current);

            if let Some(start) = chain.iter().position(|seen| *seen == target) {
                let mut cycle: Vec<&str> = chain[start..].iter().map(String::as_str).collect();
                cycle.push(&target);
                return Err(Error::alias_cycle(&cycle));
            }

            current = target;
        }
    }

    /// Returns the first non-alias identifier reachable from `id`.
    ///
    /// Fails with `UnresolvedAbstract` when the chain reaches an identifier
    /// with no binding, or loops.
    pub fn resolve_concrete_id(&self, id: &str) -> Result<String, Error> {
        match self.follow_aliases(id)? {
            Concrete::Bound(concrete) => Ok(concrete),
            Concrete::Unbound(terminus) => Err(Self::unresolved(id, &terminus)),
        }
    }

    fn unresolved(id: &str, terminus: &str) -> Error {
        if id == terminus {
            Error::unresolved_abstract(id)
        } else {
            Error::dangling_alias(id, terminus)
        }
    }

    /// True iff a factory, wrap or constructor is bound to exactly `concrete`.
    pub fn is_buildable(&self, concrete: &str) -> bool {
        self.entry(concrete)
            .map(|entry| entry.binding().is_buildable())
            .unwrap_or(false)
    }

    pub fn is_wrapped(&self, concrete: &str) -> bool {
        self.entry(concrete)
            .map(|entry| matches!(entry.binding(), Binding::Wrap(_)))
            .unwrap_or(false)
    }

    /// True iff [`make`](Self::make) can find something to return or build
    /// for `id`. Producers are not invoked, so a producer that fails would
    /// still make `make` fail.
    pub fn is_resolvable(&self, id: &str) -> bool {
        if self.has_instance(id) {
            return true;
        }

        match self.follow_aliases(id) {
            Ok(Concrete::Bound(concrete)) => self.has_instance(&concrete) || self.is_buildable(&concrete),
            Ok(Concrete::Unbound(terminus)) => self
                .fallback()
                .map(|fallback| fallback.has(&terminus))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// The identifiers this container is building on the current thread,
    /// outermost first. Empty outside of a build.
    pub fn build_stack(&self) -> Vec<String> {
        BuildGuard::stack(self.id)
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolves `id` into an object.
    ///
    /// Instances and cached shared objects are returned first. Otherwise the
    /// alias chain is followed to a concrete binding, which is built (and
    /// cached if shared). Identifiers with no binding go to the fallback when
    /// it can supply them.
    pub fn make(&self, id: &str) -> Result<Object, Error> {
        #[cfg(feature = "tracing")]
        trace!("Making {}", id);

        if let Some(cached) = self.cached(id) {
            #[cfg(feature = "tracing")]
            trace!("Found cached instance for {}", id);

            return Ok(cached);
        }

        let concrete = match self.follow_aliases(id)? {
            Concrete::Bound(concrete) => concrete,
            Concrete::Unbound(terminus) => return self.make_from_fallback(id, &terminus),
        };

        if let Some(cached) = self.cached(&concrete) {
            return Ok(cached);
        }

        let entry = match self.entry(&concrete) {
            Some(entry) if entry.binding().is_buildable() => entry,
            _ => return Err(Error::not_instantiable(&concrete)),
        };

        if !entry.lifetime().is_shared() {
            return self.build(&concrete, Vec::new());
        }

        // A shared entry already on this thread's build stack is a cycle: skip
        // the lock so the build reaches MaxDepthExceeded instead of blocking.
        let _build_lock = if self.build_stack().contains(&concrete) {
            None
        } else {
            Some(entry.lock_build())
        };

        // Another thread may have built it while we waited.
        if let Some(cached) = self.cached(&concrete) {
            return Ok(cached);
        }

        let built = self.build(&concrete, Vec::new())?;

        #[cfg(feature = "tracing")]
        debug!("Caching shared instance for {}", concrete);

        // An instance bound meanwhile for the same identifier takes priority.
        let mut instances = write(&self.instances);
        let cached = instances.entry(concrete).or_insert(built).clone();
        Ok(cached)
    }

    fn make_from_fallback(&self, id: &str, terminus: &str) -> Result<Object, Error> {
        let fallback = match self.fallback() {
            Some(fallback) if fallback.has(terminus) => fallback,
            _ => return Err(Self::unresolved(id, terminus)),
        };

        #[cfg(feature = "tracing")]
        debug!("Delegating {} to the fallback", terminus);

        let constructor = fallback.get(terminus)?;
        let _guard = BuildGuard::push(self.id, terminus, self.config.max_depth)?;
        self.construct(&constructor, Vec::new())
    }

    /// Resolves `id` and downcasts the result.
    pub fn make_as<T>(&self, id: &str) -> Result<Shared<T>, Error>
    where
        T: Any + MaybeSendSync,
    {
        let made = self.make(id)?;
        downcast::<T>(made).ok_or_else(|| Error::type_mismatch(id, std::any::type_name::<T>()))
    }

    /// Builds a new object for `concrete`, passing `parameters` after the
    /// resolved dependencies. Never reads or fills the shared-instance cache.
    ///
    /// Factories are called directly. Everything else is built under the
    /// build stack, which fails with `MaxDepthExceeded` past the configured
    /// depth. Aliases, instances and unknown identifiers are `NotInstantiable`.
    pub fn build(&self, concrete: &str, parameters: Vec<Object>) -> Result<Object, Error> {
        let entry = self.entry(concrete);

        if let Some(Binding::Factory(factory)) = entry.as_deref().map(Entry::binding) {
            #[cfg(feature = "tracing")]
            debug!("Building {} from its factory", concrete);

            return factory.produce(self, &parameters);
        }

        let _guard = BuildGuard::push(self.id, concrete, self.config.max_depth)?;

        match entry.as_deref().map(Entry::binding) {
            Some(Binding::Wrap(wrap)) => {
                #[cfg(feature = "tracing")]
                debug!("Building {} from its wrap", concrete);

                let mut arguments = self.resolve_dependencies(wrap)?;
                arguments.extend(parameters);
                wrap.construct(self, arguments)
            }
            Some(Binding::Constructor(constructor)) => {
                #[cfg(feature = "tracing")]
                debug!("Building {} from its constructor", concrete);

                self.construct(constructor, parameters)
            }
            _ => Err(Error::not_instantiable(concrete)),
        }
    }

    /// Builds `concrete` and downcasts the result.
    pub fn build_as<T>(&self, concrete: &str, parameters: Vec<Object>) -> Result<Shared<T>, Error>
    where
        T: Any + MaybeSendSync,
    {
        let built = self.build(concrete, parameters)?;
        downcast::<T>(built).ok_or_else(|| Error::type_mismatch(concrete, std::any::type_name::<T>()))
    }

    fn construct(&self, constructor: &Constructor, parameters: Vec<Object>) -> Result<Object, Error> {
        let mut arguments = self.resolve_dependencies(constructor)?;
        arguments.extend(parameters);
        constructor.construct(self, arguments)
    }

    /// Resolves every dependency of `producer` through [`make`](Self::make),
    /// in order. The first failure aborts the whole list.
    pub fn resolve_dependencies<D>(&self, producer: &D) -> Result<Vec<Object>, Error>
    where
        D: Dependent + ?Sized,
    {
        producer
            .dependency_names(self)?
            .iter()
            .map(|name| self.make(name))
            .collect()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bindings: Vec<String> = read(&self.bindings).keys().cloned().collect();
        let mut instances: Vec<String> = read(&self.instances).keys().cloned().collect();
        bindings.sort();
        instances.sort();

        f.debug_struct("Container")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("bindings", &bindings)
            .field("instances", &instances)
            .field("fallback", &self.fallback().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::producer::argument;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ServiceOne;

    impl ServiceOne {
        fn name(&self) -> &'static str {
            "Hello World from ServiceOne"
        }
    }

    struct ServiceTwo;

    struct ServiceThree {
        one: Shared<ServiceOne>,
        _two: Shared<ServiceTwo>,
    }

    struct Greeting {
        text: String,
    }

    fn one_wrap() -> Wrap {
        Wrap::leaf(|_, _| Ok(object(ServiceOne)))
    }

    fn counting_wrap(calls: Arc<AtomicUsize>) -> Wrap {
        Wrap::leaf(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(object(ServiceOne))
        })
    }

    fn three_constructor() -> Constructor {
        Constructor::new(|_, args| {
            Ok(object(ServiceThree {
                one: argument(&args, 0)?,
                _two: argument(&args, 1)?,
            }))
        })
        .with_parameters(["ServiceOne", "ServiceTwo"])
    }

    fn kind_of(result: Result<Object, Error>) -> ErrorKind {
        match result {
            Ok(_) => panic!("expected an error"),
            Err(err) => err.kind,
        }
    }

    struct StaticFallback {
        known: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl Fallback for StaticFallback {
        fn has(&self, id: &str) -> bool {
            id == self.known
        }

        fn get(&self, _id: &str) -> Result<Constructor, Error> {
            let calls = self.calls.clone();
            Ok(Constructor::new(move |_, args| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(object(Greeting {
                    text: format!("from fallback with {} dependencies", args.len()),
                }))
            })
            .with_parameters(["ServiceOne"]))
        }
    }

    // -- instances ---------------------------------------------------------

    #[test]
    fn test_instances_keep_identity() {
        let container = Container::new();
        let instance = object(ServiceOne);
        container.bind_instance("ServiceOne", instance.clone());

        let first = container.make("ServiceOne").unwrap();
        let second = container.make("ServiceOne").unwrap();

        assert!(Shared::ptr_eq(&first, &instance));
        assert!(Shared::ptr_eq(&second, &instance));
    }

    #[test]
    fn test_instances_take_priority_over_bindings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        let instance = object(ServiceOne);

        container.bind_instance("ServiceOne", instance.clone());
        container.bind_wrap("ServiceOne", counting_wrap(calls.clone()));

        assert!(Shared::ptr_eq(&container.make("ServiceOne").unwrap(), &instance));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bind_instance_last_writer_wins() {
        let container = Container::new();
        container.bind_value("Answer", 1u32);
        container.bind_value("Answer", 2u32);

        assert_eq!(*container.make_as::<u32>("Answer").unwrap(), 2);
    }

    // -- bindings ----------------------------------------------------------

    #[test]
    fn test_wrap_builds_distinct_instances() {
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());

        let first = container.make("ServiceOne").unwrap();
        let second = container.make("ServiceOne").unwrap();

        assert!(!Shared::ptr_eq(&first, &second));
        assert!(downcast::<ServiceOne>(first).is_some());
    }

    #[test]
    fn test_constructor_builds_distinct_instances() {
        let container = Container::new();
        container.bind_constructor("ServiceOne", Constructor::new(|_, _| Ok(object(ServiceOne))));

        let first = container.make("ServiceOne").unwrap();
        let second = container.make("ServiceOne").unwrap();

        assert!(!Shared::ptr_eq(&first, &second));
    }

    #[test]
    fn test_factory_receives_container() {
        let container = Container::new();
        container.bind_value("Name", String::from("factory"));
        container.bind_factory("Greeting", |c, _| {
            let name = c.make_as::<String>("Name")?;
            Ok(object(Greeting {
                text: format!("Hello from {}", name),
            }))
        });

        let greeting = container.make_as::<Greeting>("Greeting").unwrap();
        assert_eq!(greeting.text, "Hello from factory");
    }

    #[test]
    fn test_rebinding_replaces_previous_binding() {
        let container = Container::new();
        container.bind_wrap("Service", Wrap::leaf(|_, _| Ok(object(1u32))));
        container.bind_wrap("Service", Wrap::leaf(|_, _| Ok(object(2u32))));

        assert_eq!(*container.make_as::<u32>("Service").unwrap(), 2);
    }

    // -- shared ------------------------------------------------------------

    #[test]
    fn test_shared_wrap_is_built_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_wrap_shared("ServiceOne", counting_wrap(calls.clone()));

        let first = container.make("ServiceOne").unwrap();
        let second = container.make("ServiceOne").unwrap();

        assert!(Shared::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_factory_is_built_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let container = Container::new();
        container.bind_factory_shared("ServiceOne", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(object(ServiceOne))
        });

        let first = container.make("ServiceOne").unwrap();
        let second = container.make("ServiceOne").unwrap();

        assert!(Shared::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_constructor_is_built_once() {
        let container = Container::new();
        container.bind_constructor_shared("ServiceOne", Constructor::new(|_, _| Ok(object(ServiceOne))));

        let first = container.make("ServiceOne").unwrap();
        let second = container.make("ServiceOne").unwrap();

        assert!(Shared::ptr_eq(&first, &second));
    }

    #[test]
    fn test_shared_instance_is_reached_through_aliases() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_wrap_shared("ServiceOne", counting_wrap(calls.clone()));
        container.bind_alias("HelloService", "ServiceOne");

        let direct = container.make("ServiceOne").unwrap();
        let aliased = container.make("HelloService").unwrap();

        assert!(Shared::ptr_eq(&direct, &aliased));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_bypasses_shared_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_wrap_shared("ServiceOne", counting_wrap(calls.clone()));

        let made = container.make("ServiceOne").unwrap();
        let built = container.build("ServiceOne", Vec::new()).unwrap();

        assert!(!Shared::ptr_eq(&made, &built));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(Shared::ptr_eq(&made, &container.make("ServiceOne").unwrap()));
    }

    #[test]
    fn test_transient_results_are_not_cached() {
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());
        container.make("ServiceOne").unwrap();

        assert!(!container.has_instance("ServiceOne"));
    }

    // -- aliases -----------------------------------------------------------

    #[test]
    fn test_alias_chains_resolve_transitively() {
        let container = Container::new();
        container.bind_alias("A", "B");
        container.bind_alias("B", "C");
        container.bind_wrap("C", one_wrap());

        let made = container.make_as::<ServiceOne>("A").unwrap();
        assert_eq!(made.name(), "Hello World from ServiceOne");
        assert_eq!(container.resolve_concrete_id("A").unwrap(), "C");
    }

    #[test]
    fn test_alias_to_instance() {
        let container = Container::new();
        let instance = object(ServiceOne);
        container.bind_instance("ServiceOne", instance.clone());
        container.bind_alias("HelloService", "ServiceOne");

        assert!(Shared::ptr_eq(&container.make("HelloService").unwrap(), &instance));
    }

    #[test]
    fn test_dangling_alias_is_unresolved() {
        let container = Container::new();
        container.bind_alias("HelloService", "ServiceOne");

        let err = container.resolve_concrete_id("HelloService").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedAbstract);
        assert!(err.message.contains("ServiceOne"));
        assert_eq!(kind_of(container.make("HelloService")), ErrorKind::UnresolvedAbstract);
    }

    #[test]
    fn test_unknown_identifier_is_unresolved() {
        let container = Container::new();

        assert_eq!(kind_of(container.make("ServiceFive")), ErrorKind::UnresolvedAbstract);
        assert_eq!(
            container.resolve_concrete_id("ServiceFive").unwrap_err().kind,
            ErrorKind::UnresolvedAbstract
        );
    }

    #[test]
    fn test_alias_cycle_terminates() {
        let container = Container::new();
        container.bind_alias("A", "B");
        container.bind_alias("B", "C");
        container.bind_alias("C", "A");

        let err = container.resolve_concrete_id("A").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedAbstract);
        assert!(err.message.contains("A -> B -> C -> A"));
        assert_eq!(kind_of(container.make("B")), ErrorKind::UnresolvedAbstract);
        assert!(!container.is_resolvable("C"));
    }

    #[test]
    fn test_self_alias_terminates() {
        let container = Container::new();
        container.bind_alias("A", "A");

        assert_eq!(kind_of(container.make("A")), ErrorKind::UnresolvedAbstract);
    }

    // -- build -------------------------------------------------------------

    #[test]
    fn test_build_passes_parameters_after_dependencies() {
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());
        container.bind_wrap(
            "Greeting",
            Wrap::new(["ServiceOne"], |_, args| {
                assert_eq!(args.len(), 2);
                let one = argument::<ServiceOne>(&args, 0)?;
                let text = argument::<String>(&args, 1)?;
                Ok(object(Greeting {
                    text: format!("{}: {}", text, one.name()),
                }))
            }),
        );

        let greeting = container
            .build_as::<Greeting>("Greeting", vec![object(String::from("Hello"))])
            .unwrap();
        assert_eq!(greeting.text, "Hello: Hello World from ServiceOne");
    }

    #[test]
    fn test_build_passes_parameters_to_factories() {
        let container = Container::new();
        container.bind_factory("Greeting", |_, params| {
            let text = argument::<String>(params, 0)?;
            Ok(object(Greeting {
                text: text.to_string(),
            }))
        });

        let greeting = container
            .build_as::<Greeting>("Greeting", vec![object(String::from("Hello"))])
            .unwrap();
        assert_eq!(greeting.text, "Hello");
    }

    #[test]
    fn test_build_passes_parameters_to_constructors() {
        let container = Container::new();
        container.bind_constructor(
            "Greeting",
            Constructor::new(|_, args| {
                Ok(object(Greeting {
                    text: argument::<String>(&args, 0)?.to_string(),
                }))
            }),
        );

        let greeting = container
            .build_as::<Greeting>("Greeting", vec![object(String::from("Hello"))])
            .unwrap();
        assert_eq!(greeting.text, "Hello");
    }

    #[test]
    fn test_build_refuses_abstracts() {
        let container = Container::new();
        container.bind_factory("ServiceOne", |_, _| Ok(object(ServiceOne)));
        container.bind_alias("HelloService", "ServiceOne");
        container.bind_value("Instance", ServiceTwo);

        assert_eq!(kind_of(container.build("HelloService", Vec::new())), ErrorKind::NotInstantiable);
        assert_eq!(kind_of(container.build("Instance", Vec::new())), ErrorKind::NotInstantiable);
        assert_eq!(kind_of(container.build("Missing", Vec::new())), ErrorKind::NotInstantiable);
        assert!(container.build_stack().is_empty());
    }

    #[test]
    fn test_nested_dependencies_are_built_first() {
        let container = Container::new();
        container.bind_wrap("One", Wrap::leaf(|_, _| Ok(object(ServiceOne))));
        container.bind_wrap(
            "Two",
            Wrap::new(["One"], |c, args| {
                let one = argument::<ServiceOne>(&args, 0)?;
                assert_eq!(one.name(), "Hello World from ServiceOne");
                assert_eq!(c.build_stack(), ["Two"]);
                Ok(object(ServiceTwo))
            }),
        );

        assert!(container.make_as::<ServiceTwo>("Two").is_ok());
    }

    #[test]
    fn test_constructor_dependencies_use_introspection() {
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());
        container.bind_wrap("ServiceTwo", Wrap::leaf(|_, _| Ok(object(ServiceTwo))));
        container.bind_constructor("ServiceThree", three_constructor());

        let three = container.make_as::<ServiceThree>("ServiceThree").unwrap();
        assert_eq!(three.one.name(), "Hello World from ServiceOne");
    }

    #[test]
    fn test_custom_introspection_strategy() {
        struct Fixed;

        impl Introspect for Fixed {
            fn dependency_names(&self, _constructor: &Constructor) -> Result<Vec<String>, Error> {
                Ok(vec!["ServiceTwo".to_string(), "ServiceOne".to_string()])
            }
        }

        let container = Container::new();
        container.set_introspect(Fixed);
        container.bind_wrap("ServiceOne", one_wrap());
        container.bind_wrap("ServiceTwo", Wrap::leaf(|_, _| Ok(object(ServiceTwo))));
        container.bind_constructor(
            "Pair",
            Constructor::new(|_, args| {
                argument::<ServiceTwo>(&args, 0)?;
                argument::<ServiceOne>(&args, 1)?;
                Ok(object(()))
            }),
        );

        assert!(container.make("Pair").is_ok());
    }

    #[test]
    fn test_resolve_dependencies_for_wraps_and_constructors() {
        let container = Container::new();
        container.bind_wrap("ServiceTwo", Wrap::leaf(|_, _| Ok(object(ServiceTwo))));
        container.bind_wrap("ServiceOneClone", one_wrap());
        container.bind_wrap("ServiceOne", one_wrap());

        let wrap = Wrap::new(["ServiceTwo", "ServiceOneClone"], |_, _| Ok(object(ServiceOne)));
        let dependencies = container.resolve_dependencies(&wrap).unwrap();
        assert!(downcast::<ServiceTwo>(dependencies[0].clone()).is_some());
        assert!(downcast::<ServiceOne>(dependencies[1].clone()).is_some());

        let dependencies = container.resolve_dependencies(&three_constructor()).unwrap();
        assert!(downcast::<ServiceOne>(dependencies[0].clone()).is_some());
        assert!(downcast::<ServiceTwo>(dependencies[1].clone()).is_some());
    }

    // -- cycles and depth --------------------------------------------------

    #[test]
    fn test_circular_dependency_hits_max_depth() {
        let container = Container::new();
        container.bind_wrap("ServiceOne", Wrap::new(["ServiceTwo"], |_, _| Ok(object(ServiceOne))));
        container.bind_wrap("ServiceTwo", Wrap::new(["ServiceOne"], |_, _| Ok(object(ServiceTwo))));

        assert_eq!(kind_of(container.make("ServiceOne")), ErrorKind::MaxDepthExceeded);
        assert_eq!(kind_of(container.build("ServiceTwo", Vec::new())), ErrorKind::MaxDepthExceeded);
        assert!(container.build_stack().is_empty());
    }

    #[test]
    fn test_self_dependency_hits_max_depth() {
        let container = Container::with_config(Config::default().with_max_depth(4));
        container.bind_constructor(
            "Loop",
            Constructor::new(|_, _| Ok(object(()))).with_parameters(["Loop"]),
        );

        let err = container.make("Loop").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxDepthExceeded);
        assert!(err.message.contains("Loop -> Loop"));
    }

    #[test]
    fn test_shared_self_dependency_hits_max_depth() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let container = Container::with_config(Config::default().with_max_depth(4));
        container.bind_wrap_shared(
            "Loop",
            Wrap::new(["Loop"], move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(object(()))
            }),
        );

        assert_eq!(kind_of(container.make("Loop")), ErrorKind::MaxDepthExceeded);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!container.has_instance("Loop"));
        assert!(container.build_stack().is_empty());
    }

    #[test]
    fn test_max_depth_allows_exactly_the_limit() {
        let container = Container::with_config(Config::default().with_max_depth(3));
        container.bind_wrap("L1", Wrap::leaf(|_, _| Ok(object(1u8))));
        container.bind_wrap("L2", Wrap::new(["L1"], |_, _| Ok(object(2u8))));
        container.bind_wrap("L3", Wrap::new(["L2"], |_, _| Ok(object(3u8))));
        container.bind_wrap("L4", Wrap::new(["L3"], |_, _| Ok(object(4u8))));

        assert!(container.make("L3").is_ok());
        assert_eq!(kind_of(container.make("L4")), ErrorKind::MaxDepthExceeded);
    }

    #[test]
    fn test_factories_do_not_count_towards_depth() {
        let container = Container::with_config(Config::default().with_max_depth(1));
        container.bind_wrap("Leaf", Wrap::leaf(|_, _| Ok(object(1u8))));
        container.bind_factory("Outer", |c, _| c.make("Leaf"));

        assert!(container.make("Outer").is_ok());
    }

    #[test]
    fn test_failed_dependency_unwinds_build_stack() {
        let container = Container::new();
        container.bind_wrap("Broken", Wrap::new(["Missing"], |_, _| Ok(object(()))));
        container.bind_wrap("Outer", Wrap::new(["Broken"], |_, _| Ok(object(()))));
        container.bind_wrap("ServiceOne", one_wrap());

        assert_eq!(kind_of(container.make("Outer")), ErrorKind::UnresolvedAbstract);
        assert!(container.build_stack().is_empty());
        assert!(container.make("ServiceOne").is_ok());
    }

    #[test]
    fn test_producer_errors_propagate_unchanged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_wrap("Failing", Wrap::leaf(|_, _| Err(Error::build_failed("Failing", "boom"))));
        container.bind_wrap("After", counting_wrap(calls.clone()));
        container.bind_wrap("Outer", Wrap::new(["Failing", "After"], |_, _| Ok(object(()))));

        let err = container.make("Outer").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BuildFailed);
        assert!(err.message.contains("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(container.build_stack().is_empty());
    }

    #[test]
    fn test_separate_containers_have_separate_depth() {
        let inner = Shared::new(Container::with_config(Config::default().with_max_depth(1)));
        inner.bind_wrap("Leaf", Wrap::leaf(|_, _| Ok(object(1u8))));

        let outer = Container::with_config(Config::default().with_max_depth(1));
        let handle = inner.clone();
        outer.bind_wrap("Outer", Wrap::leaf(move |_, _| handle.make("Leaf")));

        assert!(outer.make("Outer").is_ok());
    }

    // -- fallback ----------------------------------------------------------

    #[test]
    fn test_fallback_supplies_unbound_identifiers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());
        container.set_fallback(StaticFallback {
            known: "Example/Greeting",
            calls: calls.clone(),
        });

        let greeting = container.make_as::<Greeting>("Example/Greeting").unwrap();
        assert_eq!(greeting.text, "from fallback with 1 dependencies");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(container.is_resolvable("Example/Greeting"));
        assert_eq!(kind_of(container.make("Example/Other")), ErrorKind::UnresolvedAbstract);
    }

    #[test]
    fn test_fallback_supplies_dangling_alias_targets() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());
        container.bind_alias("Greeter", "Example/Greeting");
        container.set_fallback(StaticFallback {
            known: "Example/Greeting",
            calls: calls.clone(),
        });

        assert!(container.is_resolvable("Greeter"));
        assert!(container.make_as::<Greeting>("Greeter").is_ok());
    }

    #[test]
    fn test_explicit_bindings_beat_the_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        container.bind_value("Example/Greeting", Greeting {
            text: String::from("explicit"),
        });
        container.set_fallback(StaticFallback {
            known: "Example/Greeting",
            calls: calls.clone(),
        });

        let greeting = container.make_as::<Greeting>("Example/Greeting").unwrap();
        assert_eq!(greeting.text, "explicit");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    // -- queries -----------------------------------------------------------

    #[test]
    fn test_is_resolvable() {
        let container = Container::new();
        container.bind_value("ServiceOne", ServiceOne);
        container.bind_factory("ServiceTwo", |_, _| Ok(object(ServiceTwo)));
        container.bind_constructor("ServiceThree", three_constructor());
        container.bind_wrap("ServiceOneClone", one_wrap());
        container.bind_alias("ServiceFour", "ServiceFake");

        assert!(container.is_resolvable("ServiceOne"));
        assert!(container.is_resolvable("ServiceTwo"));
        assert!(container.is_resolvable("ServiceThree"));
        assert!(container.is_resolvable("ServiceOneClone"));
        assert!(!container.is_resolvable("ServiceFour"));
        assert!(!container.is_resolvable("ServiceFive"));

        container.bind_wrap("ServiceFake", one_wrap());
        assert!(container.is_resolvable("ServiceFour"));
    }

    #[test]
    fn test_is_buildable() {
        let container = Container::new();
        container.bind_value("ServiceOne", ServiceOne);
        container.bind_factory("ServiceTwo", |_, _| Ok(object(ServiceTwo)));
        container.bind_constructor("ServiceThree", three_constructor());
        container.bind_wrap("ServiceOneClone", one_wrap());
        container.bind_alias("ServiceFour", "ServiceFake");

        assert!(container.is_buildable("ServiceTwo"));
        assert!(container.is_buildable("ServiceThree"));
        assert!(container.is_buildable("ServiceOneClone"));
        assert!(!container.is_buildable("ServiceOne"));
        assert!(!container.is_buildable("ServiceFour"));
        assert!(!container.is_buildable("ServiceFive"));
    }

    #[test]
    fn test_is_wrapped() {
        let container = Container::new();
        container.bind_wrap("ServiceOne", one_wrap());
        container.bind_factory("ServiceTwo", |_, _| Ok(object(ServiceTwo)));
        container.bind_constructor("ServiceThree", three_constructor());

        assert!(container.is_wrapped("ServiceOne"));
        assert!(!container.is_wrapped("ServiceTwo"));
        assert!(!container.is_wrapped("ServiceThree"));
    }

    // -- untyped bind ------------------------------------------------------

    #[test]
    fn test_bind_accepts_known_kinds() {
        let container = Container::new();
        container.bind("ServiceOne", one_wrap()).unwrap();
        container.bind("ServiceTwo", Constructor::new(|_, _| Ok(object(ServiceTwo)))).unwrap();
        container.bind("ServiceThree", Factory::new(|_, _| Ok(object(1u8)))).unwrap();
        container.bind("HelloService", String::from("ServiceOne")).unwrap();
        container.bind("HiService", "HelloService").unwrap();

        assert!(container.is_wrapped("ServiceOne"));
        assert!(container.is_buildable("ServiceTwo"));
        assert!(container.is_buildable("ServiceThree"));
        assert_eq!(container.resolve_concrete_id("HiService").unwrap(), "ServiceOne");
    }

    #[test]
    fn test_bind_rejects_unknown_kinds() {
        let container = Container::new();

        let err = container.bind("ServiceOne", 42u32).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedBindingKind);
        assert!(!container.has_binding("ServiceOne"));
    }

    // -- typed access ------------------------------------------------------

    #[test]
    fn test_make_as_reports_type_mismatch() {
        let container = Container::new();
        container.bind_value("ServiceOne", ServiceOne);

        let err = container.make_as::<ServiceTwo>("ServiceOne").err().unwrap();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_producers_may_bind_while_building() {
        let container = Container::new();
        container.bind_factory("Registrar", |c, _| {
            c.bind_value("Late", 7u32);
            Ok(object(()))
        });

        container.make("Registrar").unwrap();
        assert_eq!(*container.make_as::<u32>("Late").unwrap(), 7);
    }

    #[cfg(feature = "thread-safe")]
    #[test]
    fn test_shared_container_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let container = Arc::new(Container::new());
        container.bind_wrap_shared(
            "ServiceOne",
            Wrap::leaf(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(50));
                Ok(object(ServiceOne))
            }),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || container.make("ServiceOne").unwrap())
            })
            .collect();

        let made: Vec<Object> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(made.iter().all(|object| Shared::ptr_eq(object, &made[0])));
        assert!(container.has_instance("ServiceOne"));
    }

    #[cfg(feature = "thread-safe")]
    #[test]
    fn test_shared_cycle_across_threads_still_fails() {
        let container = Arc::new(Container::with_config(Config::default().with_max_depth(8)));
        container.bind_wrap_shared("Loop", Wrap::new(["Loop"], |_, _| Ok(object(()))));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || container.make("Loop").err().map(|err| err.kind))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(ErrorKind::MaxDepthExceeded));
        }
    }
}
