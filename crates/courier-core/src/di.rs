//! Service registry.
//!
//! The dispatcher resolves contract implementations from a [`Container`] on
//! every request, and the client side registers generated proxies into the
//! same kind of container. Entries are keyed by the type they are resolved
//! as, which may be a trait object:
//!
//! ```rust
//! use courier_core::di::Container;
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.register::<dyn Greeter>(Arc::new(English));
//!
//! let greeter = container.resolve::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A service could not be resolved.
#[derive(Debug, Clone, Error)]
#[error("Failed to resolve {type_name}: {reason}")]
pub struct ResolveError {
    /// The type name that could not be resolved.
    pub type_name: &'static str,
    /// The reason for the failure.
    pub reason: String,
}

impl ResolveError {
    /// Creates an error for a type that was never registered.
    pub fn not_registered<T: ?Sized>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            reason: "service not registered".to_string(),
        }
    }
}

/// Produces a boxed `Arc<T>` per resolution.
type Factory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

enum Entry {
    Singleton(Box<dyn Any + Send + Sync>),
    Transient(Factory),
}

/// A registry of services keyed by the type they resolve as.
///
/// Values are stored as `Arc<T>`, so `T` may be unsized (`dyn Trait`).
#[derive(Default)]
pub struct Container {
    services: HashMap<TypeId, Entry>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers a shared instance, replacing any earlier registration.
    pub fn register<T>(&mut self, service: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services
            .insert(TypeId::of::<T>(), Entry::Singleton(Box::new(service)));
    }

    /// Registers a factory invoked on every resolution.
    pub fn register_factory<T, F>(&mut self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let factory: Factory =
            Arc::new(move || Box::new(factory()) as Box<dyn Any + Send + Sync>);
        self.services
            .insert(TypeId::of::<T>(), Entry::Transient(factory));
    }

    /// Resolves a service, or `None` if it was never registered.
    #[must_use]
    pub fn resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.services.get(&TypeId::of::<T>())? {
            Entry::Singleton(service) => service.downcast_ref::<Arc<T>>().cloned(),
            Entry::Transient(factory) => factory().downcast::<Arc<T>>().ok().map(|s| *s),
        }
    }

    /// Resolves a service or reports it as missing.
    pub fn resolve_required<T>(&self) -> Result<Arc<T>, ResolveError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>()
            .ok_or_else(ResolveError::not_registered::<T>)
    }

    /// Checks whether a type is registered.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.services.len())
            .finish()
    }
}
