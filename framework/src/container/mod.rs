//! Minimal dependency injection container
//!
//! Just enough container for bindings to act on:
//! - Registrations built from [`Component`](crate::Component) types, provided
//!   instances or factory closures
//! - Typed and keyed services, last registration wins
//! - Single-instance or per-dependency lifetimes
//! - Per-registration `preparing` and `activated` hooks
//! - [`Module`]s attached to every registration when the container is built
//!
//! # Example
//!
//! ```rust,ignore
//! use wirekit::ContainerBuilder;
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register_instance("example_value_one".to_string()).keyed("key_one");
//! builder
//!     .register_type::<Example>()
//!     .with_parameter("value1", |c| c.resolve_keyed::<String>("key_one"))?
//!     .single_instance();
//!
//! let container = builder.build();
//! let example = container.resolve::<Example>()?;
//! ```

pub mod builder;
pub mod module;
pub mod registration;
pub mod registry;

pub use builder::{ContainerBuilder, RegistrationBuilder};
pub use module::Module;
pub use registration::{
    ActivatedEvent, ActivatedHandler, ComponentRegistration, Lifetime, PreparingEvent,
    PreparingHandler, RegistrationId,
};
pub use registry::{ComponentRegistry, Service};

use std::any::Any;
use std::sync::Arc;

use crate::binding::Binding;
use crate::config::ContainerConfig;
use crate::error::ContainerError;
use crate::value::Value;

/// A built container
///
/// Immutable after [`ContainerBuilder::build`]; share it across threads
/// behind an `Arc`.
pub struct Container {
    registry: ComponentRegistry,
    registrations: Vec<ComponentRegistration>,
    config: ContainerConfig,
}

impl Container {
    pub(crate) fn new(
        registry: ComponentRegistry,
        registrations: Vec<ComponentRegistration>,
        config: ContainerConfig,
    ) -> Self {
        Self {
            registry,
            registrations,
            config,
        }
    }

    /// Root resolution context
    pub fn context(&self) -> ComponentContext<'_> {
        ComponentContext {
            container: self,
            depth: 0,
        }
    }

    /// Resolve the default registration for `T`
    ///
    /// # Example
    /// ```rust,ignore
    /// let example: Arc<Example> = container.resolve::<Example>()?;
    /// ```
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ContainerError> {
        self.context().resolve::<T>()
    }

    /// Resolve `T` registered under `key`
    pub fn resolve_keyed<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.context().resolve_keyed::<T>(key)
    }

    /// Resolve `T`, `None` when it is not registered
    pub fn resolve_optional<T: Any + Send + Sync>(
        &self,
    ) -> Result<Option<Arc<T>>, ContainerError> {
        self.context().resolve_optional::<T>()
    }

    /// Resolve `T` with extra bindings supplied for this resolution only
    ///
    /// The bindings become the initial parameter list of the preparing event.
    pub fn resolve_with_parameters<T: Any + Send + Sync>(
        &self,
        parameters: Vec<Binding>,
    ) -> Result<Arc<T>, ContainerError> {
        self.context().resolve_with_parameters::<T>(parameters)
    }

    /// Check if `T` is registered
    pub fn is_registered<T: Any>(&self) -> bool {
        self.registry.is_registered(&Service::typed::<T>())
    }

    /// Check if `T` is registered under `key`
    pub fn is_registered_keyed<T: Any>(&self, key: &str) -> bool {
        self.registry.is_registered(&Service::keyed::<T>(key))
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registrations(&self) -> &[ComponentRegistration] {
        &self.registrations
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }
}

/// The set of services reachable from the running activation
///
/// Handed to every value producer and hook. Only valid for the duration of
/// the call it is passed to.
#[derive(Clone, Copy)]
pub struct ComponentContext<'a> {
    container: &'a Container,
    depth: usize,
}

impl<'a> ComponentContext<'a> {
    /// Resolve the default registration for `T`
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ContainerError> {
        self.resolve_service(&Service::typed::<T>(), &[])?
            .into_arc::<T>()
    }

    /// Resolve `T` registered under `key`
    pub fn resolve_keyed<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.resolve_service(&Service::keyed::<T>(key), &[])?
            .into_arc::<T>()
    }

    /// Resolve `T`, `None` when it is not registered
    pub fn resolve_optional<T: Any + Send + Sync>(
        &self,
    ) -> Result<Option<Arc<T>>, ContainerError> {
        let service = Service::typed::<T>();
        if !self.container.registry.is_registered(&service) {
            return Ok(None);
        }
        self.resolve_service(&service, &[])?.into_arc::<T>().map(Some)
    }

    /// Resolve `T` with extra bindings supplied for this resolution only
    pub fn resolve_with_parameters<T: Any + Send + Sync>(
        &self,
        parameters: Vec<Binding>,
    ) -> Result<Arc<T>, ContainerError> {
        let parameters: Vec<Arc<Binding>> = parameters.into_iter().map(Arc::new).collect();
        self.resolve_service(&Service::typed::<T>(), &parameters)?
            .into_arc::<T>()
    }

    /// Resolve any service as an untyped value
    pub fn resolve_service(
        &self,
        service: &Service,
        parameters: &[Arc<Binding>],
    ) -> Result<Value, ContainerError> {
        let index = self
            .container
            .registry
            .default_for(service)
            .ok_or_else(|| ContainerError::service_not_found(service.to_string()))?;

        let max_depth = self.container.config.max_resolve_depth;
        if self.depth >= max_depth {
            return Err(ContainerError::ResolutionDepthExceeded {
                service: service.to_string(),
                max_depth,
            });
        }

        let nested = ComponentContext {
            container: self.container,
            depth: self.depth + 1,
        };
        self.container.registrations[index].resolve(nested, parameters)
    }

    /// Check if `T` is registered
    pub fn is_registered<T: Any>(&self) -> bool {
        self.container.is_registered::<T>()
    }

    /// Check if `T` is registered under `key`
    pub fn is_registered_keyed<T: Any>(&self, key: &str) -> bool {
        self.container.is_registered_keyed::<T>(key)
    }

    /// Number of resolutions enclosing this context
    pub fn depth(&self) -> usize {
        self.depth
    }
}
