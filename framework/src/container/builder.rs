//! Container and registration builders

use std::any::Any;
use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex};

use crate::binder;
use crate::binding::{accessor, require_name, Binding};
use crate::component::{Component, ConstructorArguments, LimitType};
use crate::config::ContainerConfig;
use crate::container::module::Module;
use crate::container::registration::{
    ActivatedEvent, ActivatedHandler, Activator, ComponentRegistration, ConstructFn, DelegateFn,
    Lifetime, PreparingEvent, PreparingHandler,
};
use crate::container::registry::{ComponentRegistry, Service};
use crate::container::{ComponentContext, Container};
use crate::error::ContainerError;
use crate::value::{Instance, Value};

/// Collects registrations and modules, then builds a [`Container`]
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = ContainerBuilder::new();
/// builder.register_module(globals.clone());
/// builder.register_type::<Mailer>().single_instance();
/// let container = builder.build();
/// ```
pub struct ContainerBuilder {
    registrations: Vec<RegistrationBuilder>,
    modules: Vec<Box<dyn Module>>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    /// Create an empty builder with configuration from the environment
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            modules: Vec::new(),
            config: ContainerConfig::default(),
        }
    }

    /// Replace the container configuration
    pub fn with_config(&mut self, config: ContainerConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Register a [`Component`] built through its constructor
    pub fn register_type<T: Component>(&mut self) -> &mut RegistrationBuilder {
        let construct: ConstructFn = Arc::new(
            |args: &ConstructorArguments<'_>| -> Result<Box<Instance>, ContainerError> {
                T::construct(args).map(|component| Box::new(component) as Box<Instance>)
            },
        );
        self.push(Activator::Reflection {
            limit_type: T::limit_type(),
            construct,
        })
    }

    /// Register a ready-made instance
    ///
    /// Provided instances are activated once and shared.
    pub fn register_instance<T: Any + Send + Sync>(&mut self, instance: T) -> &mut RegistrationBuilder {
        let registration = self.push(Activator::Provided {
            limit_type: LimitType::opaque::<T>(),
            instance: Mutex::new(Some(Box::new(instance))),
        });
        registration.single_instance()
    }

    /// Register a factory closure
    ///
    /// # Example
    /// ```rust,ignore
    /// builder.register_factory(|c| Ok(Mailer::new(c.resolve::<Smtp>()?)));
    /// ```
    pub fn register_factory<T, F>(&mut self, factory: F) -> &mut RegistrationBuilder
    where
        T: Any + Send + Sync,
        F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let factory: DelegateFn = Arc::new(
            move |context: &ComponentContext<'_>| -> Result<Box<Instance>, ContainerError> {
                factory(context).map(|instance| Box::new(instance) as Box<Instance>)
            },
        );
        self.push(Activator::Delegate {
            limit_type: LimitType::opaque::<T>(),
            factory,
        })
    }

    /// Register a module
    ///
    /// Modules load and attach in registration order when the container is built.
    pub fn register_module<M: Module>(&mut self, module: M) -> &mut Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Number of registrations declared so far
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Check if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn push(&mut self, activator: Activator) -> &mut RegistrationBuilder {
        self.registrations.push(RegistrationBuilder::new(activator));
        let index = self.registrations.len() - 1;
        &mut self.registrations[index]
    }

    /// Build the container
    ///
    /// Every module's [`Module::load`] runs first (modules registered while
    /// loading are loaded too), then each module is attached to each
    /// registration exactly once.
    pub fn build(mut self) -> Container {
        let mut modules: Vec<Box<dyn Module>> = Vec::new();
        loop {
            let pending = mem::take(&mut self.modules);
            if pending.is_empty() {
                break;
            }
            for module in pending {
                module.load(&mut self);
                modules.push(module);
            }
        }

        let mut registrations: Vec<ComponentRegistration> = self
            .registrations
            .into_iter()
            .map(RegistrationBuilder::into_registration)
            .collect();
        let registry = ComponentRegistry::index(&registrations);

        for registration in &mut registrations {
            for module in &modules {
                module.attach_to_component_registration(&registry, registration);
            }
        }

        tracing::debug!(
            registrations = registrations.len(),
            modules = modules.len(),
            "container built"
        );

        Container::new(registry, registrations, self.config)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent configuration of one registration
pub struct RegistrationBuilder {
    activator: Activator,
    services: Vec<Service>,
    lifetime: Lifetime,
    parameters: Vec<Arc<Binding>>,
    properties: Vec<Arc<Binding>>,
    preparing: Vec<PreparingHandler>,
    activated: Vec<ActivatedHandler>,
}

impl RegistrationBuilder {
    fn new(activator: Activator) -> Self {
        Self {
            activator,
            services: Vec::new(),
            lifetime: Lifetime::default(),
            parameters: Vec::new(),
            properties: Vec::new(),
            preparing: Vec::new(),
            activated: Vec::new(),
        }
    }

    /// Concrete type being registered
    pub fn limit_type(&self) -> &LimitType {
        self.activator.limit_type()
    }

    /// Expose the component under its own type
    ///
    /// Implied when no service is declared.
    pub fn as_self(&mut self) -> &mut Self {
        let service = Service::for_limit_type(self.limit_type(), None);
        self.services.push(service);
        self
    }

    /// Expose the component under its own type qualified by `key`
    pub fn keyed(&mut self, key: impl Into<String>) -> &mut Self {
        let service = Service::for_limit_type(self.limit_type(), Some(key.into()));
        self.services.push(service);
        self
    }

    /// Share one instance across all resolutions
    pub fn single_instance(&mut self) -> &mut Self {
        self.lifetime = Lifetime::SingleInstance;
        self
    }

    /// Create a new instance for every resolution
    pub fn instance_per_dependency(&mut self) -> &mut Self {
        self.lifetime = Lifetime::InstancePerDependency;
        self
    }

    /// Bind a constructor parameter to a value resolved at activation
    ///
    /// # Example
    /// ```rust,ignore
    /// builder
    ///     .register_type::<Example>()
    ///     .with_parameter("value1", |c| c.resolve_keyed::<String>("key_one"))?
    ///     .with_parameter("value2", |c| c.resolve_keyed::<String>("key_two"))?;
    /// ```
    pub fn with_parameter<T, F>(
        &mut self,
        parameter_name: &str,
        value_accessor: F,
    ) -> Result<&mut Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        binder::with_parameter(
            Some(self),
            Some(parameter_name),
            Some(accessor(value_accessor)),
        )
    }

    /// Bind a property to a value resolved at activation
    pub fn with_property<T, F>(
        &mut self,
        property_name: &str,
        value_accessor: F,
    ) -> Result<&mut Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        binder::with_property(
            Some(self),
            Some(property_name),
            Some(accessor(value_accessor)),
        )
    }

    /// Bind a constructor parameter to a constant
    pub fn with_named_parameter(
        &mut self,
        parameter_name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<&mut Self, ContainerError> {
        require_name(parameter_name, "parameter_name")?;
        self.push_parameter(Binding::named_parameter_unchecked(
            parameter_name,
            Value::new(value),
        ));
        Ok(self)
    }

    /// Bind a property to a constant
    pub fn with_property_value(
        &mut self,
        property_name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<&mut Self, ContainerError> {
        require_name(property_name, "property_name")?;
        self.push_property(Binding::named_property(property_name, value)?);
        Ok(self)
    }

    /// Append a prebuilt constructor parameter binding
    pub fn with_binding(&mut self, binding: Binding) -> &mut Self {
        self.push_parameter(binding);
        self
    }

    /// Append a prebuilt property binding
    pub fn with_property_binding(&mut self, binding: Binding) -> &mut Self {
        self.push_property(binding);
        self
    }

    /// Append a hook to the preparing event
    pub fn on_preparing<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut PreparingEvent<'_>) + Send + Sync + 'static,
    {
        self.preparing.push(Arc::new(handler));
        self
    }

    /// Append a hook to the activated event
    pub fn on_activated<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ActivatedEvent<'_>) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        self.activated.push(Arc::new(handler));
        self
    }

    /// Configured constructor parameter bindings
    pub fn parameters(&self) -> &[Arc<Binding>] {
        &self.parameters
    }

    /// Configured property bindings
    pub fn properties(&self) -> &[Arc<Binding>] {
        &self.properties
    }

    pub(crate) fn push_parameter(&mut self, binding: Binding) {
        self.parameters.push(Arc::new(binding));
    }

    pub(crate) fn push_property(&mut self, binding: Binding) {
        self.properties.push(Arc::new(binding));
    }

    fn into_registration(mut self) -> ComponentRegistration {
        if self.services.is_empty() {
            self.as_self();
        }
        ComponentRegistration::new(
            self.activator,
            self.services,
            self.lifetime,
            self.parameters,
            self.properties,
            self.preparing,
            self.activated,
        )
    }
}

impl fmt::Debug for RegistrationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationBuilder")
            .field("limit_type", &self.limit_type().type_name())
            .field("services", &self.services)
            .field("lifetime", &self.lifetime)
            .field("parameters", &self.parameters)
            .field("properties", &self.properties)
            .field("preparing_hooks", &self.preparing.len())
            .field("activated_hooks", &self.activated.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::PropertyInfo;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default)]
    struct Greeter {
        greeting: String,
        name: String,
        suffix: String,
    }

    impl Component for Greeter {
        fn limit_type() -> LimitType {
            LimitType::of::<Self>()
                .parameter("greeting")
                .optional_parameter("name")
                .property(PropertyInfo::public::<Self, String, _>("Suffix", |g, v| {
                    g.suffix = v
                }))
        }

        fn construct(args: &ConstructorArguments<'_>) -> Result<Self, ContainerError> {
            Ok(Self {
                greeting: args.get("greeting")?,
                name: args.get_optional("name")?.unwrap_or_default(),
                suffix: String::new(),
            })
        }
    }

    #[test]
    fn test_named_parameter_supplies_constructor() {
        let mut builder = ContainerBuilder::new();
        builder
            .register_type::<Greeter>()
            .with_named_parameter("greeting", "hello".to_string())
            .unwrap();
        let container = builder.build();

        let greeter = container.resolve::<Greeter>().unwrap();
        assert_eq!(greeter.greeting, "hello");
        assert_eq!(greeter.name, "");
    }

    #[test]
    fn test_missing_required_parameter_is_reported() {
        let mut builder = ContainerBuilder::new();
        builder.register_type::<Greeter>();
        let container = builder.build();

        let err = container.resolve::<Greeter>().unwrap_err();
        assert!(matches!(
            err,
            ContainerError::UnresolvedParameter { ref parameter, .. } if parameter == "greeting"
        ));
    }

    #[test]
    fn test_unmatched_parameter_autowires_by_type() {
        let mut builder = ContainerBuilder::new();
        builder.register_instance("autowired".to_string());
        builder.register_type::<Greeter>();
        let container = builder.build();

        let greeter = container.resolve::<Greeter>().unwrap();
        assert_eq!(greeter.greeting, "autowired");
        assert_eq!(greeter.name, "autowired");
    }

    #[test]
    fn test_resolve_time_parameters_precede_configured_ones() {
        let mut builder = ContainerBuilder::new();
        builder
            .register_type::<Greeter>()
            .with_named_parameter("greeting", "configured".to_string())
            .unwrap();
        let container = builder.build();

        let greeter = container
            .resolve_with_parameters::<Greeter>(vec![Binding::named_parameter(
                "greeting",
                "per call".to_string(),
            )
            .unwrap()])
            .unwrap();
        assert_eq!(greeter.greeting, "per call");
    }

    #[test]
    fn test_property_value_is_injected_after_construction() {
        let mut builder = ContainerBuilder::new();
        builder
            .register_type::<Greeter>()
            .with_named_parameter("greeting", "hi".to_string())
            .unwrap()
            .with_property_value("Suffix", "!".to_string())
            .unwrap();
        let container = builder.build();

        assert_eq!(container.resolve::<Greeter>().unwrap().suffix, "!");
    }

    #[test]
    fn test_single_instance_is_shared() {
        let mut builder = ContainerBuilder::new();
        builder
            .register_type::<Greeter>()
            .with_named_parameter("greeting", "hi".to_string())
            .unwrap()
            .single_instance();
        let container = builder.build();

        let first = container.resolve::<Greeter>().unwrap();
        let second = container.resolve::<Greeter>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_instance_per_dependency_activates_each_time() {
        let activations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&activations);

        let mut builder = ContainerBuilder::new();
        builder
            .register_factory(|_| Ok(Greeter::default()))
            .on_activated(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let container = builder.build();

        container.resolve::<Greeter>().unwrap();
        container.resolve::<Greeter>().unwrap();
        assert_eq!(activations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_provided_instance_cannot_be_activated_twice() {
        let mut builder = ContainerBuilder::new();
        builder.register_instance(5_u32).instance_per_dependency();
        let container = builder.build();

        assert_eq!(*container.resolve::<u32>().unwrap(), 5);
        let err = container.resolve::<u32>().unwrap_err();
        assert!(matches!(err, ContainerError::InstanceAlreadyActivated { .. }));
    }

    #[test]
    fn test_unregistered_service_is_not_found() {
        let container = ContainerBuilder::new().build();

        assert!(matches!(
            container.resolve::<Greeter>(),
            Err(ContainerError::ServiceNotFound { .. })
        ));
        assert!(container.resolve_optional::<Greeter>().unwrap().is_none());
    }

    #[test]
    fn test_depth_guard_stops_runaway_recursion() {
        let mut builder = ContainerBuilder::new();
        builder.with_config(ContainerConfig::builder().max_resolve_depth(8).build());
        builder.register_factory(|c| c.resolve::<Greeter>().map(|g| Greeter::clone(&g)));
        let container = builder.build();

        let err = container.resolve::<Greeter>().unwrap_err();
        assert!(matches!(
            err,
            ContainerError::ResolutionDepthExceeded { max_depth: 8, .. }
        ));
    }

    #[test]
    fn test_self_resolving_single_instance_hits_depth_guard() {
        let mut builder = ContainerBuilder::new();
        builder.with_config(ContainerConfig::builder().max_resolve_depth(8).build());
        builder
            .register_factory(|c| c.resolve::<Greeter>().map(|g| Greeter::clone(&g)))
            .single_instance();
        let container = builder.build();

        let err = container.resolve::<Greeter>().unwrap_err();
        assert!(matches!(
            err,
            ContainerError::ResolutionDepthExceeded { max_depth: 8, .. }
        ));
    }

    #[test]
    fn test_registration_builder_debug_lists_configuration() {
        let mut builder = ContainerBuilder::new();
        let registration = builder
            .register_type::<Greeter>()
            .with_named_parameter("greeting", "hi".to_string())
            .unwrap()
            .keyed("main")
            .on_activated(|_| Ok(()));

        let debug = format!("{:?}", registration);
        assert!(debug.starts_with("RegistrationBuilder"));
        assert!(debug.contains("Greeter"));
        assert!(debug.contains("parameter 'greeting'"));
        assert!(debug.contains("activated_hooks: 1"));
    }

    struct Seeding;

    impl Module for Seeding {
        fn load(&self, builder: &mut ContainerBuilder) {
            builder.register_instance(11_u64);
        }
    }

    struct CountingModule(Arc<AtomicUsize>);

    impl Module for CountingModule {
        fn attach_to_component_registration(
            &self,
            _registry: &ComponentRegistry,
            _registration: &mut ComponentRegistration,
        ) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_modules_attach_to_registrations_added_by_load() {
        let attached = Arc::new(AtomicUsize::new(0));

        let mut builder = ContainerBuilder::new();
        builder.register_instance(1_u8);
        builder.register_module(CountingModule(Arc::clone(&attached)));
        builder.register_module(Seeding);
        let container = builder.build();

        assert_eq!(attached.load(Ordering::SeqCst), 2);
        assert_eq!(*container.resolve::<u64>().unwrap(), 11);
    }
}
