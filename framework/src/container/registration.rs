//! Component registrations and their activation pipeline
//!
//! Activating a registration runs, in order:
//! 1. every `preparing` hook, which may replace the event's parameter list
//! 2. the activator; constructor arguments come from the prepared list, then
//!    the registration's configured parameters, then autowiring
//! 3. configured property bindings for public settable properties
//! 4. every `activated` hook, with exclusive access to the new instance

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

use crate::binding::{self, Binding};
use crate::component::{ConstructorArguments, LimitType, Slot};
use crate::container::registry::Service;
use crate::container::ComponentContext;
use crate::error::ContainerError;
use crate::value::{Instance, Value};

static NEXT_REGISTRATION_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_ATTACHMENT_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl RegistrationId {
    pub(crate) fn next() -> Self {
        Self(NEXT_REGISTRATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a module handle, shared by its clones
///
/// Recorded on each registration the module subscribes hooks on, so the
/// record is dropped together with the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct AttachmentKey(u64);

impl Default for AttachmentKey {
    fn default() -> Self {
        Self(NEXT_ATTACHMENT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// How long an activated instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// A new instance for every resolution
    #[default]
    InstancePerDependency,
    /// One instance shared by every resolution
    SingleInstance,
}

/// Hook run before an instance is constructed
pub type PreparingHandler = Arc<dyn Fn(&mut PreparingEvent<'_>) + Send + Sync>;

/// Hook run after an instance is constructed
pub type ActivatedHandler =
    Arc<dyn Fn(&mut ActivatedEvent<'_>) -> Result<(), ContainerError> + Send + Sync>;

pub(crate) type DelegateFn =
    Arc<dyn Fn(&ComponentContext<'_>) -> Result<Box<Instance>, ContainerError> + Send + Sync>;

pub(crate) type ConstructFn =
    Arc<dyn Fn(&ConstructorArguments<'_>) -> Result<Box<Instance>, ContainerError> + Send + Sync>;

/// How a registration produces instances
pub(crate) enum Activator {
    /// A value handed over at registration time, activated once
    Provided {
        limit_type: LimitType,
        instance: Mutex<Option<Box<Instance>>>,
    },
    /// A factory closure
    Delegate {
        limit_type: LimitType,
        factory: DelegateFn,
    },
    /// A [`Component`](crate::Component) constructor
    Reflection {
        limit_type: LimitType,
        construct: ConstructFn,
    },
}

impl Activator {
    pub(crate) fn limit_type(&self) -> &LimitType {
        match self {
            Self::Provided { limit_type, .. }
            | Self::Delegate { limit_type, .. }
            | Self::Reflection { limit_type, .. } => limit_type,
        }
    }
}

/// Event raised before construction
///
/// The parameter list starts as the bindings passed to the resolve call and
/// is consulted before the registration's own configured parameters.
pub struct PreparingEvent<'a> {
    context: ComponentContext<'a>,
    limit_type: &'a LimitType,
    parameters: Vec<Arc<Binding>>,
}

impl<'a> PreparingEvent<'a> {
    pub fn context(&self) -> &ComponentContext<'a> {
        &self.context
    }

    pub fn limit_type(&self) -> &LimitType {
        self.limit_type
    }

    /// Current parameter list
    pub fn parameters(&self) -> &[Arc<Binding>] {
        &self.parameters
    }

    /// Replace the parameter list
    pub fn set_parameters(&mut self, parameters: Vec<Arc<Binding>>) {
        self.parameters = parameters;
    }

    /// Replace the parameter list with its distinct union with `extra`
    pub fn union_parameters(&mut self, extra: &[Arc<Binding>]) {
        self.parameters = binding::union(&self.parameters, extra);
    }
}

/// Event raised after construction, before the instance is shared
pub struct ActivatedEvent<'a> {
    context: ComponentContext<'a>,
    limit_type: &'a LimitType,
    instance: &'a mut Instance,
}

impl<'a> ActivatedEvent<'a> {
    pub fn context(&self) -> &ComponentContext<'a> {
        &self.context
    }

    pub fn limit_type(&self) -> &LimitType {
        self.limit_type
    }

    pub fn instance(&self) -> &Instance {
        &*self.instance
    }

    pub fn instance_mut(&mut self) -> &mut Instance {
        &mut *self.instance
    }
}

/// A container's record of how to build one component
pub struct ComponentRegistration {
    id: RegistrationId,
    activator: Activator,
    services: Vec<Service>,
    lifetime: Lifetime,
    parameters: Vec<Arc<Binding>>,
    properties: Vec<Arc<Binding>>,
    preparing: Vec<PreparingHandler>,
    activated: Vec<ActivatedHandler>,
    shared: OnceLock<Value>,
    first_activation: Mutex<()>,
    activating: Mutex<Option<ThreadId>>,
    attached_modules: HashSet<AttachmentKey>,
}

impl ComponentRegistration {
    pub(crate) fn new(
        activator: Activator,
        services: Vec<Service>,
        lifetime: Lifetime,
        parameters: Vec<Arc<Binding>>,
        properties: Vec<Arc<Binding>>,
        preparing: Vec<PreparingHandler>,
        activated: Vec<ActivatedHandler>,
    ) -> Self {
        Self {
            id: RegistrationId::next(),
            activator,
            services,
            lifetime,
            parameters,
            properties,
            preparing,
            activated,
            shared: OnceLock::new(),
            first_activation: Mutex::new(()),
            activating: Mutex::new(None),
            attached_modules: HashSet::new(),
        }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Concrete type this registration builds
    pub fn limit_type(&self) -> &LimitType {
        self.activator.limit_type()
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Configured constructor parameter bindings
    pub fn parameters(&self) -> &[Arc<Binding>] {
        &self.parameters
    }

    /// Configured property bindings
    pub fn properties(&self) -> &[Arc<Binding>] {
        &self.properties
    }

    /// Append a hook to the preparing event
    pub fn on_preparing<F>(&mut self, handler: F)
    where
        F: Fn(&mut PreparingEvent<'_>) + Send + Sync + 'static,
    {
        self.preparing.push(Arc::new(handler));
    }

    /// Append a hook to the activated event
    pub fn on_activated<F>(&mut self, handler: F)
    where
        F: Fn(&mut ActivatedEvent<'_>) -> Result<(), ContainerError> + Send + Sync + 'static,
    {
        self.activated.push(Arc::new(handler));
    }

    /// Record that the module identified by `key` attached here, returning
    /// false when it already had
    pub(crate) fn mark_attached(&mut self, key: AttachmentKey) -> bool {
        self.attached_modules.insert(key)
    }

    /// Number of preparing hooks
    pub fn preparing_hooks(&self) -> usize {
        self.preparing.len()
    }

    /// Number of activated hooks
    pub fn activated_hooks(&self) -> usize {
        self.activated.len()
    }

    pub(crate) fn resolve(
        &self,
        context: ComponentContext<'_>,
        parameters: &[Arc<Binding>],
    ) -> Result<Value, ContainerError> {
        match self.lifetime {
            Lifetime::InstancePerDependency => self.activate(context, parameters),
            Lifetime::SingleInstance => {
                if let Some(shared) = self.shared.get() {
                    return Ok(shared.clone());
                }

                // A thread that re-enters its own first activation recurses
                // until the depth guard stops it instead of deadlocking.
                let current = thread::current().id();
                if *self.activating_thread() == Some(current) {
                    return self.activate(context, parameters);
                }

                let _guard = self
                    .first_activation
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if let Some(shared) = self.shared.get() {
                    return Ok(shared.clone());
                }

                *self.activating_thread() = Some(current);
                let activated = self.activate(context, parameters);
                *self.activating_thread() = None;
                let value = activated?;
                Ok(self.shared.get_or_init(|| value).clone())
            }
        }
    }

    fn activating_thread(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.activating.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn activate(
        &self,
        context: ComponentContext<'_>,
        parameters: &[Arc<Binding>],
    ) -> Result<Value, ContainerError> {
        let limit_type = self.limit_type();
        tracing::debug!(
            component = limit_type.type_name(),
            registration = %self.id,
            "activating component"
        );

        let mut preparing = PreparingEvent {
            context,
            limit_type,
            parameters: parameters.to_vec(),
        };
        for handler in &self.preparing {
            handler(&mut preparing);
        }
        let prepared = preparing.parameters;

        let mut instance = match &self.activator {
            Activator::Provided { instance, .. } => instance
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .ok_or(ContainerError::InstanceAlreadyActivated {
                    component: limit_type.type_name(),
                })?,
            Activator::Delegate { factory, .. } => factory(&context)?,
            Activator::Reflection { construct, .. } => {
                let bindings = [prepared.as_slice(), self.parameters.as_slice()].concat();
                construct(&ConstructorArguments::new(context, limit_type, &bindings))?
            }
        };

        self.inject_properties(&context, &mut *instance)?;

        {
            let mut event = ActivatedEvent {
                context,
                limit_type,
                instance: &mut *instance,
            };
            for handler in &self.activated {
                handler(&mut event)?;
            }
        }

        Ok(Value::from_instance(instance, limit_type.type_name()))
    }

    fn inject_properties(
        &self,
        context: &ComponentContext<'_>,
        instance: &mut Instance,
    ) -> Result<(), ContainerError> {
        if self.properties.is_empty() {
            return Ok(());
        }

        for property in self
            .limit_type()
            .properties()
            .iter()
            .filter(|p| p.is_publicly_settable())
        {
            let slot = Slot::property(property);
            if let Some(binding) = self
                .properties
                .iter()
                .find(|binding| binding.matches(&slot, context))
            {
                tracing::trace!(
                    component = self.limit_type().type_name(),
                    property = property.name,
                    binding = binding.label(),
                    "property bound"
                );
                let value = binding.value(&slot, context)?;
                property.set(instance, &value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("id", &self.id)
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
