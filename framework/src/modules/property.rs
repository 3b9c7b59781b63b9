use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use super::GlobalParameterModule;
use crate::binding::{accessor, require_name, ValueAccessor};
use crate::component::PropertyInfo;
use crate::container::registration::AttachmentKey;
use crate::container::{ComponentContext, ComponentRegistration, ComponentRegistry, Module};
use crate::error::ContainerError;
use crate::value::Value;

/// Value stored for a global property
#[derive(Clone)]
pub enum PropertyValue {
    /// Set as-is on every matching instance
    Constant(Value),
    /// Produced from the activation context each time
    Resolved(ValueAccessor),
}

impl PropertyValue {
    /// Value to assign during the activation running in `context`
    pub fn evaluate(&self, context: &ComponentContext<'_>) -> Result<Value, ContainerError> {
        match self {
            Self::Constant(value) => Ok(value.clone()),
            Self::Resolved(value_accessor) => value_accessor(context),
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Resolved(_) => f.write_str("Resolved(..)"),
        }
    }
}

/// Sets named properties on every activated instance that has them
///
/// Properties are keyed by name: adding a name again replaces its value,
/// whether constant or resolved. When a registration is attached, each
/// stored name is looked up once on its limit type; only public properties
/// with a public setter are kept, the rest are skipped without error. One
/// activated hook per registration then assigns the current value of every
/// kept property.
///
/// Also carries a [`GlobalParameterModule`] for constructor parameters.
///
/// # Example
///
/// ```rust,ignore
/// let globals = GlobalPropertyModule::new();
/// globals
///     .add_property("Value1", "global".to_string())?
///     .add_resolved_property("Clock", |c| c.resolve::<SystemClock>())?;
///
/// let mut builder = ContainerBuilder::new();
/// builder.register_module(globals.clone());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlobalPropertyModule {
    parameters: GlobalParameterModule,
    state: Arc<PropertyState>,
}

#[derive(Debug, Default)]
struct PropertyState {
    properties: RwLock<IndexMap<String, PropertyValue>>,
    key: AttachmentKey,
}

impl GlobalPropertyModule {
    /// Create an empty module
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property to a constant on every instance that has it
    pub fn add_property(
        &self,
        name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<&Self, ContainerError> {
        require_name(name, "name")?;
        self.upsert(name, PropertyValue::Constant(Value::new(value)));
        Ok(self)
    }

    /// Set a property to a value resolved at each activation
    pub fn add_resolved_property<T, F>(
        &self,
        name: &str,
        value_accessor: F,
    ) -> Result<&Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        require_name(name, "name")?;
        self.upsert(name, PropertyValue::Resolved(accessor(value_accessor)));
        Ok(self)
    }

    /// Add a constructor parameter with a constant value
    pub fn add_parameter(
        &self,
        name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<&Self, ContainerError> {
        self.parameters.add_parameter(name, value)?;
        Ok(self)
    }

    /// Add a constructor parameter resolved at activation
    pub fn add_resolved_parameter<T, F>(
        &self,
        name: &str,
        value_accessor: F,
    ) -> Result<&Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.parameters.add_resolved_parameter(name, value_accessor)?;
        Ok(self)
    }

    /// Constructor parameter half of the module
    pub fn parameters(&self) -> &GlobalParameterModule {
        &self.parameters
    }

    /// Current value stored for `name`
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.read().get(name).cloned()
    }

    /// Stored property names, in first-insertion order
    pub fn property_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, IndexMap<String, PropertyValue>> {
        self.state
            .properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn upsert(&self, name: &str, value: PropertyValue) {
        let replaced = self
            .state
            .properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value)
            .is_some();
        tracing::trace!(property = name, replaced, "global property added");
    }

    fn attach(&self, registration: &mut ComponentRegistration) {
        if !registration.mark_attached(self.state.key) {
            return;
        }

        let limit_type = registration.limit_type();
        let mut targets: Vec<(String, PropertyInfo)> = Vec::new();
        for name in self.property_names() {
            match limit_type.settable_property(&name) {
                Some(info) => targets.push((name, info.clone())),
                None => tracing::trace!(
                    component = limit_type.type_name(),
                    property = %name,
                    "no settable property, skipped"
                ),
            }
        }

        if targets.is_empty() {
            return;
        }

        tracing::debug!(
            component = limit_type.type_name(),
            registration = %registration.id(),
            properties = targets.len(),
            "global properties attached"
        );

        let module = self.clone();
        registration.on_activated(move |event| {
            for (name, info) in &targets {
                let Some(stored) = module.property(name) else {
                    continue;
                };
                let value = stored.evaluate(event.context())?;
                info.set(event.instance_mut(), &value)?;
            }
            Ok(())
        });
    }
}

impl Module for GlobalPropertyModule {
    fn attach_to_component_registration(
        &self,
        _registry: &ComponentRegistry,
        registration: &mut ComponentRegistration,
    ) {
        self.parameters.attach(registration);
        self.attach(registration);
    }
}
