use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};

use crate::binding::{accessor, Binding};
use crate::container::registration::AttachmentKey;
use crate::container::{ComponentContext, ComponentRegistration, ComponentRegistry, Module};
use crate::error::ContainerError;

/// Adds constructor parameter bindings to every registration
///
/// Each activation's parameter list becomes the distinct union of the list it
/// already carries and this module's bindings, so bindings supplied at resolve
/// time or by modules attached earlier take precedence. Bindings added after
/// the container is built apply to every later activation.
///
/// # Example
///
/// ```rust,ignore
/// let globals = GlobalParameterModule::new();
/// globals
///     .add_parameter("region", "eu-west-1".to_string())?
///     .add_resolved_parameter("clock", |c| c.resolve::<SystemClock>())?;
///
/// let mut builder = ContainerBuilder::new();
/// builder.register_module(globals.clone());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlobalParameterModule {
    state: Arc<ParameterState>,
}

#[derive(Debug, Default)]
struct ParameterState {
    bindings: RwLock<Vec<Arc<Binding>>>,
    key: AttachmentKey,
}

impl GlobalParameterModule {
    /// Create an empty module
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with a constant value
    pub fn add_parameter(
        &self,
        name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<&Self, ContainerError> {
        self.push(Binding::named_parameter(name, value)?);
        Ok(self)
    }

    /// Add a parameter whose value is resolved at activation
    pub fn add_resolved_parameter<T, F>(
        &self,
        name: &str,
        value_accessor: F,
    ) -> Result<&Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.push(Binding::resolved_parameter(name, accessor(value_accessor))?);
        Ok(self)
    }

    /// Add a prebuilt binding
    pub fn add_binding(&self, binding: Binding) -> &Self {
        self.push(binding);
        self
    }

    /// Snapshot of the stored bindings, in insertion order
    pub fn parameters(&self) -> Vec<Arc<Binding>> {
        self.state
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.state
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, binding: Binding) {
        tracing::trace!(binding = binding.label(), "global parameter added");
        self.state
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(binding));
    }

    /// Subscribe the preparing hook, at most once per registration
    pub(crate) fn attach(&self, registration: &mut ComponentRegistration) {
        if !registration.mark_attached(self.state.key) {
            return;
        }

        tracing::debug!(
            component = registration.limit_type().type_name(),
            registration = %registration.id(),
            "global parameters attached"
        );

        let module = self.clone();
        registration.on_preparing(move |event| {
            let parameters = module.parameters();
            if !parameters.is_empty() {
                event.union_parameters(&parameters);
            }
        });
    }
}

impl Module for GlobalParameterModule {
    fn attach_to_component_registration(
        &self,
        _registry: &ComponentRegistry,
        registration: &mut ComponentRegistration,
    ) {
        self.attach(registration);
    }
}
