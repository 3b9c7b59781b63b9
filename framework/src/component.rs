//! Type-introspection capability for components
//!
//! The container never inspects a type directly. Instead each constructible
//! type describes itself through a [`LimitType`]: its constructor parameters
//! in declaration order and its properties with their setters. Bindings are
//! matched against [`Slot`]s built from these descriptors, which keeps the
//! matching logic testable with hand-written descriptors.
//!
//! Most types derive the capability:
//!
//! ```rust,ignore
//! use wirekit::Component;
//!
//! #[derive(Component)]
//! pub struct Mailer {
//!     #[param]
//!     host: String,
//!     #[param(optional)]
//!     port: u16,
//!     #[property(name = "Sender")]
//!     pub sender: String,
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::binding::Binding;
use crate::container::ComponentContext;
use crate::error::ContainerError;
use crate::value::{Instance, Value};

/// Prefix of property setter method names
pub const SETTER_PREFIX: &str = "set_";

/// The member a slot belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// A parameter of the component's constructor
    ConstructorParameter {
        /// Zero-based position in the constructor
        position: usize,
    },
    /// The value parameter of a property setter method (`set_<Property>`)
    PropertySetter {
        /// Setter method name
        method: String,
    },
    /// A parameter of an ordinary method
    Method {
        /// Method name
        name: String,
    },
}

impl Member {
    /// Property name derived from a setter member, if this is one
    pub fn property_name(&self) -> Option<&str> {
        match self {
            Self::PropertySetter { method } => method.strip_prefix(SETTER_PREFIX),
            _ => None,
        }
    }
}

/// A named slot a binding may fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    name: String,
    member: Member,
}

impl Slot {
    /// Create a slot from its parts
    pub fn new(name: impl Into<String>, member: Member) -> Self {
        Self {
            name: name.into(),
            member,
        }
    }

    /// Slot of a constructor parameter
    pub fn parameter(info: &ParameterInfo) -> Self {
        Self::new(
            info.name,
            Member::ConstructorParameter {
                position: info.position,
            },
        )
    }

    /// Slot of a property setter; its own parameter is named `value`
    pub fn property(info: &PropertyInfo) -> Self {
        Self::new(
            "value",
            Member::PropertySetter {
                method: format!("{}{}", SETTER_PREFIX, info.name),
            },
        )
    }

    /// Declared name of the slot
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member the slot belongs to
    pub fn member(&self) -> &Member {
        &self.member
    }
}

/// Constructor parameter descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Declared name
    pub name: &'static str,
    /// Zero-based position
    pub position: usize,
    /// Whether construction may proceed without a value
    pub optional: bool,
}

/// Visibility of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// Type-erased property setter
pub type PropertySetter =
    Arc<dyn Fn(&mut Instance, &Value) -> Result<(), ContainerError> + Send + Sync>;

/// Property descriptor
#[derive(Clone)]
pub struct PropertyInfo {
    /// Property name
    pub name: &'static str,
    /// Visibility of the setter
    pub visibility: Visibility,
    setter: Option<PropertySetter>,
}

impl PropertyInfo {
    /// Public property with a public setter
    pub fn public<T, V, F>(name: &'static str, set: F) -> Self
    where
        T: Any,
        V: Any + Clone,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_setter::<T, V, F>(name, Visibility::Public, set)
    }

    /// Property whose setter is not reachable from outside the type
    pub fn private<T, V, F>(name: &'static str, set: F) -> Self
    where
        T: Any,
        V: Any + Clone,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_setter::<T, V, F>(name, Visibility::Private, set)
    }

    /// Public property without a setter
    pub fn read_only(name: &'static str) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            setter: None,
        }
    }

    fn with_setter<T, V, F>(name: &'static str, visibility: Visibility, set: F) -> Self
    where
        T: Any,
        V: Any + Clone,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: PropertySetter = Arc::new(move |instance: &mut Instance, value: &Value| {
            let target = instance.downcast_mut::<T>().ok_or_else(|| {
                ContainerError::type_mismatch(name, type_name::<T>(), "component instance")
            })?;
            set(target, value.cast::<V>(name)?);
            Ok(())
        });

        Self {
            name,
            visibility,
            setter: Some(setter),
        }
    }

    /// Whether the property has a setter at all
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    /// Public instance property with a public setter
    pub fn is_publicly_settable(&self) -> bool {
        self.visibility == Visibility::Public && self.setter.is_some()
    }

    /// Setter handle, if any
    pub fn setter(&self) -> Option<&PropertySetter> {
        self.setter.as_ref()
    }

    /// Set the property on an instance
    pub fn set(&self, instance: &mut Instance, value: &Value) -> Result<(), ContainerError> {
        match &self.setter {
            Some(setter) => setter(instance, value),
            None => Err(ContainerError::activation(
                self.name,
                "property has no setter",
            )),
        }
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("has_setter", &self.has_setter())
            .finish()
    }
}

/// Descriptor of the concrete type a registration builds
#[derive(Debug, Clone)]
pub struct LimitType {
    type_id: TypeId,
    type_name: &'static str,
    parameters: Vec<ParameterInfo>,
    properties: Vec<PropertyInfo>,
}

impl LimitType {
    /// Descriptor with no parameters or properties yet
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            parameters: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Descriptor for a type that exposes no members
    pub fn opaque<T: Any>() -> Self {
        Self::of::<T>()
    }

    /// Append a required constructor parameter
    pub fn parameter(self, name: &'static str) -> Self {
        self.push_parameter(name, false)
    }

    /// Append an optional constructor parameter
    pub fn optional_parameter(self, name: &'static str) -> Self {
        self.push_parameter(name, true)
    }

    fn push_parameter(mut self, name: &'static str, optional: bool) -> Self {
        let position = self.parameters.len();
        self.parameters.push(ParameterInfo {
            name,
            position,
            optional,
        });
        self
    }

    /// Append a property
    pub fn property(mut self, info: PropertyInfo) -> Self {
        self.properties.push(info);
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    /// Find a constructor parameter by exact name
    pub fn find_parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Find a public instance property with a public setter by exact name
    pub fn settable_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties
            .iter()
            .find(|p| p.name == name && p.is_publicly_settable())
    }
}

/// A type the container can construct
///
/// Usually derived with `#[derive(Component)]`; hand-written implementations
/// are equally valid.
pub trait Component: Any + Send + Sync + Sized {
    /// Describe constructor parameters and properties
    fn limit_type() -> LimitType;

    /// Build an instance, pulling each constructor argument from `args`
    fn construct(args: &ConstructorArguments<'_>) -> Result<Self, ContainerError>;
}

/// Constructor arguments available while a component is being built
///
/// Each lookup walks the prioritised binding list in order and uses the first
/// binding whose predicate matches the parameter slot. Parameters no binding
/// matches are autowired by type from the context.
pub struct ConstructorArguments<'a> {
    context: ComponentContext<'a>,
    limit_type: &'a LimitType,
    bindings: &'a [Arc<Binding>],
}

impl<'a> ConstructorArguments<'a> {
    pub(crate) fn new(
        context: ComponentContext<'a>,
        limit_type: &'a LimitType,
        bindings: &'a [Arc<Binding>],
    ) -> Self {
        Self {
            context,
            limit_type,
            bindings,
        }
    }

    /// Context of the running activation
    pub fn context(&self) -> &ComponentContext<'a> {
        &self.context
    }

    /// Value for a required constructor parameter
    pub fn get<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T, ContainerError> {
        self.get_optional::<T>(name)?.ok_or_else(|| {
            ContainerError::unresolved_parameter(self.limit_type.type_name(), name)
        })
    }

    /// Value for a constructor parameter, `None` when nothing supplies one
    pub fn get_optional<T: Any + Send + Sync + Clone>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ContainerError> {
        let info = self.limit_type.find_parameter(name).ok_or_else(|| {
            ContainerError::unresolved_parameter(self.limit_type.type_name(), name)
        })?;
        let slot = Slot::parameter(info);

        if let Some(binding) = self
            .bindings
            .iter()
            .find(|binding| binding.matches(&slot, &self.context))
        {
            tracing::trace!(
                component = self.limit_type.type_name(),
                parameter = name,
                binding = binding.label(),
                "constructor parameter bound"
            );
            return binding.value(&slot, &self.context)?.cast::<T>(name).map(Some);
        }

        Ok(self
            .context
            .resolve_optional::<T>()?
            .map(|shared| T::clone(&shared)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Widget {
        label: String,
        secret: String,
    }

    fn widget_type() -> LimitType {
        LimitType::of::<Widget>()
            .parameter("label")
            .optional_parameter("size")
            .property(PropertyInfo::public::<Widget, String, _>("Label", |w, v| w.label = v))
            .property(PropertyInfo::private::<Widget, String, _>("Secret", |w, v| {
                w.secret = v
            }))
            .property(PropertyInfo::read_only("Id"))
    }

    #[test]
    fn test_parameters_keep_declaration_order() {
        let limit = widget_type();
        let names: Vec<_> = limit.parameters().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["label", "size"]);
        assert_eq!(limit.find_parameter("size").map(|p| p.position), Some(1));
        assert!(limit.find_parameter("Label").is_none());
    }

    #[test]
    fn test_settable_property_requires_public_setter() {
        let limit = widget_type();
        assert!(limit.settable_property("Label").is_some());
        assert!(limit.settable_property("Secret").is_none());
        assert!(limit.settable_property("Id").is_none());
        assert!(limit.settable_property("label").is_none());
        assert!(limit.settable_property("Missing").is_none());
    }

    #[test]
    fn test_property_slot_uses_setter_member() {
        let limit = widget_type();
        let slot = Slot::property(limit.settable_property("Label").unwrap());
        assert_eq!(slot.name(), "value");
        assert_eq!(slot.member().property_name(), Some("Label"));
    }

    #[test]
    fn test_parameter_slot_is_not_a_setter() {
        let slot = Slot::parameter(&ParameterInfo {
            name: "label",
            position: 0,
            optional: false,
        });
        assert_eq!(slot.member().property_name(), None);
        assert_eq!(
            Member::Method {
                name: "set_Label".to_string()
            }
            .property_name(),
            None
        );
    }

    #[test]
    fn test_setter_writes_through_erased_instance() {
        let limit = widget_type();
        let mut instance: Box<Instance> = Box::new(Widget::default());

        limit
            .settable_property("Label")
            .unwrap()
            .set(&mut *instance, &Value::new("hello".to_string()))
            .unwrap();

        let widget = instance.downcast_ref::<Widget>().unwrap();
        assert_eq!(widget.label, "hello");
    }

    #[test]
    fn test_setter_rejects_wrong_value_type() {
        let limit = widget_type();
        let mut instance: Box<Instance> = Box::new(Widget::default());

        let err = limit
            .settable_property("Label")
            .unwrap()
            .set(&mut *instance, &Value::new(5_u8))
            .unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_read_only_property_cannot_be_set() {
        let info = PropertyInfo::read_only("Id");
        let mut instance: Box<Instance> = Box::new(Widget::default());
        assert!(info.set(&mut *instance, &Value::new(1_u32)).is_err());
    }
}
