//! Bindings: predicate and value producer pairs
//!
//! A [`Binding`] decides whether it can fill a [`Slot`] and, when it does,
//! produces the slot's value from the [`ComponentContext`]. Bindings are
//! immutable once built and are shared behind `Arc`.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::component::Slot;
use crate::container::ComponentContext;
use crate::error::ContainerError;
use crate::value::Value;

/// Decides whether a binding fills a slot
pub type SlotPredicate = Arc<dyn Fn(&Slot, &ComponentContext<'_>) -> bool + Send + Sync>;

/// Produces the value for a matched slot
pub type SlotValueFn =
    Arc<dyn Fn(&Slot, &ComponentContext<'_>) -> Result<Value, ContainerError> + Send + Sync>;

/// Produces a value from the resolution context
pub type ValueAccessor =
    Arc<dyn Fn(&ComponentContext<'_>) -> Result<Value, ContainerError> + Send + Sync>;

/// Lift a typed producer into a [`ValueAccessor`]
///
/// # Example
/// ```rust,ignore
/// let accessor = wirekit::accessor(|c| c.resolve_keyed::<String>("key_one"));
/// ```
pub fn accessor<T, F>(producer: F) -> ValueAccessor
where
    T: Any + Send + Sync,
    F: Fn(&ComponentContext<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
{
    Arc::new(move |context: &ComponentContext<'_>| producer(context).map(Value::new))
}

/// Immutable (predicate, value producer) pair
#[derive(Clone)]
pub struct Binding {
    label: Cow<'static, str>,
    predicate: SlotPredicate,
    value: SlotValueFn,
}

impl Binding {
    /// Binding with an arbitrary predicate
    pub fn new(
        label: impl Into<Cow<'static, str>>,
        predicate: SlotPredicate,
        value: SlotValueFn,
    ) -> Self {
        Self {
            label: label.into(),
            predicate,
            value,
        }
    }

    /// Constructor parameter with a constant value, matched by ordinal name
    pub fn named_parameter(
        name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<Self, ContainerError> {
        require_name(name, "name")?;
        Ok(Self::named_parameter_unchecked(name, Value::new(value)))
    }

    /// Constructor parameter with a resolved value, matched by ordinal name
    pub fn resolved_parameter(
        name: &str,
        value_accessor: ValueAccessor,
    ) -> Result<Self, ContainerError> {
        require_name(name, "name")?;
        Ok(Self::resolved_parameter_unchecked(name, value_accessor))
    }

    /// Property with a constant value, matched through its setter
    pub fn named_property(
        name: &str,
        value: impl Any + Send + Sync,
    ) -> Result<Self, ContainerError> {
        require_name(name, "name")?;
        Ok(Self::property_unchecked(name, constant(Value::new(value))))
    }

    /// Property with a resolved value, matched through its setter
    pub fn resolved_property(
        name: &str,
        value_accessor: ValueAccessor,
    ) -> Result<Self, ContainerError> {
        require_name(name, "name")?;
        Ok(Self::resolved_property_unchecked(name, value_accessor))
    }

    pub(crate) fn named_parameter_unchecked(name: &str, value: Value) -> Self {
        Self::parameter_unchecked(name, constant(value))
    }

    pub(crate) fn resolved_parameter_unchecked(name: &str, value_accessor: ValueAccessor) -> Self {
        Self::parameter_unchecked(name, resolved(value_accessor))
    }

    pub(crate) fn resolved_property_unchecked(name: &str, value_accessor: ValueAccessor) -> Self {
        Self::property_unchecked(name, resolved(value_accessor))
    }

    fn parameter_unchecked(name: &str, value: SlotValueFn) -> Self {
        let target = name.to_string();
        Self::new(
            format!("parameter '{}'", name),
            Arc::new(move |slot: &Slot, _: &ComponentContext<'_>| slot.name() == target),
            value,
        )
    }

    fn property_unchecked(name: &str, value: SlotValueFn) -> Self {
        let target = name.to_string();
        Self::new(
            format!("property '{}'", name),
            Arc::new(move |slot: &Slot, _: &ComponentContext<'_>| {
                slot.member().property_name() == Some(target.as_str())
            }),
            value,
        )
    }

    /// Short description used in diagnostics
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether this binding fills `slot`
    pub fn matches(&self, slot: &Slot, context: &ComponentContext<'_>) -> bool {
        (self.predicate)(slot, context)
    }

    /// Produce the value for `slot`
    pub fn value(&self, slot: &Slot, context: &ComponentContext<'_>) -> Result<Value, ContainerError> {
        (self.value)(slot, context)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("label", &self.label).finish()
    }
}

fn constant(value: Value) -> SlotValueFn {
    Arc::new(
        move |_: &Slot, _: &ComponentContext<'_>| -> Result<Value, ContainerError> {
            Ok(value.clone())
        },
    )
}

fn resolved(value_accessor: ValueAccessor) -> SlotValueFn {
    Arc::new(
        move |_: &Slot, context: &ComponentContext<'_>| -> Result<Value, ContainerError> {
            value_accessor(context)
        },
    )
}

pub(crate) fn require_name(name: &str, param: &'static str) -> Result<(), ContainerError> {
    if name.is_empty() {
        return Err(ContainerError::argument_empty(param));
    }
    Ok(())
}

/// Distinct union of two binding lists, preserving first-seen order
///
/// Identity is the `Arc` allocation, so the same binding appended twice
/// appears once.
pub(crate) fn union(first: &[Arc<Binding>], second: &[Arc<Binding>]) -> Vec<Arc<Binding>> {
    let mut merged: Vec<Arc<Binding>> = Vec::with_capacity(first.len() + second.len());
    for binding in first.iter().chain(second) {
        if !merged.iter().any(|seen| Arc::ptr_eq(seen, binding)) {
            merged.push(Arc::clone(binding));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Member;
    use crate::container::ContainerBuilder;
    use pretty_assertions::assert_eq;

    fn parameter_slot(name: &str) -> Slot {
        Slot::new(name, Member::ConstructorParameter { position: 0 })
    }

    fn setter_slot(property: &str) -> Slot {
        Slot::new(
            "value",
            Member::PropertySetter {
                method: format!("set_{}", property),
            },
        )
    }

    #[test]
    fn test_parameter_binding_matches_exact_name_only() {
        let container = ContainerBuilder::new().build();
        let context = container.context();
        let binding = Binding::named_parameter("value1", 1_u32).unwrap();

        assert!(binding.matches(&parameter_slot("value1"), &context));
        assert!(!binding.matches(&parameter_slot("Value1"), &context));
        assert!(!binding.matches(&parameter_slot("value10"), &context));
        assert!(!binding.matches(&parameter_slot(""), &context));
    }

    #[test]
    fn test_constant_parameter_returns_stored_value() {
        let container = ContainerBuilder::new().build();
        let context = container.context();
        let binding = Binding::named_parameter("answer", 42_u32).unwrap();

        let value = binding.value(&parameter_slot("answer"), &context).unwrap();
        assert_eq!(value.downcast::<u32>(), Some(42));
    }

    #[test]
    fn test_resolved_parameter_invokes_accessor_with_context() {
        let mut builder = ContainerBuilder::new();
        builder.register_instance("resolved".to_string()).keyed("key");
        let container = builder.build();
        let context = container.context();

        let binding = Binding::resolved_parameter(
            "value1",
            accessor(|c| c.resolve_keyed::<String>("key")),
        )
        .unwrap();

        let value = binding.value(&parameter_slot("value1"), &context).unwrap();
        assert_eq!(value.downcast::<String>(), Some("resolved".to_string()));
    }

    #[test]
    fn test_property_binding_matches_setter_members_only() {
        let container = ContainerBuilder::new().build();
        let context = container.context();
        let binding = Binding::named_property("Value1", "x").unwrap();

        assert!(binding.matches(&setter_slot("Value1"), &context));
        assert!(!binding.matches(&setter_slot("value1"), &context));
        assert!(!binding.matches(&parameter_slot("Value1"), &context));
        assert!(!binding.matches(
            &Slot::new(
                "value",
                Member::Method {
                    name: "set_Value1".to_string()
                }
            ),
            &context
        ));
        assert!(!binding.matches(
            &Slot::new(
                "value",
                Member::PropertySetter {
                    method: "Value1".to_string()
                }
            ),
            &context
        ));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Binding::named_parameter("", 1_u8).unwrap_err();
        assert!(err.is_invalid_argument("name"));

        let err = Binding::resolved_property("", accessor(|_| Ok(1_u8))).unwrap_err();
        assert!(err.is_invalid_argument("name"));
    }

    #[test]
    fn test_union_is_distinct_and_ordered() {
        let a = Arc::new(Binding::named_parameter("a", 1_u8).unwrap());
        let b = Arc::new(Binding::named_parameter("b", 2_u8).unwrap());
        let c = Arc::new(Binding::named_parameter("c", 3_u8).unwrap());

        let merged = union(
            &[Arc::clone(&a), Arc::clone(&b)],
            &[Arc::clone(&b), Arc::clone(&c), Arc::clone(&a)],
        );
        let labels: Vec<_> = merged.iter().map(|binding| binding.label()).collect();
        assert_eq!(labels, vec!["parameter 'a'", "parameter 'b'", "parameter 'c'"]);
    }
}
