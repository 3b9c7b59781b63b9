//! Type-erased values flowing through bindings and the container

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::ContainerError;

/// A component instance while it is still exclusively owned by the activation
pub type Instance = dyn Any + Send + Sync;

/// Shared, type-erased value
///
/// Cloning is cheap. [`Value::downcast`] accepts either a stored `T` or a
/// stored `Arc<T>`, so a producer may return whatever the context resolved
/// without unwrapping it first.
#[derive(Clone)]
pub struct Value {
    inner: Arc<Instance>,
    type_name: &'static str,
}

impl Value {
    /// Wrap a value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Take ownership of a freshly activated instance
    pub(crate) fn from_instance(instance: Box<Instance>, type_name: &'static str) -> Self {
        Self {
            inner: Arc::from(instance),
            type_name,
        }
    }

    /// Type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the value holds a `T` (or an `Arc<T>`)
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>() || self.inner.is::<Arc<T>>()
    }

    /// Clone out the wrapped value as `T`
    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        if let Some(value) = self.inner.downcast_ref::<T>() {
            return Some(value.clone());
        }
        self.inner
            .downcast_ref::<Arc<T>>()
            .map(|shared| T::clone(shared))
    }

    /// Clone out the wrapped value, reporting a mismatch against `slot`
    pub fn cast<T: Any + Clone>(&self, slot: &str) -> Result<T, ContainerError> {
        self.downcast::<T>()
            .ok_or_else(|| ContainerError::type_mismatch(slot, type_name::<T>(), self.type_name))
    }

    /// Convert into a shared `Arc<T>` without cloning the underlying value
    pub fn into_arc<T: Any + Send + Sync>(self) -> Result<Arc<T>, ContainerError> {
        let actual = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(value) => Ok(value),
            Err(inner) => inner
                .downcast::<Arc<T>>()
                .map(|shared| Arc::clone(&*shared))
                .map_err(|_| ContainerError::type_mismatch("service", type_name::<T>(), actual)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_downcast_plain_value() {
        let value = Value::new("v1".to_string());
        assert!(value.is::<String>());
        assert_eq!(value.downcast::<String>(), Some("v1".to_string()));
        assert_eq!(value.downcast::<u32>(), None);
    }

    #[test]
    fn test_downcast_through_arc() {
        let value = Value::new(Arc::new(42_u32));
        assert!(value.is::<u32>());
        assert_eq!(value.downcast::<u32>(), Some(42));
    }

    #[test]
    fn test_cast_reports_mismatch() {
        let value = Value::new(7_i64);
        let err = value.cast::<String>("value1").unwrap_err();
        assert!(matches!(
            err,
            ContainerError::TypeMismatch { ref slot, actual: "i64", .. } if slot == "value1"
        ));
    }

    #[test]
    fn test_into_arc_unwraps_nested_arc() {
        let shared = Arc::new("shared".to_string());
        let value = Value::new(Arc::clone(&shared));
        let arc = value.into_arc::<String>().unwrap();
        assert!(Arc::ptr_eq(&arc, &shared));
    }
}
