//! Service keys and the service → registration index

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::component::LimitType;
use crate::container::registration::{ComponentRegistration, RegistrationId};

/// A resolvable service: a type, optionally qualified by a key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Service {
    type_id: TypeId,
    type_name: &'static str,
    key: Option<String>,
}

impl Service {
    /// Unkeyed service for `T`
    pub fn typed<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            key: None,
        }
    }

    /// Service for `T` registered under `key`
    pub fn keyed<T: Any>(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::typed::<T>()
        }
    }

    pub(crate) fn for_limit_type(limit_type: &LimitType, key: Option<String>) -> Self {
        Self {
            type_id: limit_type.type_id(),
            type_name: limit_type.type_name(),
            key,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} ({})", self.type_name, key),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Index of which registrations provide which services
///
/// Handed to modules while they attach to registrations.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    services: HashMap<Service, Vec<usize>>,
    ids: Vec<RegistrationId>,
}

impl ComponentRegistry {
    pub(crate) fn index(registrations: &[ComponentRegistration]) -> Self {
        let mut services: HashMap<Service, Vec<usize>> = HashMap::new();
        for (index, registration) in registrations.iter().enumerate() {
            for service in registration.services() {
                services.entry(service.clone()).or_default().push(index);
            }
        }

        Self {
            services,
            ids: registrations.iter().map(|r| r.id()).collect(),
        }
    }

    /// Check if any registration provides `service`
    pub fn is_registered(&self, service: &Service) -> bool {
        self.services.contains_key(service)
    }

    /// Registrations providing `service`, in registration order
    pub fn registrations_for(&self, service: &Service) -> Vec<RegistrationId> {
        self.services
            .get(service)
            .map(|indices| indices.iter().map(|&index| self.ids[index]).collect())
            .unwrap_or_default()
    }

    /// Index of the registration that wins for `service` (the last one)
    pub(crate) fn default_for(&self, service: &Service) -> Option<usize> {
        self.services.get(service)?.last().copied()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if there are no registrations
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
