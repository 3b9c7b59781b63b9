//! Lazily resolved constructor parameter and property bindings for a
//! dependency injection container.
//!
//! A [`Binding`] decides whether a constructor parameter or property setter
//! slot matches a name and produces the slot's value from the
//! [`ComponentContext`] at activation time. Bindings are attached either to a
//! single registration ([`binder`], [`RegistrationBuilder::with_parameter`]) or
//! to every registration in a container through a global [`Module`]
//! ([`GlobalParameterModule`], [`GlobalPropertyModule`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use wirekit::{Component, ContainerBuilder};
//!
//! #[derive(Component)]
//! struct Example {
//!     #[param]
//!     value1: String,
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register_instance("v1".to_string()).keyed("key_one");
//! builder
//!     .register_type::<Example>()
//!     .with_parameter("value1", |c| c.resolve_keyed::<String>("key_one"))?;
//!
//! let container = builder.build();
//! assert_eq!(container.resolve::<Example>()?.value1, "v1");
//! ```

extern crate self as wirekit;

pub mod binder;
pub mod binding;
pub mod component;
pub mod config;
pub mod container;
pub mod error;
pub mod modules;
pub mod value;

pub use binding::{accessor, Binding, SlotPredicate, SlotValueFn, ValueAccessor};
pub use component::{
    Component, ConstructorArguments, LimitType, Member, ParameterInfo, PropertyInfo,
    PropertySetter, Slot, Visibility,
};
pub use config::ContainerConfig;
pub use container::{
    ActivatedEvent, ComponentContext, ComponentRegistration, ComponentRegistry, Container,
    ContainerBuilder, Lifetime, Module, PreparingEvent, RegistrationBuilder, RegistrationId,
    Service,
};
pub use error::ContainerError;
pub use modules::{GlobalParameterModule, GlobalPropertyModule, PropertyValue};
pub use value::{Instance, Value};

/// Derive the type-introspection capability for a struct.
///
/// See [`Component`] for the generated contract.
pub use wirekit_macros::Component;
