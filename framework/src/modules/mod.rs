//! Modules that apply bindings to every registration of a container
//!
//! - [`GlobalParameterModule`] merges its constructor parameter bindings into
//!   every activation's preparing event
//! - [`GlobalPropertyModule`] does the same and also sets named properties on
//!   every activated instance whose type has them
//!
//! Both are cheap-to-clone handles: register one clone with the
//! [`ContainerBuilder`](crate::ContainerBuilder) and keep another to add more
//! bindings later. Names that match nothing on a given type are ignored.
//!
//! A module subscribes at most one hook per registration. The record of
//! which module attached is kept on the registration, so reusing one handle
//! across many containers leaves nothing behind in the module.

mod parameter;
mod property;

pub use parameter::GlobalParameterModule;
pub use property::{GlobalPropertyModule, PropertyValue};
