//! Container extension point
//!
//! A [`Module`] packages configuration that applies to a whole container:
//! it may register components of its own in [`Module::load`], and it is
//! offered every registration of the built container exactly once through
//! [`Module::attach_to_component_registration`].
//!
//! # Example
//!
//! ```rust,ignore
//! use wirekit::{ComponentRegistration, ComponentRegistry, Module};
//!
//! struct LogActivations;
//!
//! impl Module for LogActivations {
//!     fn attach_to_component_registration(
//!         &self,
//!         _registry: &ComponentRegistry,
//!         registration: &mut ComponentRegistration,
//!     ) {
//!         let name = registration.limit_type().type_name();
//!         registration.on_activated(move |_| {
//!             tracing::info!(component = name, "activated");
//!             Ok(())
//!         });
//!     }
//! }
//! ```

use crate::container::builder::ContainerBuilder;
use crate::container::registration::ComponentRegistration;
use crate::container::registry::ComponentRegistry;

/// A unit of container-wide configuration
pub trait Module: Send + Sync + 'static {
    /// Register components owned by this module
    ///
    /// Runs during [`ContainerBuilder::build`], before any module attaches.
    fn load(&self, builder: &mut ContainerBuilder) {
        let _ = builder;
    }

    /// Subscribe hooks on one registration
    ///
    /// Called once per registration of the built container, including the
    /// registrations added by [`Module::load`]. Handlers may only be
    /// appended; existing entries are never removed or reordered.
    fn attach_to_component_registration(
        &self,
        registry: &ComponentRegistry,
        registration: &mut ComponentRegistration,
    ) {
        let _ = (registry, registration);
    }
}
