//! Procedural macros for wirekit
//!
//! Provides `#[derive(Component)]`, which generates the type-introspection
//! descriptor and constructor the container needs to build a struct.

use proc_macro::TokenStream;

mod component;

/// Derive `wirekit::Component` for a struct with named fields
///
/// Field attributes:
/// - `#[param]` / `#[param(name = "..", optional)]`: constructor parameter,
///   named after the field unless `name` is given. Optional parameters fall
///   back to `Default::default()` when nothing supplies them.
/// - `#[property]` / `#[property(name = "..", readonly)]`: settable property,
///   named after the field in PascalCase unless `name` is given. The setter
///   is public when the field is `pub`.
///
/// Every other field starts as `Default::default()`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Component)]
/// pub struct Example {
///     #[param]
///     value1: String,
///     #[param(name = "value2")]
///     second: String,
///     #[property]
///     pub timeout_secs: u64,
/// }
/// ```
#[proc_macro_derive(Component, attributes(param, property))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component::derive_component_impl(input)
}
