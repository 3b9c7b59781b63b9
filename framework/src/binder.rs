//! Per-registration parameter and property binding
//!
//! Entry points for callers that assemble registrations from dynamic input,
//! where any argument may be absent. Arguments are checked in a fixed order
//! and the first absent or empty one is reported:
//!
//! 1. the registration
//! 2. the name (absent, then empty)
//! 3. the value accessor
//!
//! [`RegistrationBuilder::with_parameter`] and
//! [`RegistrationBuilder::with_property`] wrap these for the common case.

use crate::binding::{require_name, Binding, ValueAccessor};
use crate::container::RegistrationBuilder;
use crate::error::ContainerError;

/// Bind a constructor parameter of `registration` to a resolved value
///
/// The accessor is not invoked here; it runs once per activation in which a
/// constructor parameter named exactly `parameter_name` is being filled.
pub fn with_parameter<'r>(
    registration: Option<&'r mut RegistrationBuilder>,
    parameter_name: Option<&str>,
    value_accessor: Option<ValueAccessor>,
) -> Result<&'r mut RegistrationBuilder, ContainerError> {
    let (registration, name, value_accessor) =
        validate(registration, parameter_name, "parameter_name", value_accessor)?;
    registration.push_parameter(Binding::resolved_parameter_unchecked(name, value_accessor));
    Ok(registration)
}

/// Bind a property of `registration` to a resolved value
///
/// Matches the setter `set_<property_name>` of a public settable property.
pub fn with_property<'r>(
    registration: Option<&'r mut RegistrationBuilder>,
    property_name: Option<&str>,
    value_accessor: Option<ValueAccessor>,
) -> Result<&'r mut RegistrationBuilder, ContainerError> {
    let (registration, name, value_accessor) =
        validate(registration, property_name, "property_name", value_accessor)?;
    registration.push_property(Binding::resolved_property_unchecked(name, value_accessor));
    Ok(registration)
}

fn validate<'r, 'n>(
    registration: Option<&'r mut RegistrationBuilder>,
    name: Option<&'n str>,
    name_param: &'static str,
    value_accessor: Option<ValueAccessor>,
) -> Result<(&'r mut RegistrationBuilder, &'n str, ValueAccessor), ContainerError> {
    let registration = registration.ok_or_else(|| ContainerError::argument_null("registration"))?;
    let name = name.ok_or_else(|| ContainerError::argument_null(name_param))?;
    require_name(name, name_param)?;
    let value_accessor =
        value_accessor.ok_or_else(|| ContainerError::argument_null("value_accessor"))?;
    Ok((registration, name, value_accessor))
}
