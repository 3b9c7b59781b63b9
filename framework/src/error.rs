//! Container-wide error types
//!
//! Argument validation failures surface synchronously at configuration time as
//! [`ContainerError::InvalidArgument`]. Everything else is raised while a
//! component is being activated.

use thiserror::Error;

/// Container-wide error type
///
/// # Example
///
/// ```rust,ignore
/// use wirekit::{ContainerBuilder, ContainerError};
///
/// let mut builder = ContainerBuilder::new();
/// let result = builder.register_type::<Example>().with_parameter("", |c| c.resolve::<Db>());
/// assert!(matches!(result, Err(ContainerError::InvalidArgument { param: "parameter_name", .. })));
/// ```
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// A configuration call received a missing or empty argument
    #[error("{message} (parameter '{param}')")]
    InvalidArgument {
        /// Name of the offending argument
        param: &'static str,
        /// Human readable description
        message: String,
    },

    /// No registration provides the requested service
    #[error("Service '{service}' not registered in container")]
    ServiceNotFound {
        /// Display form of the requested service
        service: String,
    },

    /// A required constructor parameter matched no binding and could not be autowired
    #[error("Cannot resolve parameter '{parameter}' of the constructor of '{component}'")]
    UnresolvedParameter {
        /// Type name of the component under construction
        component: &'static str,
        /// Constructor parameter name
        parameter: String,
    },

    /// A value could not be converted to the type the slot expects
    #[error("Value for '{slot}' is a '{actual}', expected '{expected}'")]
    TypeMismatch {
        /// Slot (parameter or property) being filled
        slot: String,
        /// Type the slot expects
        expected: &'static str,
        /// Type actually supplied
        actual: &'static str,
    },

    /// A provided instance was asked to activate a second time
    #[error("Provided instance of '{component}' has already been activated")]
    InstanceAlreadyActivated {
        /// Type name of the provided instance
        component: &'static str,
    },

    /// Nested resolution went deeper than the configured limit
    #[error("Resolution of '{service}' exceeded the maximum depth of {max_depth}")]
    ResolutionDepthExceeded {
        /// Display form of the service being resolved at the limit
        service: String,
        /// Configured maximum depth
        max_depth: usize,
    },

    /// Activation failed for a reason reported by user code
    #[error("Activation of '{component}' failed: {message}")]
    Activation {
        /// Type name of the component being activated
        component: &'static str,
        /// The error message
        message: String,
    },
}

impl ContainerError {
    /// Create an InvalidArgument error for a missing argument
    pub fn argument_null(param: &'static str) -> Self {
        Self::InvalidArgument {
            param,
            message: format!("{} should not be null.", param),
        }
    }

    /// Create an InvalidArgument error for an empty string argument
    pub fn argument_empty(param: &'static str) -> Self {
        Self::InvalidArgument {
            param,
            message: format!("{} should not be an empty string.", param),
        }
    }

    /// Create a ServiceNotFound error for a service display name
    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
        }
    }

    /// Create an UnresolvedParameter error
    pub fn unresolved_parameter(component: &'static str, parameter: impl Into<String>) -> Self {
        Self::UnresolvedParameter {
            component,
            parameter: parameter.into(),
        }
    }

    /// Create a TypeMismatch error
    pub fn type_mismatch(
        slot: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            slot: slot.into(),
            expected,
            actual,
        }
    }

    /// Create an Activation error
    pub fn activation(component: &'static str, message: impl Into<String>) -> Self {
        Self::Activation {
            component,
            message: message.into(),
        }
    }

    /// Check whether this is an InvalidArgument error for the given argument
    pub fn is_invalid_argument(&self, name: &str) -> bool {
        matches!(self, Self::InvalidArgument { param, .. } if *param == name)
    }
}
