use crate::config::env::env;

/// Default limit on nested resolutions
pub const DEFAULT_MAX_RESOLVE_DEPTH: usize = 64;

/// Container configuration
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Maximum nesting of resolutions within one top-level resolve
    pub max_resolve_depth: usize,
}

impl ContainerConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            max_resolve_depth: env("CONTAINER_MAX_RESOLVE_DEPTH", DEFAULT_MAX_RESOLVE_DEPTH),
        }
    }

    /// Create a builder for customizing config
    pub fn builder() -> ContainerConfigBuilder {
        ContainerConfigBuilder::default()
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Builder for ContainerConfig
#[derive(Default)]
pub struct ContainerConfigBuilder {
    max_resolve_depth: Option<usize>,
}

impl ContainerConfigBuilder {
    /// Set the maximum resolution depth
    pub fn max_resolve_depth(mut self, depth: usize) -> Self {
        self.max_resolve_depth = Some(depth);
        self
    }

    /// Build the ContainerConfig
    pub fn build(self) -> ContainerConfig {
        let default = ContainerConfig::from_env();
        ContainerConfig {
            max_resolve_depth: self.max_resolve_depth.unwrap_or(default.max_resolve_depth),
        }
    }
}
