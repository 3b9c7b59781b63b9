//! Configuration for wirekit containers
//!
//! - `.env` loading with the real environment taking precedence
//! - Typed [`ContainerConfig`] built from environment variables or a builder
//!
//! # Example
//!
//! ```rust,no_run
//! use wirekit::config::{load_dotenv, ContainerConfig};
//!
//! load_dotenv(std::path::Path::new("."));
//! let config = ContainerConfig::from_env();
//! println!("max resolve depth: {}", config.max_resolve_depth);
//! ```

pub mod container;
pub mod env;

pub use container::{ContainerConfig, ContainerConfigBuilder};
pub use env::{env, env_optional, load_dotenv};
