use wirekit::config::env;

/// Demo configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Greeting set on every component with a `Greeting` property
    pub greeting: String,
    /// Value registered under `key_one`
    pub value_one: String,
    /// Value registered under `key_two`
    pub value_two: String,
}

impl AppConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            greeting: env("APP_GREETING", "Hello".to_string()),
            value_one: env("APP_VALUE_ONE", "example_value_one".to_string()),
            value_two: env("APP_VALUE_TWO", "example_value_two".to_string()),
        }
    }
}
