//! Container wiring for the demo
//!
//! Registers two keyed strings, a component bound through constructor
//! parameters, one bound through properties, and global modules that reach
//! every registration.

use wirekit::{
    Component, Container, ContainerBuilder, ContainerConfig, ContainerError,
    GlobalParameterModule, GlobalPropertyModule,
};

use crate::config::AppConfig;

/// Bound through constructor parameters
#[derive(Debug, Component)]
pub struct ByParameter {
    #[param]
    pub value1: String,
    #[param]
    pub value2: String,
    #[property]
    pub greeting: String,
}

/// Bound through properties
#[derive(Debug, Component)]
pub struct ByProperty {
    #[property]
    pub value1: String,
    #[property]
    pub value2: String,
    #[param(optional)]
    pub region: String,
}

/// Has none of the globally bound members
#[derive(Debug, Component)]
pub struct Bystander;

/// Build the demo container
pub fn build(config: &AppConfig, container_config: ContainerConfig) -> Result<Container, ContainerError> {
    let properties = GlobalPropertyModule::new();
    properties.add_property("Greeting", config.greeting.clone())?;

    let parameters = GlobalParameterModule::new();
    parameters.add_parameter("region", "eu-west-1".to_string())?;

    let mut builder = ContainerBuilder::new();
    builder
        .with_config(container_config)
        .register_module(properties)
        .register_module(parameters);

    builder
        .register_instance(config.value_one.clone())
        .keyed("key_one");
    builder
        .register_instance(config.value_two.clone())
        .keyed("key_two");

    builder
        .register_type::<ByParameter>()
        .with_parameter("value1", |c| c.resolve_keyed::<String>("key_one"))?
        .with_parameter("value2", |c| c.resolve_keyed::<String>("key_two"))?
        .single_instance();

    builder
        .register_type::<ByProperty>()
        .with_property("Value1", |c| c.resolve_keyed::<String>("key_one"))?
        .with_property("Value2", |c| c.resolve_keyed::<String>("key_two"))?;

    builder.register_type::<Bystander>();

    Ok(builder.build())
}
