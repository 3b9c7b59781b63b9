mod bootstrap;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wirekit::config::load_dotenv;
use wirekit::{ContainerConfig, ContainerError};

use crate::bootstrap::{ByParameter, ByProperty, Bystander};
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "app")]
#[command(about = "Resolve components wired through parameter and property bindings", long_about = None)]
struct Cli {
    /// Directory holding the .env files
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Maximum nested resolution depth (default: CONTAINER_MAX_RESOLVE_DEPTH or 64)
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    for path in load_dotenv(&cli.root) {
        tracing::info!(path = %path.display(), "loaded env file");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "resolution failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ContainerError> {
    let config = AppConfig::from_env();
    let mut container_config = ContainerConfig::builder();
    if let Some(depth) = cli.max_depth {
        container_config = container_config.max_resolve_depth(depth);
    }

    let container = bootstrap::build(&config, container_config.build())?;
    tracing::info!(
        registrations = container.registry().len(),
        "container ready"
    );

    let by_parameter = container.resolve::<ByParameter>()?;
    println!(
        "{} | parameters: value1={} value2={}",
        by_parameter.greeting, by_parameter.value1, by_parameter.value2
    );

    let by_property = container.resolve::<ByProperty>()?;
    println!(
        "properties: value1={} value2={} region={}",
        by_property.value1, by_property.value2, by_property.region
    );

    container.resolve::<Bystander>()?;
    println!("bystander resolved without global members");

    Ok(())
}
