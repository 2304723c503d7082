//! strataconf
//!
//! Prints the configuration a program would see after merging environment
//! variables, JSON files and command-line flags.

use anyhow::{Context, Result};
use clap::Parser;
use strataconf::cli::Cli;
use strataconf::config::{ConfigLoader, EnvSource};
use strataconf::logging;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log, cli.verbose)?;

    let env = if cli.no_env {
        EnvSource::default()
    } else {
        EnvSource::from_process()
    };
    debug!(vars = env.len(), files = cli.files.len(), "Starting load");

    let mut loader = ConfigLoader::new(cli.load_options())
        .files(cli.files.iter().cloned())
        .env(env)
        .argv(cli.argv());
    if let Some(base_dir) = &cli.base_dir {
        loader = loader.base_dir(base_dir);
    }

    let config = loader.load().await?;

    let output = match &cli.get {
        Some(path) => config
            .get(path)
            .map(|value| value.to_json())
            .with_context(|| format!("no value at '{path}'"))?,
        None => config.to_json(),
    };

    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");
    Ok(())
}
