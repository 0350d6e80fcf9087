mod commands;

use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use anyhow::{bail, Context, Result};
use buymeapie_core::{
    config::{self, AppConfig},
    Account,
};
use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };
    if !config.has_credentials() {
        bail!(
            "no credentials configured; set username/password in {} or BUYMEAPIE_USERNAME/BUYMEAPIE_PASSWORD",
            config::default_config_path().display()
        );
    }

    tracing::info!("connecting to {} as {}", config.base_url, config.username);
    let mut account = Account::connect(&config)
        .with_context(|| format!("failed to connect to {}", config.base_url))?;

    let command = format!("{:?}", cli.command);
    commands::run(&mut account, cli.command).inspect_err(|err| {
        tracing::error!("command {command} failed: {err:#}");
    })
}

fn init_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("buymeapie");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("bmap.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
