mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecotoken_core::RelayConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecotoken-relay")]
#[command(about = "Prompt optimization relay for the EcoToken extension", long_about = None)]
struct Cli {
    /// Load environment variables from this file instead of `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay
    Serve {
        /// Listen port (defaults to PORT, then 3000)
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Mint one key-pair JWT and print it
    Token,
    /// Run one optimize request and print the response body
    Optimize {
        #[arg(short, long)]
        tag: String,
        /// Raw prompt text; takes precedence over --filter
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(short, long)]
        model: Option<String>,
    },
}

/// Loads `explicit`, or else a `.env` found from the working directory up.
/// Returns the path of the file that was loaded.
fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
        return Ok(Some(path.to_path_buf()));
    }
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("failed to load .env"),
    }
}

fn load_config(env_file: Option<&Path>) -> Result<RelayConfig> {
    let mut config = RelayConfig::from_env().context("invalid relay configuration")?;
    if let Some(dir) = env_file.and_then(Path::parent) {
        config.resolve_key_path(dir);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = load_env_file(cli.env_file.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &env_file {
        tracing::debug!(path = %path.display(), "loaded env file");
    }
    let config = load_config(env_file.as_deref())?;

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(&config, port, host).await?,
        Commands::Token => commands::token::run(&config)?,
        Commands::Optimize { tag, text, filter, model } => {
            commands::optimize::run(&config, tag, text, filter, model).await?;
        },
    }

    Ok(())
}
