//! ferrircd - Main binary

use anyhow::Context;
use clap::{Parser, Subcommand};
use ferrircd_core::{Config, IoMode, Server};
use ferrircd_modules::{OptionalModule, StandardModule};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_LOG_LEVEL: &str = "info";

/// ferrircd - An IRC daemon with loadable command modules
#[derive(Parser)]
#[command(name = "ferrircd")]
#[command(about = "An IRC daemon with loadable command modules")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ferrircd.toml")]
    config: PathBuf,

    /// Log level, overriding the configuration file
    #[arg(short, long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Test configuration and exit
    #[arg(long)]
    test_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Config {
        /// Output file path
        #[arg(short, long, default_value = "ferrircd.toml")]
        output: PathBuf,
    },
    /// Show server information
    Info,
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = cli.command {
        match command {
            Commands::Config { output } => {
                generate_config(&output)?;
                return Ok(());
            }
            Commands::Info => {
                show_info();
                return Ok(());
            }
            Commands::Version => {
                show_version();
                return Ok(());
            }
        }
    }

    // Load configuration
    let (config, loaded) = if cli.config.exists() {
        (
            Config::from_file(&cli.config)
                .with_context(|| format!("failed to load configuration from {:?}", cli.config))?,
            true,
        )
    } else {
        (Config::default(), false)
    };

    // An explicit CLI level wins over the configured one
    let level = if cli.log_level != DEFAULT_LOG_LEVEL {
        cli.log_level.as_str()
    } else {
        config.logging.level.as_str()
    };
    init_logging(level)?;

    if loaded {
        info!("Loaded configuration from {:?}", cli.config);
    } else {
        info!("Configuration file not found, using defaults");
    }

    config.validate().context("invalid configuration")?;
    if cli.test_config {
        info!("Configuration is valid");
        return Ok(());
    }

    let runtime = match config.connection.io_mode {
        IoMode::Thread => tokio::runtime::Builder::new_multi_thread().enable_all().build(),
        IoMode::Event => tokio::runtime::Builder::new_current_thread().enable_all().build(),
    }
    .context("failed to build tokio runtime")?;
    info!("Using {:?} I/O mode", config.connection.io_mode);

    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let mut server = Server::new(config);
    server.load_module(Box::new(StandardModule::new())).await?;
    server.load_module(Box::new(OptionalModule::new())).await?;

    info!("Starting ferrircd...");
    server.start().await.context("server stopped with an error")?;

    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) -> anyhow::Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .init();

    Ok(())
}

/// Generate default configuration file
fn generate_config(output: &PathBuf) -> anyhow::Result<()> {
    let config = Config::default();
    config.to_file(output)?;
    println!("Generated default configuration file: {:?}", output);
    Ok(())
}

/// Show server information
fn show_info() {
    println!("ferrircd");
    println!("========");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!();
    println!("Modules:");
    println!("  - standard: JOIN, PART, PRIVMSG, NOTICE, KICK, KILL, OPER, STATS");
    println!("  - optional: WALLCHOPS, USERIP");
}

/// Show version information
fn show_version() {
    println!("ferrircd {}", env!("CARGO_PKG_VERSION"));
}
