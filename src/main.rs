mod cli;

use liji::{config, server, storage};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, StorageArgs};
use std::path::{Path, PathBuf};

/// Defaults, then the config file, then environment variables.
fn resolve_config(config_path: Option<&Path>) -> Result<config::Config> {
    let mut config = config::load_config_or_default(config_path)?;
    config::apply_env_overrides(&mut config).context("Invalid environment override")?;
    Ok(config)
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    storage_args: StorageArgs,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;

    // CLI flags win over file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(dir) = static_dir {
        config.server.static_dir = Some(dir);
    }
    storage_args.apply(&mut config);
    config::validate_config(&config)?;

    tracing::info!("Starting Liji server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let store = storage::open(&config.storage)?;
    server::start_server(config, store).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "liji=trace,liji_db=debug,liji_common=debug,tower_http=debug".to_string()
        } else {
            "liji=debug,liji_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            static_dir,
            storage,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(
                host,
                port,
                static_dir,
                storage,
                cli.config.as_deref(),
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::SetPassword { password, storage } => {
            set_password(&password, storage, cli.config.as_deref())
        }
        Commands::Version => {
            println!("liji {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            print_summary(&config);
        }
    }

    Ok(())
}

fn print_summary(config: &config::Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Backend: {}", config.storage.backend);
    println!("  Data dir: {}", config.storage.data_dir.display());
    match config.server.static_dir {
        Some(ref dir) => println!("  Static dir: {}", dir.display()),
        None => println!("  Static dir: (none)"),
    }
}

fn set_password(password: &str, storage_args: StorageArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    storage_args.apply(&mut config);
    config::validate_config(&config)?;

    let store = storage::open(&config.storage)?;
    store
        .write_password(password)
        .context("Failed to store password")?;

    println!(
        "Password updated ({} backend in {})",
        config.storage.backend,
        config.storage.data_dir.display()
    );
    Ok(())
}
