use clap::{Args, Parser, Subcommand};
use liji::config::{Config, StorageBackend};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "liji")]
#[command(author, version, about = "Gift ledger service")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Storage selection shared by commands that open the ledger.
#[derive(Args, Debug, Default)]
pub struct StorageArgs {
    /// Storage backend
    #[arg(long, value_enum)]
    pub backend: Option<StorageBackend>,

    /// Directory holding liji.db or the JSON files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl StorageArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.storage.backend = backend;
        }
        if let Some(ref dir) = self.data_dir {
            config.storage.data_dir = dir.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with the web UI
        #[arg(long)]
        static_dir: Option<PathBuf>,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Reset the shared password in the configured storage
    SetPassword {
        /// New password
        password: String,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Display version information
    Version,
}
