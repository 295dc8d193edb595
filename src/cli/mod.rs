//! Command-line interface.

pub mod output;
pub mod resolve;
pub mod secrets;
pub mod targets;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::{AppConfig, TargetSelection};
use crate::core::store::SecretStore;
use crate::error::Result;

/// Mooring - deployment configuration merging and secret materialization.
#[derive(Parser)]
#[command(
    name = "mooring",
    about = "Merge deployment targets and materialize their secrets",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Deployment document (.toml or .json)
    #[arg(short, long, global = true, env = "MOORING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local secret store directory
    #[arg(long, global = true, env = "MOORING_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Merge and resolve targets, printing a redacted summary
    Resolve {
        /// Targets to resolve (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        targets: Vec<String>,

        /// Resolve every target
        #[arg(short, long, conflicts_with = "targets")]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured targets
    Targets,

    /// Manage the local secret store
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },
}

/// Secret store subcommands.
#[derive(Subcommand)]
pub enum SecretsAction {
    /// Create the store and its identity
    Init,

    /// Encrypt and store a secret
    Set {
        /// Secret name (e.g., DATABASE_URL)
        name: String,
        /// Secret value; read from stdin when omitted
        value: Option<String>,
    },

    /// Print a decrypted secret
    Get {
        /// Secret name
        name: String,
    },

    /// List secret names
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a secret
    Rm {
        /// Secret name
        name: String,
    },

    /// Generate a new identity and re-encrypt every secret
    Roll,
}

/// Global options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
}

impl Context {
    /// Load the deployment document.
    pub fn load_config(&self) -> Result<AppConfig> {
        match &self.config {
            Some(path) => AppConfig::load(path),
            None => AppConfig::load(AppConfig::default_path()),
        }
    }

    /// Resolve the store directory.
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => SecretStore::default_dir(),
        }
    }

    pub fn store(&self) -> Result<SecretStore> {
        Ok(SecretStore::open(self.store_dir()?))
    }
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    let ctx = Context {
        config: cli.config,
        store_dir: cli.store_dir,
    };

    match cli.command {
        Command::Resolve { targets, all, json } => {
            resolve::execute(&ctx, TargetSelection { targets, all }, json)
        }
        Command::Targets => targets::execute(&ctx),
        Command::Secrets { action } => match action {
            SecretsAction::Init => secrets::init(&ctx),
            SecretsAction::Set { name, value } => secrets::set(&ctx, &name, value),
            SecretsAction::Get { name } => secrets::get(&ctx, &name),
            SecretsAction::List { json } => secrets::list(&ctx, json),
            SecretsAction::Rm { name } => secrets::rm(&ctx, &name),
            SecretsAction::Roll => secrets::roll(&ctx),
        },
    }
}
