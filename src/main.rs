//! Mooring - deployment configuration merging and secret materialization.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mooring::cli::output;
use mooring::cli::{execute, Cli};
use mooring::core::constants;
use mooring::error::{ConfigError, Error, StoreError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(constants::LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("mooring=debug")
        } else {
            EnvFilter::new("mooring=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = suggestion(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn suggestion(e: &Error) -> Option<&'static str> {
    match e {
        Error::Store(StoreError::NotInitialized(_)) => Some("run: mooring secrets init"),
        Error::Store(StoreError::NoIdentity(_)) => {
            Some("restore identity.key from archive/ or set MOORING_IDENTITY")
        }
        Error::Store(StoreError::RollIncomplete { .. }) => {
            Some("copy the archived identity back to identity.key before reading secrets")
        }
        Error::Config(ConfigError::NotFound(_)) => {
            Some("create mooring.toml or pass --config <path>")
        }
        Error::Config(ConfigError::NoSecretProviders { .. }) => {
            Some("add a [secret_providers] block to the config")
        }
        _ => None,
    }
}
