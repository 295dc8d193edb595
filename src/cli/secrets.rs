//! Secret store commands.
//!
//! Implements init, set, get, list, rm and roll over the local store.

use std::io::{IsTerminal, Read};

use tracing::info;
use zeroize::Zeroizing;

use crate::cli::{output, Context};
use crate::core::store::SecretStore;
use crate::error::Result;

/// Create the store and its identity.
pub fn init(ctx: &Context) -> Result<()> {
    let dir = ctx.store_dir()?;
    let store = SecretStore::open(&dir);
    let public_key = store.initialize()?;

    output::success(&format!("store initialized: {}", output::path(dir.display())));
    output::kv("recipient", &public_key);
    output::kv(
        "identity",
        output::path(dir.join(crate::core::constants::IDENTITY_FILE).display()),
    );
    println!();
    output::dimmed("share recipient.pub with processes that only need to write secrets");
    Ok(())
}

/// Encrypt and store a secret. Reads the value from stdin when not given.
pub fn set(ctx: &Context, name: &str, value: Option<String>) -> Result<()> {
    info!("Setting secret: {}", name);
    let value = match value {
        Some(value) => Zeroizing::new(value),
        None => read_stdin()?,
    };

    let store = ctx.store()?;
    store.put(name, &value)?;
    output::success(&format!("set: {}", output::key(name)));
    Ok(())
}

/// Print a decrypted secret.
pub fn get(ctx: &Context, name: &str) -> Result<()> {
    let value = ctx.store()?.get(name)?;
    // Plain output for scripting
    println!("{}", value.as_str());
    Ok(())
}

/// List secret names.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let records = ctx.store()?.list_records()?;

    if json {
        let entries: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "name": r.name(),
                    "updated_at": r.updated_at().to_rfc3339(),
                })
            })
            .collect();
        let result = serde_json::json!({
            "secrets": entries,
            "count": records.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if records.is_empty() {
        output::dimmed("no secrets stored");
    } else {
        output::section(&format!("{} secrets", records.len()));
        for record in &records {
            output::list_item(&format!(
                "{}  {}",
                record.name(),
                console::style(record.updated_at().format("%Y-%m-%d %H:%M")).dim()
            ));
        }
    }

    Ok(())
}

/// Remove a secret.
pub fn rm(ctx: &Context, name: &str) -> Result<()> {
    info!("Removing secret: {}", name);
    ctx.store()?.delete(name)?;
    output::success(&format!("removed: {}", output::key(name)));
    Ok(())
}

/// Roll the store to a new identity.
pub fn roll(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let count = store.list()?.len();
    let public_key = store.roll()?;

    output::success(&format!("rolled {} secrets to a new identity", count));
    output::kv("recipient", &public_key);
    output::hint("previous identity archived under archive/; redistribute recipient.pub");
    Ok(())
}

fn read_stdin() -> Result<Zeroizing<String>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        output::dimmed("enter value, then Ctrl-D:");
    }
    let mut value = Zeroizing::new(String::new());
    stdin.read_to_string(&mut value)?;
    let trimmed = value.trim_end_matches(['\r', '\n']).len();
    value.truncate(trimmed);
    Ok(value)
}
