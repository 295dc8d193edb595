//! 1Password CLI bridge.
//!
//! Fetches a whole item with `op item get <item> --vault <vault> --format json`
//! and exposes each field's label as a bundle key.
//!
//! ## Requirements
//!
//! - `op` CLI must be installed and on PATH
//! - The session must already be signed in (`op signin` or a service account token)

use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::core::constants;
use crate::core::types::Bundle;
use crate::error::FetchError;

const PROVIDER: &str = "onepassword";

/// Settings for one 1Password bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnePasswordSource {
    pub vault: String,
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Invokes the `op` executable.
#[derive(Debug, Clone)]
pub struct OnePasswordCli {
    program: String,
}

impl Default for OnePasswordCli {
    fn default() -> Self {
        Self {
            program: constants::ONEPASSWORD_BIN.to_string(),
        }
    }
}

impl OnePasswordCli {
    /// Use a different executable name or path.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(source: &OnePasswordSource) -> Vec<&str> {
        let mut args = vec![
            "item",
            "get",
            source.item.as_str(),
            "--vault",
            source.vault.as_str(),
            "--format",
            "json",
        ];
        if let Some(account) = &source.account {
            args.extend(["--account", account.as_str()]);
        }
        args
    }

    /// Fetch one item as a bundle.
    ///
    /// The child process is killed if the returned future is dropped.
    pub async fn fetch(
        &self,
        bundle: &str,
        source: &OnePasswordSource,
    ) -> Result<Bundle, FetchError> {
        let not_found = || FetchError::ToolNotFound {
            provider: PROVIDER,
            bundle: bundle.to_string(),
            tool: self.program.clone(),
        };

        let tool = which::which(&self.program).map_err(|_| not_found())?;
        debug!(tool = %tool.display(), bundle, item = %source.item, "running op");

        let output = Command::new(&tool)
            .args(Self::args(source))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => not_found(),
                _ => FetchError::ToolFailed {
                    provider: PROVIDER,
                    bundle: bundle.to_string(),
                    tool: self.program.clone(),
                    status: "spawn failed".to_string(),
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(FetchError::ToolFailed {
                provider: PROVIDER,
                bundle: bundle.to_string(),
                tool: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = Zeroizing::new(output.stdout);
        parse_item(bundle, &stdout)
    }
}

#[derive(Deserialize)]
struct Item {
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Deserialize)]
struct Field {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

/// Map an `op item get --format json` payload to a bundle keyed by label.
///
/// Fields without a value are skipped; the first field wins on duplicate labels.
fn parse_item(bundle: &str, payload: &[u8]) -> Result<Bundle, FetchError> {
    let item: Item =
        serde_json::from_slice(payload).map_err(|e| FetchError::UnparsableOutput {
            provider: PROVIDER,
            bundle: bundle.to_string(),
            reason: e.to_string(),
        })?;

    let mut values = Bundle::new();
    for field in item.fields {
        let key = match field.label.filter(|l| !l.is_empty()).or(field.id) {
            Some(key) => key,
            None => continue,
        };
        let value = match field.value {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => continue,
            Some(other) => other.to_string(),
        };
        values.entry(key).or_insert_with(|| Zeroizing::new(value));
    }

    trace!(bundle, keys = values.len(), "parsed op item");
    Ok(values)
}
