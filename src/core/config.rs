//! Deployment document loading and target selection.
//!
//! Handles reading `mooring.toml` (or `.json`) into an [`AppConfig`] and
//! scoping an operation to explicit targets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::core::domain::{ImageSpec, TargetSettings};
use crate::core::provider::SecretProviders;
use crate::core::types::TargetName;
use crate::error::{ConfigError, Result, ValidationError};

/// A deployment document: base settings plus named target overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base settings, written at the top level of the document.
    #[serde(flatten)]
    pub base: TargetSettings,
    /// Shared images targets can select with `image_key`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, ImageSpec>,
    /// Named target overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<TargetName, TargetSettings>,
    /// Provider settings for secret references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_providers: Option<SecretProviders>,
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            other => {
                Err(ConfigError::UnsupportedFormat(other.unwrap_or_default().to_string()).into())
            }
        }
    }
}

impl AppConfig {
    /// Path to the default document in the current directory
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Load a document, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let format = Format::from_path(path)?;
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config = Self::parse(&contents, format).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(
            targets = config.targets.len(),
            images = config.images.len(),
            providers = config.secret_providers.is_some(),
            "config loaded"
        );
        Ok(config)
    }

    /// Decode a document from a string.
    pub fn parse(contents: &str, format: Format) -> std::result::Result<Self, String> {
        match format {
            Format::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    /// Names of all named targets, sorted.
    pub fn target_names(&self) -> Vec<TargetName> {
        self.targets.keys().cloned().collect()
    }

    /// Whether the document defines named targets.
    pub fn is_multi_target(&self) -> bool {
        !self.targets.is_empty()
    }

    /// Name a single-target document resolves under.
    pub fn single_target_name(&self) -> TargetName {
        self.base
            .name
            .clone()
            .unwrap_or_else(|| constants::DEFAULT_TARGET.to_string())
    }
}

/// Which targets an operation applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelection {
    pub targets: Vec<TargetName>,
    pub all: bool,
}

impl TargetSelection {
    /// No explicit scope.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every target.
    pub fn all() -> Self {
        Self {
            targets: Vec::new(),
            all: true,
        }
    }

    /// Explicit targets, in the given order.
    pub fn named<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetName>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            all: false,
        }
    }
}

/// Result of applying a [`TargetSelection`] to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    /// The document has no named targets; the base is the only target.
    Single,
    /// These named targets, deduplicated, in selection order.
    Targets(Vec<TargetName>),
}

/// Scope a selection to a document.
///
/// Named targets require an explicit scope: either `--targets` or `--all`.
///
/// # Errors
///
/// - `TargetsNotApplicable` if targets are named for a single-target document
/// - `TargetRequired` if a multi-target document gets no scope
/// - `UnknownTarget` if a named target doesn't exist
pub fn select_targets(
    config: &AppConfig,
    selection: &TargetSelection,
) -> std::result::Result<Selected, ValidationError> {
    if !config.is_multi_target() {
        if !selection.targets.is_empty() {
            return Err(ValidationError::TargetsNotApplicable {
                requested: selection.targets.clone(),
            });
        }
        return Ok(Selected::Single);
    }

    if selection.all {
        return Ok(Selected::Targets(config.target_names()));
    }

    if selection.targets.is_empty() {
        return Err(ValidationError::TargetRequired {
            available: config.target_names(),
        });
    }

    let mut selected: Vec<TargetName> = Vec::new();
    for name in &selection.targets {
        if !config.targets.contains_key(name) {
            return Err(ValidationError::UnknownTarget {
                target: name.clone(),
                available: config.target_names(),
            });
        }
        if !selected.contains(name) {
            selected.push(name.clone());
        }
    }
    Ok(Selected::Targets(selected))
}
