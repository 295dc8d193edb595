//! Image types.
//!
//! [`ImageSpec`] is the partial record written in documents; [`Image`] is the
//! fully-specified form carried by a resolved target.

use serde::{Deserialize, Serialize};

use super::{EnvVar, ValueSource};
use crate::core::constants;
use crate::error::ValidationError;

/// Partial image record. Every field overrides independently when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryPolicy>,
}

/// Registry credentials. Username and password are deferred-capable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub username: ValueSource,
    pub password: ValueSource,
}

/// Local build directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<EnvVar>,
}

/// How previous images are kept for rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    pub strategy: HistoryStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStrategy {
    Local,
    Registry,
    None,
}

impl ImageSpec {
    /// Field-level merge of `self` over `base`.
    ///
    /// A field set here wins; an unset field keeps the base value. Setting
    /// only `tag` never erases the base's registry auth or history policy.
    pub fn merged_over(&self, base: &ImageSpec) -> ImageSpec {
        ImageSpec {
            repository: self.repository.clone().or_else(|| base.repository.clone()),
            tag: self.tag.clone().or_else(|| base.tag.clone()),
            registry: self.registry.clone().or_else(|| base.registry.clone()),
            build: self.build.clone().or_else(|| base.build.clone()),
            history: self.history.clone().or_else(|| base.history.clone()),
        }
    }

    /// Apply defaults and require a repository.
    pub fn finish(self, target: &str) -> Result<Image, ValidationError> {
        let repository = self
            .repository
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| ValidationError::MissingRepository {
                target: target.to_string(),
            })?;

        Ok(Image {
            repository,
            tag: self
                .tag
                .unwrap_or_else(|| constants::DEFAULT_TAG.to_string()),
            registry: self.registry,
            build: self.build,
            history: self.history,
        })
    }
}

/// Fully-specified image of a resolved target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub repository: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryPolicy>,
}

impl Image {
    /// `repository:tag`
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}
