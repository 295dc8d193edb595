//! Secret providers.
//!
//! A provider turns one configured bundle into a `key -> value` map. The
//! provider set is closed: adding one means a new [`Provider`] variant, a new
//! [`SourceConfig`] variant, and a new arm in [`ProviderFetcher::fetch`].
//!
//! ## Providers
//!
//! - **onepassword**: shells out to the 1Password CLI (`op item get`).
//! - **local**: the operator's encrypted secret store.
//!
//! Fetchers are stateless. Caching (one fetch per bundle per pass) belongs to
//! the resolution engine.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Bundle;
use crate::error::FetchError;

mod local;
mod onepassword;

pub use local::LocalSource;
pub use onepassword::{OnePasswordCli, OnePasswordSource};

/// Registered provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provider {
    OnePassword,
    Local,
}

impl Provider {
    /// Identifier used in secret references.
    pub fn id(&self) -> &'static str {
        match self {
            Self::OnePassword => "onepassword",
            Self::Local => "local",
        }
    }

    /// Look up a provider by its reference identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "onepassword" => Some(Self::OnePassword),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The `secret_providers` block of a deployment document.
///
/// ```toml
/// [secret_providers.onepassword.prod_api_keys]
/// vault = "Production"
/// item = "API Keys"
///
/// [secret_providers.local.default]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretProviders {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub onepassword: BTreeMap<String, OnePasswordSource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub local: BTreeMap<String, LocalSource>,
}

impl SecretProviders {
    /// Settings for one bundle, if configured.
    pub fn source(&self, provider: Provider, bundle: &str) -> Option<SourceConfig> {
        match provider {
            Provider::OnePassword => self
                .onepassword
                .get(bundle)
                .cloned()
                .map(SourceConfig::OnePassword),
            Provider::Local => self.local.get(bundle).cloned().map(SourceConfig::Local),
        }
    }
}

/// Provider-specific settings for one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    OnePassword(OnePasswordSource),
    Local(LocalSource),
}

impl SourceConfig {
    pub fn provider(&self) -> Provider {
        match self {
            Self::OnePassword(_) => Provider::OnePassword,
            Self::Local(_) => Provider::Local,
        }
    }
}

/// Fetches one bundle from its provider.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the whole bundle named `bundle`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` naming the provider and bundle when the external
    /// tool is missing, fails, or returns unparsable output.
    async fn fetch(&self, bundle: &str, source: &SourceConfig) -> Result<Bundle, FetchError>;
}

/// The production fetcher: dispatches to each provider's implementation.
#[derive(Debug, Clone, Default)]
pub struct ProviderFetcher {
    onepassword: OnePasswordCli,
    store_dir: Option<PathBuf>,
}

impl ProviderFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store directory used by `local` sources that don't set `dir`.
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl Fetcher for ProviderFetcher {
    async fn fetch(&self, bundle: &str, source: &SourceConfig) -> Result<Bundle, FetchError> {
        debug!(provider = %source.provider(), bundle, "fetching bundle");
        match source {
            SourceConfig::OnePassword(cfg) => self.onepassword.fetch(bundle, cfg).await,
            SourceConfig::Local(cfg) => {
                local::fetch(bundle, cfg, self.store_dir.as_deref()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ids_roundtrip() {
        for provider in [Provider::OnePassword, Provider::Local] {
            assert_eq!(Provider::from_id(provider.id()), Some(provider));
        }
        assert_eq!(Provider::from_id("vault"), None);
    }

    #[test]
    fn test_source_lookup() {
        let providers: SecretProviders = toml::from_str(
            r#"
            [onepassword.prod]
            vault = "Production"
            item = "API Keys"

            [local.default]
            "#,
        )
        .unwrap();

        assert!(matches!(
            providers.source(Provider::OnePassword, "prod"),
            Some(SourceConfig::OnePassword(ref s)) if s.item == "API Keys"
        ));
        assert!(matches!(
            providers.source(Provider::Local, "default"),
            Some(SourceConfig::Local(_))
        ));
        assert!(providers.source(Provider::OnePassword, "staging").is_none());
    }
}
