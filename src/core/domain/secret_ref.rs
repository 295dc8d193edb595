//! Secret reference type.
//!
//! Parses the `provider:sourceName.key` grammar used inside configuration
//! documents, e.g. `onepassword:prod_api_keys.password`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A parsed reference to one key inside an external secret bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretRef {
    provider: String,
    bundle: String,
    key: String,
}

impl SecretRef {
    /// Provider identifier as written (e.g. `onepassword`).
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Name of the configured bundle under the provider.
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Key inside the bundle.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for SecretRef {
    type Err = ValidationError;

    /// The source name ends at the first `.`; the key may itself contain dots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidSecretRef {
            reference: s.to_string(),
            reason: reason.to_string(),
        };

        if s.chars().any(char::is_whitespace) {
            return Err(invalid("whitespace is not allowed"));
        }

        let (provider, rest) = s
            .split_once(':')
            .ok_or_else(|| invalid("missing ':' after provider"))?;
        if provider.is_empty() {
            return Err(invalid("empty provider"));
        }

        let (bundle, key) = rest
            .split_once('.')
            .ok_or_else(|| invalid("missing '.' between source name and key"))?;
        if bundle.is_empty() {
            return Err(invalid("empty source name"));
        }
        if key.is_empty() {
            return Err(invalid("empty key"));
        }

        Ok(Self {
            provider: provider.to_string(),
            bundle: bundle.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.provider, self.bundle, self.key)
    }
}
