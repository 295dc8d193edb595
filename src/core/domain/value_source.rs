//! Value source type.
//!
//! A configuration leaf that is either a literal or a deferred reference to
//! an environment variable or an external secret.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SecretRef;
use crate::error::ValidationError;

/// A literal value or a deferred reference.
///
/// Exactly one of `value` and `from` must be set; [`ValueSource::kind`]
/// enforces this rather than assuming it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ValueFrom>,
}

/// Deferred reference. Exactly one of `env` and `secret` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFrom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Validated view of a [`ValueSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind<'a> {
    Literal(&'a str),
    Env(&'a str),
    Secret(SecretRef),
}

impl ValueSource {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            from: None,
        }
    }

    pub fn env(name: impl Into<String>) -> Self {
        Self {
            value: None,
            from: Some(ValueFrom {
                env: Some(name.into()),
                secret: None,
            }),
        }
    }

    pub fn secret(reference: impl Into<String>) -> Self {
        Self {
            value: None,
            from: Some(ValueFrom {
                env: None,
                secret: Some(reference.into()),
            }),
        }
    }

    /// Validate the shape and classify the source.
    ///
    /// `path` locates the source in the configuration tree for error messages.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ValueSource` when both or neither of
    /// literal/deferred are set, and `ValidationError::InvalidSecretRef` when
    /// a secret reference is malformed.
    pub fn kind(&self, path: &str) -> Result<ValueKind<'_>, ValidationError> {
        let shape = |reason| ValidationError::ValueSource {
            path: path.to_string(),
            reason,
        };

        match (&self.value, &self.from) {
            (Some(value), None) => Ok(ValueKind::Literal(value)),
            (Some(_), Some(_)) => Err(shape("both are set")),
            (None, None) => Err(shape("neither is set")),
            (None, Some(from)) => match (&from.env, &from.secret) {
                (Some(name), None) => Ok(ValueKind::Env(name)),
                (None, Some(reference)) => Ok(ValueKind::Secret(reference.parse()?)),
                (Some(_), Some(_)) => Err(shape("'from' sets both env and secret")),
                (None, None) => Err(shape("'from' sets neither env nor secret")),
            },
        }
    }

    /// Whether the source still holds a deferred reference.
    pub fn is_deferred(&self) -> bool {
        self.from.is_some()
    }

    /// The literal value, if resolved.
    pub fn as_literal(&self) -> Option<&str> {
        match (&self.value, &self.from) {
            (Some(value), None) => Some(value),
            _ => None,
        }
    }

    /// Replace the deferred reference with its concrete value.
    ///
    /// The reference metadata is discarded so no provider grammar survives in
    /// a resolved tree.
    pub fn set_resolved(&mut self, value: String) {
        self.value = Some(value);
        self.from = None;
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ValueSource");
        if self.value.is_some() {
            s.field("value", &"<redacted>");
        }
        if let Some(from) = &self.from {
            s.field("from", from);
        }
        s.finish()
    }
}

/// A named environment entry (also used for build args).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(flatten)]
    pub source: ValueSource,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, source: ValueSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}
