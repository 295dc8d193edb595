//! Secret record type.
//!
//! A single persisted secret: its name, ciphertext, and last update time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{EncryptedValue, SecretName};

/// An encrypted secret as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    name: SecretName,
    ciphertext: EncryptedValue,
    updated_at: DateTime<Utc>,
}

impl SecretRecord {
    pub fn new(name: SecretName, ciphertext: EncryptedValue, updated_at: DateTime<Utc>) -> Self {
        Self {
            name,
            ciphertext,
            updated_at,
        }
    }

    /// Secret's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encrypted ciphertext
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl std::fmt::Display for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
