//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

use zeroize::Zeroizing;

/// A stored secret's name (e.g., DATABASE_URL, api-token).
pub type SecretName = String;

/// An encrypted secret value (age-armored ciphertext).
pub type EncryptedValue = String;

/// An age public key string (starts with "age1...").
pub type PublicKey = String;

/// Name of a deployment target.
pub type TargetName = String;

/// Key/value pairs fetched from one external secret bundle.
///
/// Values are wiped from memory when the bundle is dropped.
pub type Bundle = BTreeMap<String, Zeroizing<String>>;
