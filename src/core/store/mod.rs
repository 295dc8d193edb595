//! Local secret store.
//!
//! Operator secrets encrypted at rest under an age identity:
//!
//! ```text
//! ~/.mooring/secrets/
//! ├── secrets.json     # {name: {ciphertext, updated_at}}, 0600
//! ├── identity.key     # AGE-SECRET-KEY-..., 0400
//! ├── recipient.pub    # age1..., safe to distribute
//! └── archive/         # identities replaced by a key roll
//! ```
//!
//! Writing needs only the public recipient; reading needs the private
//! identity. Every mutation is a read-modify-write through an atomic rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use age::x25519;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::cipher::{Age, Cipher};
use crate::core::constants;
use crate::core::domain::SecretRecord;
use crate::core::types::{Bundle, EncryptedValue, PublicKey, SecretName};
use crate::error::{Error, Result, StoreError, ValidationError};

mod fs;
mod keys;

/// On-disk record set.
#[derive(Debug, Serialize, Deserialize)]
struct RecordSet {
    version: u32,
    #[serde(default)]
    secrets: BTreeMap<SecretName, StoredRecord>,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self {
            version: constants::RECORDS_VERSION,
            secrets: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    ciphertext: EncryptedValue,
    updated_at: DateTime<Utc>,
}

/// Encrypted-at-rest secret store rooted at one directory.
pub struct SecretStore<C = Age> {
    dir: PathBuf,
    cipher: C,
}

impl SecretStore<Age> {
    /// Open a store directory with the age backend. Nothing is read yet.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::with_cipher(dir, Age)
    }

    /// Create a new store with a freshly generated identity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyInitialized` if the directory already
    /// holds a store.
    pub fn init(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::open(dir);
        store.initialize()?;
        Ok(store)
    }

    /// `~/.mooring/secrets`
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(home.join(constants::STORE_DIR))
    }
}

impl<C> SecretStore<C>
where
    C: Cipher<Recipient = x25519::Recipient, Identity = x25519::Identity>,
{
    pub fn with_cipher(dir: impl Into<PathBuf>, cipher: C) -> Self {
        Self {
            dir: dir.into(),
            cipher,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn records_path(&self) -> PathBuf {
        self.dir.join(constants::RECORDS_FILE)
    }

    /// Whether the directory holds a store.
    pub fn is_initialized(&self) -> bool {
        keys::recipient_path(&self.dir).exists() || self.records_path().exists()
    }

    /// Generate an identity and write an empty record set.
    ///
    /// Returns the public key to hand to write-only processes.
    pub fn initialize(&self) -> Result<PublicKey> {
        if self.is_initialized() {
            return Err(StoreError::AlreadyInitialized(self.dir.clone()).into());
        }
        debug!(dir = %self.dir.display(), cipher = self.cipher.name(), "initializing store");

        fs::ensure_dir(&self.dir, constants::STORE_DIR_MODE)?;

        let identity = x25519::Identity::generate();
        let recipient = identity.to_public();
        keys::write_identity(&self.dir, &identity)?;
        keys::write_recipient(&self.dir, &recipient)?;
        self.save(&RecordSet::default())?;

        Ok(recipient.to_string())
    }

    /// Public key new secrets are encrypted to.
    pub fn public_key(&self) -> Result<PublicKey> {
        self.require_initialized()?;
        Ok(keys::load_recipient(&self.dir)?.to_string())
    }

    /// Encrypt and store a secret, replacing any previous value.
    ///
    /// Only the public recipient is needed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an invalid name or empty value, and
    /// `StoreError` if the store is missing or cannot be written.
    pub fn put(&self, name: &str, plaintext: &str) -> Result<SecretRecord> {
        validate_name(name)?;
        if plaintext.is_empty() {
            return Err(ValidationError::EmptySecretValue(name.to_string()).into());
        }

        let mut set = self.load()?;
        let recipient = keys::load_recipient(&self.dir)?;
        let ciphertext = self.cipher.encrypt(plaintext, &[recipient])?;
        let updated_at = Utc::now();

        set.secrets.insert(
            name.to_string(),
            StoredRecord {
                ciphertext: ciphertext.clone(),
                updated_at,
            },
        );
        self.save(&set)?;

        debug!(name, "secret stored");
        Ok(SecretRecord::new(name.to_string(), ciphertext, updated_at))
    }

    /// Decrypt one secret.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SecretNotFound` (with a suggestion) if the name
    /// doesn't exist, `StoreError::NoIdentity` without a private identity.
    pub fn get(&self, name: &str) -> Result<Zeroizing<String>> {
        let set = self.load()?;
        let record = set.secrets.get(name).ok_or_else(|| {
            let available: Vec<String> = set.secrets.keys().cloned().collect();
            StoreError::not_found(name, &available)
        })?;

        let identity = keys::load_identity(&self.dir)?;
        let plaintext = self.cipher.decrypt(&record.ciphertext, &identity)?;
        Ok(Zeroizing::new(plaintext))
    }

    /// Names of all stored secrets, sorted.
    pub fn list(&self) -> Result<Vec<SecretName>> {
        Ok(self.load()?.secrets.into_keys().collect())
    }

    /// All records with their ciphertext and timestamps.
    pub fn list_records(&self) -> Result<Vec<SecretRecord>> {
        Ok(self
            .load()?
            .secrets
            .into_iter()
            .map(|(name, r)| SecretRecord::new(name, r.ciphertext, r.updated_at))
            .collect())
    }

    /// Remove a secret.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut set = self.load()?;
        if set.secrets.remove(name).is_none() {
            let available: Vec<String> = set.secrets.keys().cloned().collect();
            return Err(StoreError::not_found(name, &available).into());
        }
        self.save(&set)?;
        debug!(name, "secret deleted");
        Ok(())
    }

    /// Decrypt every record.
    pub fn decrypt_all(&self) -> Result<Bundle> {
        let set = self.load()?;
        let identity = keys::load_identity(&self.dir)?;

        let mut bundle = Bundle::new();
        for (name, record) in set.secrets {
            let plaintext = self.cipher.decrypt(&record.ciphertext, &identity)?;
            bundle.insert(name, Zeroizing::new(plaintext));
        }
        Ok(bundle)
    }

    /// Re-encrypt every record under `new_identity` and make it authoritative.
    ///
    /// All records are decrypted and re-encrypted in memory first. If any
    /// record fails, nothing is written and the current identity stays in
    /// place. Otherwise the identity that decrypted the store is archived and
    /// the new identity, record set and recipient are written. A failed write
    /// puts the previous identity and record set back.
    ///
    /// Returns the number of records re-encrypted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::RollAborted` naming the first record that failed,
    /// `StoreError::RollReverted` if a write failed and was undone, or
    /// `StoreError::RollIncomplete` if undoing it failed too.
    pub fn roll_key(&self, new_identity: x25519::Identity) -> Result<usize> {
        let set = self.load()?;
        let current = keys::load_identity(&self.dir)?;
        let new_recipient = new_identity.to_public();

        let mut rolled = BTreeMap::new();
        for (name, record) in &set.secrets {
            let abort = |e: Error| StoreError::RollAborted {
                name: name.clone(),
                reason: e.to_string(),
            };
            let plaintext = Zeroizing::new(
                self.cipher
                    .decrypt(&record.ciphertext, &current)
                    .map_err(abort)?,
            );
            let ciphertext = self
                .cipher
                .encrypt(&plaintext, std::slice::from_ref(&new_recipient))
                .map_err(abort)?;
            rolled.insert(
                name.clone(),
                StoredRecord {
                    ciphertext,
                    updated_at: record.updated_at,
                },
            );
        }
        let rolled = RecordSet {
            version: constants::RECORDS_VERSION,
            secrets: rolled,
        };
        let count = rolled.secrets.len();

        let previous = [
            keys::Snapshot::take(keys::identity_path(&self.dir), constants::IDENTITY_MODE)?,
            keys::Snapshot::take(self.records_path(), constants::RECORDS_MODE)?,
        ];
        let archived = keys::archive_identity(&self.dir, &current)?;

        // The recipient goes last: once it changes, writers encrypt to the
        // new key, so identity and records must already be in place.
        let committed = keys::write_identity(&self.dir, &new_identity)
            .and_then(|()| self.save(&rolled))
            .and_then(|()| keys::write_recipient(&self.dir, &new_recipient));

        if let Err(e) = committed {
            warn!(error = %e, "key roll failed while writing, restoring previous state");
            let restored = previous
                .iter()
                .try_for_each(keys::Snapshot::restore)
                .and_then(|()| keys::discard_archive(&archived));
            return Err(match restored {
                Ok(()) => StoreError::RollReverted {
                    reason: e.to_string(),
                },
                Err(restore) => StoreError::RollIncomplete {
                    reason: e.to_string(),
                    restore: restore.to_string(),
                    archive: archived,
                },
            }
            .into());
        }

        if std::env::var_os(constants::IDENTITY_ENV).is_some() {
            warn!(
                "{} is set; update it to the new identity after the roll",
                constants::IDENTITY_ENV
            );
        }
        info!(secrets = count, "key rolled");
        Ok(count)
    }

    /// Generate a new identity and roll every record to it.
    ///
    /// Returns the new public key.
    pub fn roll(&self) -> Result<PublicKey> {
        let identity = x25519::Identity::generate();
        let public_key = identity.to_public().to_string();
        self.roll_key(identity)?;
        Ok(public_key)
    }

    fn require_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StoreError::NotInitialized(self.dir.clone()).into())
        }
    }

    fn load(&self) -> Result<RecordSet> {
        self.require_initialized()?;

        let path = self.records_path();
        if !path.exists() {
            return Ok(RecordSet::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(StoreError::ReadFailed)?;
        let set: RecordSet =
            serde_json::from_str(&contents).map_err(|e| StoreError::InvalidFormat {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        debug!(secrets = set.secrets.len(), "record set loaded");
        Ok(set)
    }

    fn save(&self, set: &RecordSet) -> Result<()> {
        let contents =
            serde_json::to_vec_pretty(set).map_err(|e| StoreError::InvalidFormat {
                path: self.records_path(),
                reason: e.to_string(),
            })?;
        fs::write_atomic(&self.records_path(), &contents, constants::RECORDS_MODE)
    }
}

/// Validate a secret name.
///
/// Names may contain A-Z, a-z, 0-9, underscore and hyphen, and cannot start
/// with a digit.
pub fn validate_name(name: &str) -> std::result::Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidSecretName {
        name: name.to_string(),
        reason,
    };

    let first = name
        .chars()
        .next()
        .ok_or_else(|| invalid("cannot be empty".to_string()))?;
    if first.is_ascii_digit() {
        return Err(invalid("cannot start with a digit".to_string()));
    }

    for (i, ch) in name.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '-' {
            return Err(invalid(format!(
                "invalid character '{}' at position {}",
                ch,
                i + 1
            )));
        }
    }

    Ok(())
}
