//! Encryption for the local secret store.
//!
//! Secrets are encrypted to the public half of an age x25519 identity and
//! decrypted with the private half. The [`Cipher`] trait is the seam the
//! store is generic over.

use crate::error::Result;

mod age;

pub use self::age::{parse_identity, parse_recipient, Age};

/// Cryptographic backend trait.
///
/// Abstracts encryption and decryption so the secret store can run against
/// a different backend (or a deliberately failing one in tests).
pub trait Cipher {
    /// Type representing a recipient public key.
    type Recipient;

    /// Type representing a private identity/key.
    type Identity;

    /// Encrypt plaintext for every recipient.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if encryption fails.
    fn encrypt(&self, plaintext: &str, recipients: &[Self::Recipient]) -> Result<String>;

    /// Decrypt an encrypted string using a private identity.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if decryption fails or the identity doesn't match.
    fn decrypt(&self, encrypted: &str, identity: &Self::Identity) -> Result<String>;

    /// Backend name for display/logging.
    fn name(&self) -> &'static str;
}
