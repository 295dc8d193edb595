//! Identity and recipient files.
//!
//! The private identity lives in `identity.key` (0400) or is supplied through
//! `MOORING_IDENTITY`. The public recipient lives in `recipient.pub` and can be
//! handed to processes that only need to write secrets.

use std::fs;
use std::path::{Path, PathBuf};

use age::secrecy::ExposeSecret;
use age::x25519;
use tracing::debug;
use zeroize::Zeroizing;

use super::fs::{ensure_dir, warn_if_exposed, write_atomic};
use crate::core::cipher;
use crate::core::constants;
use crate::error::{Result, StoreError};

pub(super) fn identity_path(dir: &Path) -> PathBuf {
    dir.join(constants::IDENTITY_FILE)
}

pub(super) fn recipient_path(dir: &Path) -> PathBuf {
    dir.join(constants::RECIPIENT_FILE)
}

/// Identity supplied out-of-band, if any.
fn identity_from_env() -> Option<String> {
    std::env::var(constants::IDENTITY_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Load the private identity, preferring `MOORING_IDENTITY` over the file.
pub(super) fn load_identity(dir: &Path) -> Result<x25519::Identity> {
    if let Some(secret) = identity_from_env() {
        debug!("using identity from {}", constants::IDENTITY_ENV);
        return cipher::parse_identity(&secret);
    }

    let path = identity_path(dir);
    if !path.exists() {
        return Err(StoreError::NoIdentity(path).into());
    }
    warn_if_exposed(&path);

    let contents = Zeroizing::new(fs::read_to_string(&path).map_err(StoreError::ReadFailed)?);
    debug!(path = %path.display(), "identity loaded");
    cipher::parse_identity(&contents)
}

/// Load the public recipient, deriving it from the identity when
/// `recipient.pub` is absent.
pub(super) fn load_recipient(dir: &Path) -> Result<x25519::Recipient> {
    let path = recipient_path(dir);
    if path.exists() {
        let contents = fs::read_to_string(&path).map_err(StoreError::ReadFailed)?;
        return cipher::parse_recipient(&contents);
    }
    load_identity(dir).map(|identity| identity.to_public())
}

pub(super) fn write_identity(dir: &Path, identity: &x25519::Identity) -> Result<()> {
    let secret = identity.to_string();
    let contents = Zeroizing::new(format!("{}\n", secret.expose_secret()));
    write_atomic(
        &identity_path(dir),
        contents.as_bytes(),
        constants::IDENTITY_MODE,
    )
}

pub(super) fn write_recipient(dir: &Path, recipient: &x25519::Recipient) -> Result<()> {
    write_atomic(
        &recipient_path(dir),
        format!("{}\n", recipient).as_bytes(),
        constants::RECIPIENT_MODE,
    )
}

/// Write `identity` to `archive/identity.key.<timestamp>`.
///
/// Callers pass the identity that decrypted the store, which may come from
/// `MOORING_IDENTITY` rather than `identity.key`.
pub(super) fn archive_identity(dir: &Path, identity: &x25519::Identity) -> Result<PathBuf> {
    let archive = dir.join(constants::ARCHIVE_DIR);
    ensure_dir(&archive, constants::STORE_DIR_MODE)?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%f");
    let target = archive.join(format!("{}.{}", constants::IDENTITY_FILE, timestamp));
    let secret = identity.to_string();
    let contents = Zeroizing::new(format!("{}\n", secret.expose_secret()));
    write_atomic(&target, contents.as_bytes(), constants::IDENTITY_MODE)?;

    debug!(path = %target.display(), "archived identity");
    Ok(target)
}

/// Remove an archive entry written by a roll that was undone.
pub(super) fn discard_archive(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(StoreError::WriteFailed)?;
    if let Some(archive) = path.parent() {
        // Only succeeds when the roll created the directory.
        let _ = fs::remove_dir(archive);
    }
    Ok(())
}

/// Contents of a file that a roll is about to replace.
pub(super) struct Snapshot {
    path: PathBuf,
    contents: Option<Zeroizing<Vec<u8>>>,
    mode: u32,
}

impl Snapshot {
    pub(super) fn take(path: PathBuf, mode: u32) -> Result<Self> {
        let contents = match fs::read(&path) {
            Ok(bytes) => Some(Zeroizing::new(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::ReadFailed(e).into()),
        };
        Ok(Self {
            path,
            contents,
            mode,
        })
    }

    /// Put the file back the way it was.
    pub(super) fn restore(&self) -> Result<()> {
        match &self.contents {
            Some(contents) => write_atomic(&self.path, contents, self.mode),
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StoreError::WriteFailed(e).into()),
            },
        }
    }
}
