//! Filesystem helpers for the secret store.
//!
//! Every write goes through a temp file in the target's directory and is
//! renamed into place, so a crash never leaves a half-written file.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{trace, warn};

use crate::error::{Result, StoreError};

/// Atomically replace `path` with `contents`, applying `mode` (Unix) before
/// the rename.
pub(super) fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(StoreError::WriteFailed)?;

    tmp.write_all(contents).map_err(StoreError::WriteFailed)?;
    tmp.as_file().sync_all().map_err(StoreError::WriteFailed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))
            .map_err(StoreError::WriteFailed)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.persist(path)
        .map_err(|e| StoreError::WriteFailed(e.error))?;

    trace!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Create a directory (and parents) restricted to the owner.
pub(super) fn ensure_dir(dir: &Path, mode: u32) -> Result<()> {
    fs::create_dir_all(dir).map_err(StoreError::WriteFailed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(mode))
            .map_err(StoreError::WriteFailed)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Warn when a file is readable or writable by group or others.
#[cfg(unix)]
pub(super) fn warn_if_exposed(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{:o}", mode),
                "insecure file permissions, run: chmod 600 {}",
                path.display()
            );
        }
    }
}

#[cfg(not(unix))]
pub(super) fn warn_if_exposed(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file");

        write_atomic(&path, b"first", 0o600).unwrap();
        write_atomic(&path, b"second", 0o600).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        // No temp files left behind.
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identity.key");
        write_atomic(&path, b"key", 0o400).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o400);

        // Read-only targets can still be replaced by rename.
        write_atomic(&path, b"new key", 0o400).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new key");
    }
}
