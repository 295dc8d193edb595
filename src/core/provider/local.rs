//! Local secret store provider.
//!
//! The bundle is the decrypted record set of a store directory, so
//! `local:default.DATABASE_URL` reads the `DATABASE_URL` record.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::store::SecretStore;
use crate::core::types::Bundle;
use crate::error::{Error, FetchError};

const PROVIDER: &str = "local";

/// Settings for one local store bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSource {
    /// Store directory; defaults to the tool's store directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Decrypt the store on the blocking pool.
pub(super) async fn fetch(
    bundle: &str,
    source: &LocalSource,
    default_dir: Option<&Path>,
) -> Result<Bundle, FetchError> {
    let wrap = |e: Error| FetchError::Local {
        provider: PROVIDER,
        bundle: bundle.to_string(),
        source: Box::new(e),
    };

    let dir = match (&source.dir, default_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => dir.to_path_buf(),
        (None, None) => SecretStore::default_dir().map_err(wrap)?,
    };

    tokio::task::spawn_blocking(move || SecretStore::open(dir).decrypt_all())
        .await
        .map_err(|e| wrap(Error::Io(std::io::Error::other(e.to_string()))))?
        .map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_decrypts_store() {
        let tmp = TempDir::new().unwrap();
        let store = SecretStore::init(tmp.path()).unwrap();
        store.put("DATABASE_URL", "postgres://db").unwrap();

        let source = LocalSource {
            dir: Some(tmp.path().to_path_buf()),
        };
        let bundle = fetch("default", &source, None).await.unwrap();
        assert_eq!(bundle.get("DATABASE_URL").unwrap().as_str(), "postgres://db");
    }

    #[tokio::test]
    async fn test_fetch_uninitialized_store_fails() {
        let tmp = TempDir::new().unwrap();
        let err = fetch("default", &LocalSource::default(), Some(tmp.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Local { ref bundle, .. } if bundle == "default"));
    }
}
