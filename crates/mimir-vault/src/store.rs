//! Sealed-blob read/write primitive over a filesystem path
//!
//! Everything the cache persists goes through this store: writes seal first
//! and land with owner-only permissions, reads unseal on every call. No
//! plaintext is retained between reads.

use std::path::Path;
use std::sync::Arc;

use mimir_core::{Error, Result};
use tokio::fs;
use tracing::debug;

use crate::seal::Sealer;

/// Sealed file store backed by a [`Sealer`]
#[derive(Clone)]
pub struct SealedStore {
    sealer: Arc<dyn Sealer>,
}

impl SealedStore {
    pub fn new(sealer: Arc<dyn Sealer>) -> Self {
        Self { sealer }
    }

    /// Seal `plaintext` and write it to `path`, creating parent directories
    /// and restricting permissions to the owner
    pub async fn write(&self, path: &Path, plaintext: &[u8]) -> Result<()> {
        let sealed = self.sealer.seal(plaintext)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))
                    .await
                    .ok();
            }
        }

        fs::write(path, &sealed)
            .await
            .map_err(|e| Error::store(format!("Failed to write {}: {}", path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| {
                    Error::store(format!(
                        "Failed to restrict permissions on {}: {}",
                        path.display(),
                        e
                    ))
                })?;
        }

        debug!("Sealed {} bytes to {}", plaintext.len(), path.display());
        Ok(())
    }

    /// Read and unseal the blob at `path`
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let sealed = fs::read(path)
            .await
            .map_err(|e| Error::store(format!("Failed to read {}: {}", path.display(), e)))?;
        self.sealer.unseal(&sealed)
    }
}
