//! Authentication session lifecycle
//!
//! The session token is sealed at rest and considered valid while the file's
//! last-modified age stays under the TTL. Reusing a valid session refreshes
//! the timestamp (sliding renewal) without re-sealing. A missing,
//! unreadable, or stale session, or an explicit refresh, triggers a fresh
//! sign-in. A rejected sign-in is terminal for the invocation.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use mimir_core::{Config, Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::api::VaultApi;
use crate::seal::Sealer;
use crate::store::SealedStore;

/// Session lifetime, held under the vault service's own ~30-minute expiry so
/// a reused token is still accepted remotely
pub const SESSION_TTL: Duration = Duration::from_secs(29 * 60);

/// Sealed on-disk session payload
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    token: String,
    created_at: DateTime<Utc>,
}

/// Owns acquisition, reuse, persistence, and revocation of the session token
pub struct SessionManager {
    config: Arc<Config>,
    api: Arc<dyn VaultApi>,
    sealer: Arc<dyn Sealer>,
    store: SealedStore,
    /// Token held for this run; guarantees at most one sign-in per process
    held: Mutex<Option<String>>,
}

impl SessionManager {
    pub fn new(config: Arc<Config>, api: Arc<dyn VaultApi>, sealer: Arc<dyn Sealer>) -> Self {
        let store = SealedStore::new(Arc::clone(&sealer));
        Self {
            config,
            api,
            sealer,
            store,
            held: Mutex::new(None),
        }
    }

    /// Return a usable session token, signing in only when necessary
    pub async fn ensure_session(&self, force_refresh: bool) -> Result<String> {
        let mut held = self.held.lock().await;
        if let Some(token) = held.as_ref() {
            return Ok(token.clone());
        }

        let token = if force_refresh || self.persisted_is_stale() {
            self.sign_in().await?
        } else {
            match self.read_persisted().await {
                Ok(token) => {
                    // Sliding renewal: reuse refreshes the timestamp without
                    // changing the sealed content.
                    if let Err(e) = touch(&self.config.session_path) {
                        warn!("Could not refresh session timestamp: {}", e);
                    }
                    debug!("Reusing cached session");
                    token
                }
                Err(e) => {
                    warn!("Cached session unreadable, signing in again: {}", e);
                    self.sign_in().await?
                }
            }
        };

        *held = Some(token.clone());
        Ok(token)
    }

    /// Whether the persisted session is absent or past the TTL
    fn persisted_is_stale(&self) -> bool {
        let Ok(metadata) = std::fs::metadata(&self.config.session_path) else {
            return true;
        };
        let Ok(modified) = metadata.modified() else {
            return true;
        };
        let age = modified.elapsed().unwrap_or(Duration::ZERO);
        age >= SESSION_TTL
    }

    async fn read_persisted(&self) -> Result<String> {
        let bytes = self.store.read(&self.config.session_path).await?;
        let record: SessionRecord = serde_json::from_slice(&bytes)
            .map_err(|e| Error::store(format!("Corrupt session record: {}", e)))?;
        Ok(record.token)
    }

    /// Exchange the sealed credentials for a fresh token and persist it
    async fn sign_in(&self) -> Result<String> {
        info!("Signing in to the vault");

        let master = Zeroizing::new(read_secret_utf8(
            &self.store,
            &self.config.master_secret_path,
        )
        .await?);
        let secret_key = Zeroizing::new(read_secret_utf8(
            &self.store,
            &self.config.secret_key_path,
        )
        .await?);

        let token = self
            .api
            .sign_in(
                master.trim(),
                &self.config.email,
                secret_key.trim(),
                &self.config.subdomain,
            )
            .await?;

        let record = SessionRecord {
            token: token.clone(),
            created_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| Error::store(format!("Failed to encode session record: {}", e)))?;
        self.store.write(&self.config.session_path, &bytes).await?;

        Ok(token)
    }

    /// Delete the persisted session and revoke cached key material.
    /// Idempotent: a missing session file is not an error.
    pub async fn forget(&self) -> Result<()> {
        self.held.lock().await.take();

        match tokio::fs::remove_file(&self.config.session_path).await {
            Ok(()) => debug!("Removed persisted session"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::store(format!(
                    "Failed to remove session {}: {}",
                    self.config.session_path.display(),
                    e
                )))
            }
        }

        self.sealer.revoke_cached_key();
        Ok(())
    }
}

async fn read_secret_utf8(store: &SealedStore, path: &Path) -> Result<String> {
    let bytes = store.read(path).await.map_err(|e| {
        Error::config(format!(
            "Missing sealed credential {} (run `mimir init`): {}",
            path.display(),
            e
        ))
    })?;
    String::from_utf8(bytes)
        .map_err(|_| Error::store(format!("Credential {} is not UTF-8", path.display())))
}

/// Refresh a file's modification time to now
fn touch(path: &Path) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new().append(true).open(path)?;
    file.set_modified(SystemTime::now())
}
