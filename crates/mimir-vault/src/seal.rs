//! Sealing collaborator: encrypt-for-recipient / decrypt-for-self
//!
//! Cached data never exists in plaintext at rest. Everything written by the
//! store is sealed to the configured age recipient and unsealed with the
//! identity file. The parsed identity is held in memory between unseals and
//! can be revoked, forcing the next unseal to re-read the identity file.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::RwLock;

use mimir_core::{Config, Error, Result};
use tracing::debug;
use zeroize::Zeroizing;

/// Seal/unseal operations every sealed blob goes through
pub trait Sealer: Send + Sync {
    /// Encrypt plaintext to the configured recipient
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt a sealed blob with the local identity
    fn unseal(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Drop any cached decryption-key material so a subsequent unseal
    /// requires re-reading the identity file
    fn revoke_cached_key(&self);
}

/// age x25519 implementation of [`Sealer`]
pub struct AgeSealer {
    recipient: age::x25519::Recipient,
    identity_file: PathBuf,
    /// Identity key material cached after the first unseal; zeroed on drop
    cached_key: RwLock<Option<Zeroizing<String>>>,
}

impl AgeSealer {
    /// Build a sealer for an explicit recipient and identity file
    pub fn new(recipient: age::x25519::Recipient, identity_file: PathBuf) -> Self {
        Self {
            recipient,
            identity_file,
            cached_key: RwLock::new(None),
        }
    }

    /// Build a sealer from the configured recipient and identity file
    pub fn from_config(config: &Config) -> Result<Self> {
        let recipient = config
            .recipient
            .parse::<age::x25519::Recipient>()
            .map_err(|e| Error::config(format!("Invalid sealing.recipient: {}", e)))?;

        Ok(Self::new(recipient, config.identity_file.clone()))
    }

    /// Load the identity, preferring the cached key material
    fn identity(&self) -> Result<age::x25519::Identity> {
        if let Some(key) = self.cached_key.read().expect("sealer lock poisoned").as_ref() {
            return parse_identity(key);
        }

        let content = std::fs::read_to_string(&self.identity_file).map_err(|e| {
            Error::store(format!(
                "Failed to read identity file {}: {}",
                self.identity_file.display(),
                e
            ))
        })?;
        let key = Zeroizing::new(content.trim().to_string());
        let identity = parse_identity(&key)?;

        *self.cached_key.write().expect("sealer lock poisoned") = Some(key);
        Ok(identity)
    }
}

fn parse_identity(key: &str) -> Result<age::x25519::Identity> {
    key.parse::<age::x25519::Identity>()
        .map_err(|e| Error::store(format!("Failed to parse age identity: {}", e)))
}

impl Sealer for AgeSealer {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let recipient: Box<dyn age::Recipient + Send> = Box::new(self.recipient.clone());
        let encryptor = age::Encryptor::with_recipients(vec![recipient])
            .ok_or_else(|| Error::store("No sealing recipient configured"))?;

        let mut sealed = Vec::new();
        let mut writer = encryptor
            .wrap_output(&mut sealed)
            .map_err(|e| Error::store(format!("Seal failed: {}", e)))?;
        writer
            .write_all(plaintext)
            .map_err(|e| Error::store(format!("Seal failed: {}", e)))?;
        writer
            .finish()
            .map_err(|e| Error::store(format!("Seal failed: {}", e)))?;

        Ok(sealed)
    }

    fn unseal(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let identity = self.identity()?;

        let decryptor = match age::Decryptor::new(ciphertext)
            .map_err(|e| Error::store(format!("Unseal failed: {}", e)))?
        {
            age::Decryptor::Recipients(d) => d,
            _ => {
                return Err(Error::store(
                    "Unexpected passphrase-sealed blob in the cache",
                ))
            }
        };

        let mut plaintext = Vec::new();
        let mut reader = decryptor
            .decrypt(std::iter::once(&identity as &dyn age::Identity))
            .map_err(|e| Error::store(format!("Unseal failed: {}", e)))?;
        reader
            .read_to_end(&mut plaintext)
            .map_err(|e| Error::store(format!("Unseal failed: {}", e)))?;

        Ok(plaintext)
    }

    fn revoke_cached_key(&self) {
        let mut cached = self.cached_key.write().expect("sealer lock poisoned");
        if cached.take().is_some() {
            debug!("Revoked cached identity key material");
        }
    }
}
