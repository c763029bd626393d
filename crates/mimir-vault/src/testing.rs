//! Shared fixtures for the crate's tests: a generated age identity, a
//! configuration rooted in a temp directory, and a counting mock vault API.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use age::secrecy::ExposeSecret;
use async_trait::async_trait;
use mimir_core::{Config, Error, IndexEntry, Result};

use crate::api::VaultApi;
use crate::seal::AgeSealer;

/// Generate an age identity, write it into `dir`, and return
/// (recipient, identity file path)
pub(crate) fn write_test_identity(dir: &Path) -> (String, PathBuf) {
    let identity = age::x25519::Identity::generate();
    let path = dir.join("identity.txt");
    std::fs::write(&path, identity.to_string().expose_secret()).unwrap();
    (identity.to_public().to_string(), path)
}

pub(crate) fn test_sealer(dir: &Path) -> Arc<AgeSealer> {
    let (recipient, identity_file) = write_test_identity(dir);
    Arc::new(AgeSealer::new(recipient.parse().unwrap(), identity_file))
}

/// A full configuration rooted in `dir`
pub(crate) fn test_config(dir: &Path) -> Config {
    Config {
        email: "alice@example.com".into(),
        subdomain: "acme".into(),
        address: "https://acme.vault.example.com".into(),
        recipient: String::new(),
        identity_file: dir.join("identity.txt"),
        master_secret_path: dir.join("master.age"),
        secret_key_path: dir.join("secret-key.age"),
        index_path: dir.join("cache").join("index.age"),
        session_path: dir.join("cache").join("session.age"),
        items_dir: dir.join("cache").join("items"),
        clipboard_gen_path: dir.join("cache").join("clipboard.generation"),
        clipboard_clear_secs: 30,
    }
}

/// Mock vault API that counts every remote call
#[derive(Default)]
pub(crate) struct MockApi {
    pub entries: Vec<IndexEntry>,
    pub items: HashMap<String, serde_json::Value>,
    /// One-time code to return; `None` makes the fetch fail
    pub totp: Option<String>,
    pub sign_ins: AtomicUsize,
    pub lists: AtomicUsize,
    pub item_fetches: AtomicUsize,
    pub totp_fetches: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, uuid: &str, title: &str, template_id: &str) -> Self {
        self.entries.push(IndexEntry {
            uuid: uuid.into(),
            title: title.into(),
            template_id: template_id.into(),
        });
        self
    }

    pub fn with_item(mut self, uuid: &str, payload: serde_json::Value) -> Self {
        self.items.insert(uuid.into(), payload);
        self
    }

    pub fn with_totp(mut self, code: &str) -> Self {
        self.totp = Some(code.into());
        self
    }
}

#[async_trait]
impl VaultApi for MockApi {
    async fn sign_in(
        &self,
        _master_password: &str,
        _email: &str,
        _secret_key: &str,
        _subdomain: &str,
    ) -> Result<String> {
        let n = self.sign_ins.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{}", n))
    }

    async fn list_items(&self, token: &str) -> Result<Vec<IndexEntry>> {
        assert!(!token.is_empty(), "list_items called without a session");
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.clone())
    }

    async fn get_item(&self, uuid: &str, token: &str) -> Result<serde_json::Value> {
        assert!(!token.is_empty(), "get_item called without a session");
        self.item_fetches.fetch_add(1, Ordering::SeqCst);
        self.items
            .get(uuid)
            .cloned()
            .ok_or_else(|| Error::fetch(format!("no such item: {}", uuid)))
    }

    async fn get_totp(&self, uuid: &str, token: &str) -> Result<String> {
        assert!(!token.is_empty(), "get_totp called without a session");
        self.totp_fetches.fetch_add(1, Ordering::SeqCst);
        self.totp
            .clone()
            .ok_or_else(|| Error::fetch(format!("one-time code unavailable for {}", uuid)))
    }
}

/// Login-template payload: designation fields plus one custom section
pub(crate) fn login_payload() -> serde_json::Value {
    serde_json::json!({
        "uuid": "login-1",
        "templateUuid": "001",
        "details": {
            "fields": [
                {"designation": "username", "name": "username", "value": "alice"},
                {"designation": "password", "name": "password", "value": "s3cret"}
            ],
            "sections": [
                {
                    "title": "Extra",
                    "fields": [
                        {"t": "recovery code", "v": "rc-9999"},
                        {"t": "pin", "v": 1234}
                    ]
                }
            ]
        }
    })
}

/// Password-template payload: top-level password detail plus a section
pub(crate) fn password_payload() -> serde_json::Value {
    serde_json::json!({
        "uuid": "pw-1",
        "templateUuid": "005",
        "details": {
            "password": "xyz",
            "sections": [
                {
                    "fields": [
                        {"t": "hint", "v": "the usual"}
                    ]
                }
            ]
        }
    })
}
