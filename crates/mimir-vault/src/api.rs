//! Remote vault API collaborator
//!
//! The vault service is a black box behind [`VaultApi`]: a sign-in exchange
//! plus item listing, item retrieval, and one-time-code retrieval. The HTTP
//! implementation talks to the configured address; tests substitute mocks.
//! Timeout behavior belongs to the HTTP client; the resolver imposes none
//! of its own beyond the session TTL policy.

use async_trait::async_trait;
use mimir_core::{Config, Error, IndexEntry, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Remote timeout delegated to the HTTP client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the remote vault service must provide
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Exchange credentials for a session token
    async fn sign_in(
        &self,
        master_password: &str,
        email: &str,
        secret_key: &str,
        subdomain: &str,
    ) -> Result<String>;

    /// List every item's summary (uuid, title, template)
    async fn list_items(&self, token: &str) -> Result<Vec<IndexEntry>>;

    /// Fetch one item's full JSON document
    async fn get_item(&self, uuid: &str, token: &str) -> Result<serde_json::Value>;

    /// Fetch a live one-time code for an item
    async fn get_totp(&self, uuid: &str, token: &str) -> Result<String>;
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    master_password: &'a str,
    secret_key: &'a str,
    subdomain: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    token: String,
}

#[derive(Deserialize)]
struct ListEntry {
    uuid: String,
    #[serde(rename = "templateUuid", default)]
    template_uuid: String,
    #[serde(default)]
    overview: Overview,
}

#[derive(Deserialize, Default)]
struct Overview {
    #[serde(default)]
    title: String,
}

/// reqwest-backed implementation of [`VaultApi`]
pub struct HttpVaultApi {
    client: reqwest::Client,
    address: String,
}

impl HttpVaultApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            address: config.address.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

#[async_trait]
impl VaultApi for HttpVaultApi {
    async fn sign_in(
        &self,
        master_password: &str,
        email: &str,
        secret_key: &str,
        subdomain: &str,
    ) -> Result<String> {
        let request = SignInRequest {
            email,
            master_password,
            secret_key,
            subdomain,
        };

        let response = self
            .client
            .post(self.url("/v1/auth/signin"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::auth(format!("Sign-in request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::auth(format!("Sign-in rejected by the vault ({})", status)));
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Malformed sign-in response: {}", e)))?;

        debug!("Signed in as {} ({})", email, subdomain);
        Ok(body.token)
    }

    async fn list_items(&self, token: &str) -> Result<Vec<IndexEntry>> {
        let response = self
            .client
            .get(self.url("/v1/items"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Item listing failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("Item listing rejected ({})", status)));
        }

        let entries: Vec<ListEntry> = response
            .json()
            .await
            .map_err(|e| Error::fetch(format!("Malformed item listing: {}", e)))?;

        debug!("Listed {} vault items", entries.len());
        Ok(entries
            .into_iter()
            .map(|e| IndexEntry {
                uuid: e.uuid,
                title: e.overview.title,
                template_id: e.template_uuid,
            })
            .collect())
    }

    async fn get_item(&self, uuid: &str, token: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.url(&format!("/v1/items/{}", uuid)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Item fetch failed for {}: {}", uuid, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!(
                "Item fetch rejected for {} ({})",
                uuid, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::fetch(format!("Malformed item document for {}: {}", uuid, e)))
    }

    async fn get_totp(&self, uuid: &str, token: &str) -> Result<String> {
        let response = self
            .client
            .get(self.url(&format!("/v1/items/{}/totp", uuid)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("One-time-code fetch failed for {}: {}", uuid, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!(
                "One-time-code fetch rejected for {} ({})",
                uuid, status
            )));
        }

        let code = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Malformed one-time code for {}: {}", uuid, e)))?;

        Ok(code.trim().to_string())
    }
}
