//! Orchestration: title → index lookup → item → field
//!
//! The resolver wires the session manager, cache repository, and field
//! extractor together. Duplicate titles resolve to the first index match;
//! one-time codes bypass the item cache entirely because a cached code
//! would be actively wrong.

use std::sync::Arc;

use mimir_core::{Config, Error, IndexEntry, Item, Result, TemplateKind};
use tracing::debug;

use crate::api::VaultApi;
use crate::cache::CacheRepository;
use crate::extract;
use crate::seal::Sealer;
use crate::session::SessionManager;
use crate::store::SealedStore;

pub struct Resolver {
    api: Arc<dyn VaultApi>,
    session: Arc<SessionManager>,
    cache: CacheRepository,
}

impl Resolver {
    /// Wire the full stack over one configuration
    pub fn new(config: Arc<Config>, api: Arc<dyn VaultApi>, sealer: Arc<dyn Sealer>) -> Self {
        let store = SealedStore::new(Arc::clone(&sealer));
        let session = Arc::new(SessionManager::new(
            Arc::clone(&config),
            Arc::clone(&api),
            sealer,
        ));
        let cache = CacheRepository::new(
            config,
            Arc::clone(&api),
            Arc::clone(&session),
            store,
        );
        Self {
            api,
            session,
            cache,
        }
    }

    /// The session manager, for the forget surface
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Resolve a named field out of the item with the given title.
    /// `Ok(None)` means the item exists but lacks the field.
    pub async fn resolve_field(
        &self,
        title: &str,
        field: &str,
        force_refresh: bool,
    ) -> Result<Option<String>> {
        let entry = self.find_entry(title, force_refresh).await?;

        // An unknown template has no extractor; surface that before any
        // item fetch.
        let kind = TemplateKind::from_id(&entry.template_id)
            .ok_or_else(|| Error::unsupported_template(&entry.template_id))?;

        let payload = self.cache.item(&entry.uuid, force_refresh).await?;
        let item = Item {
            uuid: entry.uuid,
            template_id: entry.template_id,
            payload,
        };

        debug!("Extracting '{}' from item {}", field, item.uuid);
        Ok(extract::extract_field(kind, &item.payload, field))
    }

    /// Resolve a live one-time code for the item with the given title
    pub async fn resolve_totp(&self, title: &str, force_refresh: bool) -> Result<String> {
        let entry = self.find_entry(title, force_refresh).await?;
        let token = self.session.ensure_session(force_refresh).await?;
        self.api.get_totp(&entry.uuid, &token).await
    }

    /// All item titles, sorted case-insensitively
    pub async fn list_titles(&self, force_refresh: bool) -> Result<Vec<String>> {
        let mut titles: Vec<String> = self
            .cache
            .index(force_refresh)
            .await?
            .into_iter()
            .map(|e| e.title)
            .collect();
        titles.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        Ok(titles)
    }

    /// Exact title match; the first index entry wins when titles collide
    async fn find_entry(&self, title: &str, force_refresh: bool) -> Result<IndexEntry> {
        self.cache
            .index(force_refresh)
            .await?
            .into_iter()
            .find(|e| e.title == title)
            .ok_or_else(|| Error::not_found(title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{login_payload, password_payload, test_config, test_sealer, MockApi};
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;

    async fn resolver(dir: &std::path::Path, api: Arc<MockApi>) -> Resolver {
        let sealer = test_sealer(dir);
        let config = Arc::new(test_config(dir));
        let store = SealedStore::new(sealer.clone() as Arc<dyn Sealer>);
        store
            .write(&config.master_secret_path, b"master")
            .await
            .unwrap();
        store
            .write(&config.secret_key_path, b"key")
            .await
            .unwrap();
        Resolver::new(config, api, sealer)
    }

    #[tokio::test]
    async fn test_login_field_dispatch() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::new()
                .with_entry("u1", "GitHub", "001")
                .with_item("u1", login_payload()),
        );
        let r = resolver(dir.path(), api).await;

        let value = r.resolve_field("GitHub", "username", false).await.unwrap();
        assert_eq!(value.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_password_template_dispatch() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::new()
                .with_entry("u2", "WiFi", "005")
                .with_item("u2", password_payload()),
        );
        let r = resolver(dir.path(), api).await;

        let value = r.resolve_field("WiFi", "password", false).await.unwrap();
        assert_eq!(value.as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn test_missing_field_is_empty() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::new()
                .with_entry("u1", "GitHub", "001")
                .with_item("u1", login_payload()),
        );
        let r = resolver(dir.path(), api).await;

        let value = r.resolve_field("GitHub", "oops", false).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_unknown_title_is_not_found_and_fetches_no_item() {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockApi::new().with_entry("u1", "GitHub", "001"));
        let r = resolver(dir.path(), api.clone()).await;

        let err = r
            .resolve_field("NoSuchItem", "password", false)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(api.item_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_template_fetches_no_item() {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockApi::new().with_entry("u9", "Server", "110"));
        let r = resolver(dir.path(), api.clone()).await;

        let err = r.resolve_field("Server", "password", false).await.unwrap_err();

        assert!(matches!(err, Error::UnsupportedTemplate { .. }));
        assert_eq!(api.item_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_titles_first_match_wins() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::new()
                .with_entry("u1", "GitHub", "001")
                .with_entry("u2", "GitHub", "005")
                .with_item("u1", login_payload()),
        );
        let r = resolver(dir.path(), api).await;

        let value = r.resolve_field("GitHub", "password", false).await.unwrap();
        assert_eq!(value.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_totp_bypasses_item_cache() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::new()
                .with_entry("u1", "GitHub", "001")
                .with_totp("123456"),
        );
        let r = resolver(dir.path(), api.clone()).await;

        let code = r.resolve_totp("GitHub", false).await.unwrap();
        assert_eq!(code, "123456");
        assert_eq!(api.item_fetches.load(Ordering::SeqCst), 0);
        assert_eq!(api.totp_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_totp_failure_is_fetch_error() {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockApi::new().with_entry("u1", "GitHub", "001"));
        let r = resolver(dir.path(), api).await;

        let err = r.resolve_totp("GitHub", false).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_listing_order_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let api = Arc::new(
            MockApi::new()
                .with_entry("u1", "Zebra", "001")
                .with_entry("u2", "apple", "001")
                .with_entry("u3", "Mango", "001"),
        );
        let r = resolver(dir.path(), api).await;

        let titles = r.list_titles(false).await.unwrap();
        assert_eq!(titles, vec!["apple", "Mango", "Zebra"]);
    }
}
