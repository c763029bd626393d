//! Command implementations

pub mod clear;
pub mod forget;
pub mod get;
pub mod init;
pub mod list;

use std::sync::Arc;

use mimir_core::Config;
use mimir_vault::{AgeSealer, HttpVaultApi, Resolver, Sealer, VaultApi};

/// Wire the resolver stack over the loaded configuration
pub(crate) fn build_resolver(config: &Arc<Config>) -> mimir_core::Result<Resolver> {
    let api: Arc<dyn VaultApi> = Arc::new(HttpVaultApi::new(config)?);
    let sealer: Arc<dyn Sealer> = Arc::new(AgeSealer::from_config(config)?);
    Ok(Resolver::new(Arc::clone(config), api, sealer))
}
