//! # mimir-vault
//!
//! The session and cache subsystem behind the Mimir CLI:
//! - [`seal`]: encrypt-for-recipient / decrypt-for-self over age
//! - [`store`]: sealed-blob read/write primitive over a filesystem path
//! - [`api`]: the remote vault API collaborator
//! - [`session`]: authentication token lifecycle with TTL-based staleness
//! - [`cache`]: encrypted local mirror of the item index and item payloads
//! - [`extract`]: template-aware field extraction over raw item payloads
//! - [`resolver`]: title → index → item → field orchestration

pub mod api;
pub mod cache;
pub mod extract;
pub mod resolver;
pub mod seal;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpVaultApi, VaultApi};
pub use cache::CacheRepository;
pub use resolver::Resolver;
pub use seal::{AgeSealer, Sealer};
pub use session::{SessionManager, SESSION_TTL};
pub use store::SealedStore;
