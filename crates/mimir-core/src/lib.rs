//! # mimir-core
//!
//! Core library for the Mimir CLI providing:
//! - Configuration file parsing (config.toml)
//! - The error taxonomy shared by every component
//! - Domain types for the vault item index and cached items

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{IndexEntry, Item, TemplateKind};
