//! Error types for mimir-core
//!
//! Every failure the tool can hit falls into one of these kinds. All of them
//! abort the current invocation; none of them is retried automatically,
//! since silent retries against an authentication endpoint are dangerous.

use thiserror::Error;

/// Result type alias using mimir-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Mimir
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}\nRun `mimir init` to create one")]
    ConfigNotFound { path: String },

    /// Missing or invalid configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Sign-in rejected by the vault
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Index, item, or one-time-code retrieval failed
    #[error("Vault request failed: {message}")]
    Fetch { message: String },

    /// Seal/unseal or I/O failure on the local cache
    #[error("Cache store error: {message}")]
    Store { message: String },

    /// Requested title has no matching index entry
    #[error("No item titled '{title}' in the vault index")]
    NotFound { title: String },

    /// Item template has no extractor variant
    #[error("Item uses unsupported template '{template_id}'")]
    UnsupportedTemplate { template_id: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a title-not-found error
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
        }
    }

    /// Create an unsupported template error
    pub fn unsupported_template(template_id: impl Into<String>) -> Self {
        Self::UnsupportedTemplate {
            template_id: template_id.into(),
        }
    }

    /// Whether this error is a clean "nothing matched" outcome rather than an
    /// operational failure. Callers report these without an error trace.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::UnsupportedTemplate { .. }
        )
    }
}
