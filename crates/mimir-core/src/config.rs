//! Configuration file loading and parsing
//!
//! Configuration is read once at startup into an immutable [`Config`] value
//! that is passed into every component. No component reads ambient
//! environment state beyond the paths resolved here.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default clipboard clear delay in seconds
const DEFAULT_CLEAR_SECS: u64 = 30;

/// Raw on-disk configuration file shape
#[derive(Debug, Deserialize)]
struct ConfigFile {
    account: AccountSection,
    vault: VaultSection,
    sealing: SealingSection,
    #[serde(default)]
    cache: CacheSection,
    #[serde(default)]
    clipboard: ClipboardSection,
}

#[derive(Debug, Deserialize)]
struct AccountSection {
    #[serde(default)]
    email: String,
    #[serde(default)]
    subdomain: String,
}

#[derive(Debug, Deserialize)]
struct VaultSection {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct SealingSection {
    /// age recipient every cached blob is sealed to
    #[serde(default)]
    recipient: String,
    /// age identity file used to unseal
    identity_file: Option<PathBuf>,
    /// Sealed master password blob
    master_secret: Option<PathBuf>,
    /// Sealed account secret-key blob
    secret_key: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct CacheSection {
    /// Directory holding the sealed index, session, and item caches
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ClipboardSection {
    clear_secs: Option<u64>,
}

/// Loaded and validated Mimir configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Account email used for sign-in
    pub email: String,
    /// Account subdomain used for sign-in
    pub subdomain: String,
    /// Base address of the remote vault API
    pub address: String,
    /// age recipient cached blobs are sealed to
    pub recipient: String,
    /// age identity file used to unseal cached blobs
    pub identity_file: PathBuf,
    /// Sealed master password blob
    pub master_secret_path: PathBuf,
    /// Sealed account secret-key blob
    pub secret_key_path: PathBuf,
    /// Sealed item index cache
    pub index_path: PathBuf,
    /// Sealed session cache
    pub session_path: PathBuf,
    /// Per-item sealed cache directory
    pub items_dir: PathBuf,
    /// Clipboard clear-timer generation file
    pub clipboard_gen_path: PathBuf,
    /// Clipboard clear delay in seconds
    pub clipboard_clear_secs: u64,
}

impl Config {
    /// Default configuration file location (~/.config/mimir/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine the user config directory"))?;
        Ok(base.join("mimir").join("config.toml"))
    }

    /// Load configuration from the specified path or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let content = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(config_path.display().to_string())
            } else {
                Error::config(format!(
                    "Failed to read {}: {}",
                    config_path.display(),
                    e
                ))
            }
        })?;

        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", config_path.display(), e)))?;

        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = Self::from_file(file, &config_dir)?;
        debug!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    fn from_file(file: ConfigFile, config_dir: &Path) -> Result<Self> {
        // All four account/crypto inputs must be present before any
        // network or crypto operation is attempted.
        require("account.email", &file.account.email)?;
        require("account.subdomain", &file.account.subdomain)?;
        require("vault.address", &file.vault.address)?;
        require("sealing.recipient", &file.sealing.recipient)?;

        let cache_dir = match file.cache.dir {
            Some(dir) => expand_tilde(&dir)?,
            None => dirs::cache_dir()
                .ok_or_else(|| Error::config("Could not determine the user cache directory"))?
                .join("mimir"),
        };

        let or_default = |configured: Option<PathBuf>, default: PathBuf| -> Result<PathBuf> {
            match configured {
                Some(p) => expand_tilde(&p),
                None => Ok(default),
            }
        };

        Ok(Self {
            email: file.account.email,
            subdomain: file.account.subdomain,
            address: file.vault.address.trim_end_matches('/').to_string(),
            recipient: file.sealing.recipient,
            identity_file: or_default(
                file.sealing.identity_file,
                config_dir.join("identity.txt"),
            )?,
            master_secret_path: or_default(
                file.sealing.master_secret,
                config_dir.join("master.age"),
            )?,
            secret_key_path: or_default(
                file.sealing.secret_key,
                config_dir.join("secret-key.age"),
            )?,
            index_path: cache_dir.join("index.age"),
            session_path: cache_dir.join("session.age"),
            items_dir: cache_dir.join("items"),
            clipboard_gen_path: cache_dir.join("clipboard.generation"),
            clipboard_clear_secs: file
                .clipboard
                .clear_secs
                .unwrap_or(DEFAULT_CLEAR_SECS),
        })
    }

    /// Render a config file template for first-run setup
    pub fn template(recipient: &str) -> String {
        format!(
            r#"# Mimir configuration

[account]
# Account email used for sign-in
email = ""
# Account subdomain used for sign-in
subdomain = ""

[vault]
# Base address of the remote vault API
address = ""

[sealing]
# age recipient every cached blob is sealed to
recipient = "{recipient}"
# Uncomment to override the defaults next to this file:
# identity_file = "~/.config/mimir/identity.txt"
# master_secret = "~/.config/mimir/master.age"
# secret_key = "~/.config/mimir/secret-key.age"

[cache]
# dir = "~/.cache/mimir"

[clipboard]
# Seconds before the clipboard is overwritten after a copy
clear_secs = 30
"#
        )
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(format!("Missing required field: {}", field)));
    }
    Ok(())
}

/// Expand a leading `~` to the user's home directory
fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Ok(stripped) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir()
        .ok_or_else(|| Error::config("Could not determine the home directory"))?;
    Ok(home.join(stripped))
}
