//! First-run setup
//!
//! Creates the config directory, generates (or reuses) the age sealing
//! identity, writes a config template with the recipient filled in, and
//! seals the master password and account secret key so later runs can sign
//! in without prompting.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use age::secrecy::ExposeSecret;
use anyhow::{Context, Result};
use mimir_core::Config;
use mimir_vault::{AgeSealer, SealedStore, Sealer};

use crate::output;

pub async fn run(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = match config_path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Could not create {}", config_dir.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&config_dir, fs::Permissions::from_mode(0o700)).ok();
    }

    let identity_path = config_dir.join("identity.txt");
    let identity = load_or_generate_identity(&identity_path, force)?;
    let recipient = identity.to_public();

    if config_path.exists() && !force {
        output::info(&format!(
            "Config already exists at {}, leaving it in place",
            config_path.display()
        ));
    } else {
        fs::write(&config_path, Config::template(&recipient.to_string()))
            .with_context(|| format!("Could not write {}", config_path.display()))?;
        output::success(&format!("Wrote config template to {}", config_path.display()));
    }

    seal_credentials(&config_dir, recipient, &identity_path, force).await?;

    output::info("Next: fill in account.email, account.subdomain, and vault.address");
    Ok(())
}

/// Reuse an existing identity unless forced; otherwise generate one and
/// store it with owner-only permissions
fn load_or_generate_identity(path: &Path, force: bool) -> Result<age::x25519::Identity> {
    if path.exists() && !force {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let identity = content
            .trim()
            .parse::<age::x25519::Identity>()
            .map_err(|e| anyhow::anyhow!("Invalid identity file {}: {}", path.display(), e))?;
        output::info(&format!("Reusing identity at {}", path.display()));
        return Ok(identity);
    }

    let identity = age::x25519::Identity::generate();
    fs::write(path, identity.to_string().expose_secret())
        .with_context(|| format!("Could not write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Could not restrict {}", path.display()))?;
    }
    output::success(&format!("Generated sealing identity at {}", path.display()));
    Ok(identity)
}

/// Prompt for the vault credentials and seal them next to the config
async fn seal_credentials(
    config_dir: &Path,
    recipient: age::x25519::Recipient,
    identity_path: &Path,
    force: bool,
) -> Result<()> {
    let master_path = config_dir.join("master.age");
    let secret_key_path = config_dir.join("secret-key.age");

    if master_path.exists() && secret_key_path.exists() && !force {
        output::info("Sealed credentials already present, skipping prompts");
        return Ok(());
    }

    let sealer: Arc<dyn Sealer> = Arc::new(AgeSealer::new(recipient, identity_path.to_path_buf()));
    let store = SealedStore::new(sealer);

    let master = rpassword::prompt_password("Master password: ")
        .context("Could not read the master password")?;
    if master.is_empty() {
        output::warning("Empty master password, skipping credential sealing");
        return Ok(());
    }
    let secret_key = rpassword::prompt_password("Account secret key: ")
        .context("Could not read the account secret key")?;

    store.write(&master_path, master.as_bytes()).await?;
    store.write(&secret_key_path, secret_key.as_bytes()).await?;

    output::success(&format!(
        "Sealed credentials at {} and {}",
        master_path.display(),
        secret_key_path.display()
    ));
    Ok(())
}
