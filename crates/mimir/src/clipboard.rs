//! Clipboard delivery with race-safe expiry
//!
//! Copying a secret arms a detached clear timer: a child process that
//! outlives this invocation, sleeps, and overwrites the clipboard with a
//! fixed sentinel. Cancellation is a generation token in a per-user file:
//! arming bumps the generation, and a timer whose generation is no longer
//! current abandons its clear silently. Only the most recently armed timer
//! ever clears.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use mimir_core::Config;
use tracing::debug;

/// What the clipboard holds after expiry: a visible marker, not emptiness
pub const CLEAR_SENTINEL: &str = "[cleared by mimir]";

/// The OS clipboard primitive
pub trait Clipboard {
    fn set(&mut self, text: &str) -> Result<()>;
}

/// arboard-backed system clipboard
pub struct SystemClipboard(arboard::Clipboard);

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("Could not open the system clipboard")?;
        Ok(Self(inner))
    }
}

impl Clipboard for SystemClipboard {
    fn set(&mut self, text: &str) -> Result<()> {
        self.0
            .set_text(text.to_string())
            .context("Could not write to the system clipboard")
    }
}

/// Copy `value` and arm the detached clear timer
pub fn copy_with_expiry(
    clipboard: &mut dyn Clipboard,
    config: &Config,
    value: &str,
    delay: Duration,
) -> Result<()> {
    clipboard.set(value)?;
    let generation = bump_generation(&config.clipboard_gen_path)?;
    spawn_clear_child(&config.clipboard_gen_path, generation, delay)?;
    debug!("Armed clipboard clear timer (generation {})", generation);
    Ok(())
}

/// Read the current timer generation; absent or unparsable means zero
pub fn current_generation(path: &Path) -> u64 {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Advance the timer generation, invalidating every earlier timer
pub fn bump_generation(path: &Path) -> Result<u64> {
    let next = current_generation(path) + 1;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    std::fs::write(path, next.to_string())
        .with_context(|| format!("Could not write {}", path.display()))?;
    Ok(next)
}

/// Spawn the detached child that performs the deferred clear. The child is
/// intentionally not waited on; arming must not block this process's exit.
fn spawn_clear_child(generation_path: &Path, generation: u64, delay: Duration) -> Result<()> {
    let exe = std::env::current_exe().context("Could not locate the mimir binary")?;
    Command::new(exe)
        .arg("clear-clipboard")
        .arg("--generation-file")
        .arg(generation_path)
        .arg("--generation")
        .arg(generation.to_string())
        .arg("--delay-secs")
        .arg(delay.as_secs().to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Could not spawn the clipboard clear timer")?;
    Ok(())
}

/// Body of the detached timer: sleep, then clear only if still the current
/// generation. Returns whether the clear happened.
pub async fn run_clear_timer(
    clipboard: &mut dyn Clipboard,
    generation_path: &Path,
    armed_generation: u64,
    delay: Duration,
) -> Result<bool> {
    tokio::time::sleep(delay).await;

    if current_generation(generation_path) != armed_generation {
        debug!(
            "Clear timer generation {} superseded, abandoning",
            armed_generation
        );
        return Ok(false);
    }

    clipboard.set(CLEAR_SENTINEL)?;
    debug!("Clipboard overwritten with sentinel");
    Ok(true)
}
