//! Terminal output utilities and the secret delivery sink

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use mimir_core::Config;

use crate::clipboard::{self, SystemClipboard};

/// Where a resolved secret goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Verbatim to stdout, no trailing transformation
    Print,
    /// To the OS clipboard, with a detached self-clearing timer
    Clipboard,
}

/// Deliver a resolved secret.
///
/// Clipboard delivery arms a detached clear timer; arming bumps the current
/// generation so any earlier timer abandons its clear, and never blocks this
/// process's exit.
pub fn deliver(config: &Config, value: &str, mode: DeliveryMode) -> Result<()> {
    match mode {
        DeliveryMode::Print => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(value.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
        DeliveryMode::Clipboard => {
            let mut clip = SystemClipboard::new()?;
            clipboard::copy_with_expiry(
                &mut clip,
                config,
                value,
                Duration::from_secs(config.clipboard_clear_secs),
            )?;
            success(&format!(
                "Copied to clipboard; clears in {}s",
                config.clipboard_clear_secs
            ));
        }
    }
    Ok(())
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
