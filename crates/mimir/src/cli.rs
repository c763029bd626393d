//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Mimir - encrypted local cache for a remote secrets vault
///
/// With no arguments, lists every item title. With a title, copies that
/// item's password. With a title and a field name, copies that field; the
/// literal field `totp` fetches a live one-time code.
#[derive(Parser, Debug)]
#[command(name = "mimir")]
#[command(author, version, about)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Item title to resolve
    pub title: Option<String>,

    /// Field to resolve (default: password); `totp` fetches a one-time code
    pub field: Option<String>,

    /// Bypass the local cache and refetch from the vault
    #[arg(short, long, global = true)]
    pub refresh: bool,

    /// Print the value to stdout instead of copying to the clipboard
    #[arg(short, long)]
    pub print: bool,

    /// Forget the cached session and revoke cached key material, then exit
    #[arg(long)]
    pub forget: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file (default: ~/.config/mimir/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// First-run setup: generate a sealing identity and a config template
    Init(InitArgs),

    /// Internal: clear the clipboard after a delay if still the newest copy
    #[command(hide = true)]
    ClearClipboard(ClearClipboardArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite existing identity, config template, and sealed credentials
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ClearClipboardArgs {
    /// Generation file this timer checks before clearing
    #[arg(long)]
    pub generation_file: PathBuf,

    /// Clear-timer generation this instance was armed with
    #[arg(long)]
    pub generation: u64,

    /// Seconds to wait before clearing
    #[arg(long)]
    pub delay_secs: u64,
}
