//! Hidden subcommand run by the detached clipboard clear timer

use std::time::Duration;

use anyhow::Result;

use crate::cli::ClearClipboardArgs;
use crate::clipboard::{self, SystemClipboard};

pub async fn run(args: &ClearClipboardArgs) -> Result<()> {
    let mut clip = SystemClipboard::new()?;
    clipboard::run_clear_timer(
        &mut clip,
        &args.generation_file,
        args.generation,
        Duration::from_secs(args.delay_secs),
    )
    .await?;
    Ok(())
}
