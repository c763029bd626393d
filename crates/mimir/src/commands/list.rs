//! List every item title in the cached index

use std::sync::Arc;

use anyhow::Result;
use mimir_core::Config;

use crate::commands::build_resolver;

pub async fn run(config: Arc<Config>, refresh: bool) -> Result<()> {
    let resolver = build_resolver(&config)?;
    // Plain lines on stdout so the listing composes with other tools.
    for title in resolver.list_titles(refresh).await? {
        println!("{}", title);
    }
    Ok(())
}
