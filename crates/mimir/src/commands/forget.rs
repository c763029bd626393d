//! Forget the cached session and revoke cached key material

use std::sync::Arc;

use anyhow::Result;
use mimir_core::Config;

use crate::commands::build_resolver;
use crate::output;

pub async fn run(config: Arc<Config>) -> Result<()> {
    let resolver = build_resolver(&config)?;
    resolver.session().forget().await?;
    output::success("Session forgotten");
    Ok(())
}
