//! Resolve a field (or one-time code) out of a titled item and deliver it

use std::sync::Arc;

use anyhow::Result;
use mimir_core::Config;

use crate::commands::build_resolver;
use crate::output::{self, DeliveryMode};

/// The field name that selects a live one-time code instead of a stored field
const TOTP_FIELD: &str = "totp";

pub async fn run(
    config: Arc<Config>,
    title: &str,
    field: &str,
    refresh: bool,
    mode: DeliveryMode,
) -> Result<()> {
    let resolver = build_resolver(&config)?;

    if field == TOTP_FIELD {
        // One-time codes are always live, never cached.
        let code = resolver.resolve_totp(title, refresh).await?;
        output::deliver(&config, &code, mode)?;
        return Ok(());
    }

    match resolver.resolve_field(title, field, refresh).await? {
        Some(value) => output::deliver(&config, &value, mode)?,
        // The item exists but lacks the field: a clean nothing-to-do outcome.
        None => output::warning(&format!("'{}' has no field '{}'", title, field)),
    }
    Ok(())
}
