//! Domain types for the vault item index and cached items

use serde::{Deserialize, Serialize};

/// Template identifier for login-style items
const TEMPLATE_LOGIN: &str = "001";

/// Template identifier for password-style items
const TEMPLATE_PASSWORD: &str = "005";

/// One entry of the locally cached item index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique item identifier
    pub uuid: String,
    /// Item title as shown in the vault
    pub title: String,
    /// Template identifier determining the item's field layout
    pub template_id: String,
}

/// A cached vault item: identifier, template, and the raw payload the
/// extractor projects fields out of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub uuid: String,
    pub template_id: String,
    pub payload: serde_json::Value,
}

/// Closed set of item templates the field extractor understands
///
/// Unknown template identifiers map to `None` so that callers surface an
/// explicit unsupported-template outcome instead of a dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Login items: username/password designations plus custom sections
    Login,
    /// Password items: a single top-level password detail plus sections
    Password,
}

impl TemplateKind {
    /// Map a wire template identifier to a known template kind
    pub fn from_id(template_id: &str) -> Option<Self> {
        match template_id {
            TEMPLATE_LOGIN => Some(Self::Login),
            TEMPLATE_PASSWORD => Some(Self::Password),
            _ => None,
        }
    }
}
