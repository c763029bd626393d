//! Template-aware field extraction over raw item payloads
//!
//! Each template kind knows where its well-known fields live; any other
//! field name is resolved by scanning the item's sections for a matching
//! label. A missing field is an empty outcome (`None`), never an error;
//! items that simply lack a field are tolerated.

use mimir_core::TemplateKind;
use serde_json::Value;

/// Resolve `field` out of an item payload for the given template kind
pub fn extract_field(kind: TemplateKind, payload: &Value, field: &str) -> Option<String> {
    match kind {
        TemplateKind::Login => match field {
            // username/password live on the flat field list by designation
            "username" | "password" => designation_lookup(payload, field),
            other => section_scan(payload, other),
        },
        TemplateKind::Password => match field {
            "password" => payload
                .pointer("/details/password")
                .and_then(scalar_to_string),
            other => section_scan(payload, other),
        },
    }
}

/// Find a flat detail field by its designation and return its value
fn designation_lookup(payload: &Value, designation: &str) -> Option<String> {
    payload
        .pointer("/details/fields")?
        .as_array()?
        .iter()
        .find(|f| f.get("designation").and_then(Value::as_str) == Some(designation))?
        .get("value")
        .and_then(scalar_to_string)
}

/// Scan every section's field list for a matching label
fn section_scan(payload: &Value, label: &str) -> Option<String> {
    payload
        .pointer("/details/sections")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("fields")?.as_array())
        .flatten()
        .find(|f| f.get("t").and_then(Value::as_str) == Some(label))?
        .get("v")
        .and_then(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
