//! Wire-format resource normalization.
//!
//! Converts a raw JSON:API resource object into a canonical
//! [`ResourceRecord`]: every key in the object graph is renamed from
//! hyphen-separated to camel-case, recursively, including objects nested
//! inside arrays. Scalars and non-object array elements are left untouched.
//!
//! All functions here are pure and allocate fresh structures; the input value
//! is never aliased.
//!
//! # Example
//!
//! ```ignore
//! use japi_types::normalize::normalize;
//!
//! let record = normalize(&raw)?;
//! assert_eq!(record.attributes["coolDoggoName"], "DOGE the cool dog");
//! ```

use anyhow::{anyhow, bail, Result};
use serde_json::Value;

use crate::record::ResourceRecord;

/// Rename a single key from hyphen-separated to camel-case.
///
/// A hyphen followed by a lowercase letter or digit collapses to the
/// uppercased character; any other hyphen is preserved as-is.
pub fn camelize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            match chars.peek() {
                Some(&next) if next.is_ascii_lowercase() || next.is_ascii_digit() => {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Rename a single key from camel-case back to hyphen-separated.
pub fn hyphenate(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively camel-case every key in a JSON value graph.
pub fn camelize_keys(value: &Value) -> Value {
    rename_keys(value, camelize)
}

/// Recursively hyphenate every key in a JSON value graph.
pub fn hyphenate_keys(value: &Value) -> Value {
    rename_keys(value, hyphenate)
}

fn rename_keys(value: &Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (rename(k), rename_keys(v, rename)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| rename_keys(item, rename)).collect())
        }
        scalar => scalar.clone(),
    }
}

/// Convert a wire-format resource object into a canonical [`ResourceRecord`].
///
/// Hoists `id`/`type`/`links`, camel-cases attribute keys and relationship
/// names recursively, and preserves relationship linkage payloads. Numeric
/// wire ids are stringified.
pub fn normalize(raw: &Value) -> Result<ResourceRecord> {
    if !raw.is_object() {
        bail!("resource payload is not an object");
    }

    let record: ResourceRecord = serde_json::from_value(camelize_keys(raw))
        .map_err(|e| anyhow!("malformed resource payload: {e}"))?;

    if record.resource_type.is_empty() {
        bail!("resource payload has no type");
    }

    Ok(record)
}

/// Convert a canonical record back to its wire shape (hyphenated keys).
pub fn denormalize(record: &ResourceRecord) -> Result<Value> {
    let value = serde_json::to_value(record)?;
    Ok(hyphenate_keys(&value))
}
