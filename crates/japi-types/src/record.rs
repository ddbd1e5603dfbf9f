//! Canonical resource types.
//!
//! These types mirror the JSON:API resource object shape after normalization:
//! string-typed ids, camel-cased attribute keys, and relationship linkages
//! preserved next to their `related`/`self` links.
//!
//! ## Design Principles
//!
//! 1. **String ids everywhere**: ids are compared as strings throughout, even
//!    when the wire value is numeric-looking. Deserialization stringifies
//!    numeric ids at the boundary.
//!
//! 2. **Tolerant deserialization**: unknown wire keys (`meta`, vendor
//!    extensions) are ignored rather than rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A typed reference to a resource: `{type, id}` without attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(deserialize_with = "id_string")]
    pub id: String,

    #[serde(rename = "type")]
    pub resource_type: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
        }
    }
}

/// Relationship linkage: a single reference or an ordered sequence of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    // Many must come first: an untagged array would otherwise never be tried.
    Many(Vec<ResourceIdentifier>),
    One(ResourceIdentifier),
}

/// A named relationship on a resource: linkage plus accompanying links
/// (`related`, `self`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub links: Map<String, Value>,
}

impl Relationship {
    /// The `related` link for this relationship, if present.
    pub fn related_link(&self) -> Option<&str> {
        self.links.get("related").and_then(Value::as_str)
    }
}

/// The canonical, cache-owned representation of a resource at a `(type, id)`.
///
/// Attribute keys are camel-cased; nested objects and array elements are
/// recursively camel-cased as well. Relationship names are camel-cased but
/// their linkage payloads are preserved structurally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,

    #[serde(rename = "type", default)]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub links: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl ResourceRecord {
    /// The record's `links.self` URL, if present.
    pub fn self_link(&self) -> Option<&str> {
        self.links.get("self").and_then(Value::as_str)
    }

    /// Merge another record's fields into this one, field by field.
    ///
    /// Top-level overwrite: nested structures are replaced wholesale, never
    /// deep-merged. Sections absent from the incoming record (empty maps)
    /// leave the existing section untouched, so merging a later full fetch
    /// over a partial snapshot only replaces what the server actually sent.
    pub fn merge_from(&mut self, incoming: ResourceRecord) {
        if !incoming.id.is_empty() {
            self.id = incoming.id;
        }
        if !incoming.resource_type.is_empty() {
            self.resource_type = incoming.resource_type;
        }
        if !incoming.attributes.is_empty() {
            self.attributes = incoming.attributes;
        }
        if !incoming.links.is_empty() {
            self.links = incoming.links;
        }
        if !incoming.relationships.is_empty() {
            self.relationships = incoming.relationships;
        }
    }
}

/// Primary payload of a wire response: a single resource or a sequence.
///
/// Values are raw wire objects; keys are still hyphenated until normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    // Many must come first for the same untagged-ordering reason as Linkage.
    Many(Vec<Value>),
    One(Value),
}

/// A wire-format response document: primary `data` plus an optional
/// compound-document `included` sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub data: PrimaryData,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<Value>>,
}

/// Accept wire ids as strings or numbers; compare as strings thereafter.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "invalid resource id: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with(attributes: Value) -> ResourceRecord {
        serde_json::from_value(json!({
            "id": "17",
            "type": "dog",
            "attributes": attributes,
            "links": { "self": "/api/dog/17/" },
        }))
        .unwrap()
    }

    #[test]
    fn numeric_wire_ids_are_stringified() {
        let record: ResourceRecord =
            serde_json::from_value(json!({ "id": 17, "type": "dog" })).unwrap();
        assert_eq!(record.id, "17");

        let ident: ResourceIdentifier =
            serde_json::from_value(json!({ "id": 5, "type": "owner" })).unwrap();
        assert_eq!(ident.id, "5");
    }

    #[test]
    fn linkage_deserializes_one_and_many() {
        let one: Linkage = serde_json::from_value(json!({ "id": "5", "type": "owner" })).unwrap();
        assert_eq!(one, Linkage::One(ResourceIdentifier::new("owner", "5")));

        let many: Linkage = serde_json::from_value(json!([
            { "id": "1", "type": "leg" },
            { "id": "2", "type": "leg" },
        ]))
        .unwrap();
        match many {
            Linkage::Many(idents) => assert_eq!(idents.len(), 2),
            Linkage::One(_) => panic!("expected Many"),
        }
    }

    #[test]
    fn merge_replaces_nested_structures_wholesale() {
        let mut existing = record_with(json!({ "name": "Doge", "age": "3" }));
        let incoming = record_with(json!({ "name": "Lucky" }));

        existing.merge_from(incoming);

        // Attributes are replaced as a unit, not key-merged.
        assert_eq!(existing.attributes.get("name"), Some(&json!("Lucky")));
        assert!(existing.attributes.get("age").is_none());
    }

    #[test]
    fn merge_preserves_sections_absent_from_incoming() {
        let mut existing = record_with(json!({ "name": "Doge" }));
        let incoming = ResourceRecord {
            id: "17".to_string(),
            resource_type: "dog".to_string(),
            ..Default::default()
        };

        existing.merge_from(incoming);

        assert_eq!(existing.attributes.get("name"), Some(&json!("Doge")));
        assert_eq!(existing.self_link(), Some("/api/dog/17/"));
    }

    #[test]
    fn document_accepts_single_and_array_primary_data() {
        let single: Document =
            serde_json::from_value(json!({ "data": { "id": "17", "type": "dog" } })).unwrap();
        assert!(matches!(single.data, PrimaryData::One(_)));

        let many: Document = serde_json::from_value(json!({
            "data": [{ "id": "1", "type": "leg" }],
            "included": [{ "id": "17", "type": "dog" }],
        }))
        .unwrap();
        assert!(matches!(many.data, PrimaryData::Many(_)));
        assert_eq!(many.included.unwrap().len(), 1);
    }
}
