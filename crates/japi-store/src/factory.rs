//! View-shape denormalization back to canonical records.

use anyhow::{bail, Result};
use serde_json::Value;

use japi_types::ResourceRecord;

/// Converts a flat, view-shaped resource value back into a canonical record
/// for the write path. The inverse of `ResourceView::snapshot`.
pub trait ResourceFactory: Send + Sync {
    fn to_record(&self, resource: &Value) -> Result<ResourceRecord>;
}

/// Default factory for the flat view shape: `id`/`type`/`links`/
/// `relationships` are reserved keys, everything else is an attribute.
/// Keys stay camel-cased; hyphenation back to wire casing is the
/// transport's concern.
#[derive(Debug, Default)]
pub struct ViewShapeFactory;

impl ResourceFactory for ViewShapeFactory {
    fn to_record(&self, resource: &Value) -> Result<ResourceRecord> {
        let Some(object) = resource.as_object() else {
            bail!("resource is not an object");
        };

        let mut record = ResourceRecord::default();
        for (key, value) in object {
            match key.as_str() {
                "id" => {
                    record.id = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        _ => bail!("invalid resource id: {value}"),
                    };
                }
                "type" => {
                    record.resource_type = value.as_str().unwrap_or_default().to_string();
                }
                "links" => {
                    if let Value::Object(links) = value {
                        record.links = links.clone();
                    }
                }
                "relationships" => {
                    if let Value::Object(_) = value {
                        record.relationships = serde_json::from_value(value.clone())?;
                    }
                }
                _ => {
                    record.attributes.insert(key.clone(), value.clone());
                }
            }
        }

        if record.resource_type.is_empty() {
            bail!("resource has no type");
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_view_values_unfold_into_records() {
        let factory = ViewShapeFactory;

        let record = factory
            .to_record(&json!({
                "id": "17",
                "type": "dog",
                "name": "Doge",
                "coolDoggoName": "DOGE the cool dog",
                "links": { "self": "/api/dog/17/" },
                "relationships": {
                    "owner": {
                        "data": { "id": "5", "type": "owner" },
                        "links": { "related": "/api/dog/17/owner/" },
                    },
                },
            }))
            .unwrap();

        assert_eq!(record.id, "17");
        assert_eq!(record.resource_type, "dog");
        assert_eq!(record.attributes.get("name"), Some(&json!("Doge")));
        assert_eq!(
            record.attributes.get("coolDoggoName"),
            Some(&json!("DOGE the cool dog"))
        );
        assert_eq!(record.self_link(), Some("/api/dog/17/"));
        assert!(record.relationships.contains_key("owner"));
        // Reserved keys never leak into attributes.
        assert!(!record.attributes.contains_key("relationships"));
    }

    #[test]
    fn a_type_is_required() {
        let factory = ViewShapeFactory;
        assert!(factory.to_record(&json!({ "id": "17" })).is_err());
        assert!(factory.to_record(&json!("nope")).is_err());
    }

    #[test]
    fn id_may_be_absent_for_creates() {
        let factory = ViewShapeFactory;
        let record = factory
            .to_record(&json!({ "type": "dog", "name": "Doge" }))
            .unwrap();
        assert!(record.id.is_empty());
    }
}
