//! Request addressing and fetch/update options.

use std::collections::BTreeMap;

/// How a `get` call addresses resources: one id or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestId {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId::One(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::One(id)
    }
}

impl From<Vec<String>> for RequestId {
    fn from(ids: Vec<String>) -> Self {
        RequestId::Many(ids)
    }
}

impl From<Vec<&str>> for RequestId {
    fn from(ids: Vec<&str>) -> Self {
        RequestId::Many(ids.into_iter().map(str::to_string).collect())
    }
}

/// Options accompanying a fetch.
///
/// `query` entries are forwarded to the transport as query parameters;
/// `link` supplies a collection URL for batch/array fetches; `included`
/// requests compound-document inclusion.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub query: BTreeMap<String, String>,
    pub link: Option<String>,
    pub included: Option<String>,
}

impl FetchOptions {
    /// A request is sparse iff any query key begins with the `fields` marker
    /// (e.g. `fields[dog]=name,age`).
    pub fn is_sparse(&self) -> bool {
        self.query.keys().any(|key| key.starts_with("fields"))
    }
}

/// Options for `update`: `partial` selects partial-patch vs. full-replace
/// (overlay onto the cached record) semantics. Defaults to partial.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions {
    pub partial: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { partial: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_detection_matches_fields_prefixed_query_keys() {
        let mut options = FetchOptions::default();
        assert!(!options.is_sparse());

        options
            .query
            .insert("fields[dog]".to_string(), "name,age".to_string());
        assert!(options.is_sparse());

        let mut other = FetchOptions::default();
        other.query.insert("sort".to_string(), "name".to_string());
        assert!(!other.is_sparse());
    }

    #[test]
    fn update_defaults_to_partial() {
        assert!(UpdateOptions::default().partial);
    }
}
