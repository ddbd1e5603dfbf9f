//! Reactivity bridge: stable live views over canonical records.
//!
//! The bridge maps a cached record to exactly one live [`ResourceView`],
//! keyed by the record's identity (its `Arc` pointer), through a weak side
//! table: the bridge never keeps a view alive, and a view that is dropped
//! everywhere else is reclaimed and pruned on the next wrap.
//!
//! Views read and write through the shared record, so a field written on one
//! view is immediately observable on every other view of the same identity
//! and in the cache itself. Relationship accessors call back into the fetch
//! coordinator through a registered handler, reusing the same cache, sparse,
//! and inclusion policy as top-level fetches.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tracing::debug;

use japi_cache::SharedRecord;
use japi_types::Linkage;

/// Callback invoked when a relationship accessor resolves: receives the
/// relationship's linkage, its `related` link, and the accessor's query.
pub type RelationshipHandler = Arc<
    dyn Fn(Linkage, Option<String>, BTreeMap<String, String>) -> BoxFuture<'static, Option<FetchResult>>
        + Send
        + Sync,
>;

/// Result of a fetch: a single bridged view or an ordered sequence.
#[derive(Clone)]
pub enum FetchResult {
    One(Arc<ResourceView>),
    Many(Vec<Arc<ResourceView>>),
}

impl FetchResult {
    pub fn one(self) -> Option<Arc<ResourceView>> {
        match self {
            FetchResult::One(view) => Some(view),
            FetchResult::Many(_) => None,
        }
    }

    pub fn many(self) -> Option<Vec<Arc<ResourceView>>> {
        match self {
            FetchResult::Many(views) => Some(views),
            FetchResult::One(_) => None,
        }
    }
}

/// Identity-preserving view registry.
pub struct ReactivityBridge {
    // Keyed by the record's Arc pointer. A live view pins its record, so the
    // pointer cannot be reused while the entry is upgradable; dead entries
    // are pruned on every wrap.
    views: Mutex<HashMap<usize, Weak<ResourceView>>>,
    handler: RwLock<Option<RelationshipHandler>>,
}

impl ReactivityBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            views: Mutex::new(HashMap::new()),
            handler: RwLock::new(None),
        })
    }

    /// Return the live view for `record`'s identity, or construct one.
    ///
    /// `is_update` marks the wrap as a refresh of an existing view: the
    /// view's revision counter is bumped so observers can notice the change
    /// without a new allocation.
    pub fn wrap(self: &Arc<Self>, record: &SharedRecord, is_update: bool) -> Arc<ResourceView> {
        let key = Arc::as_ptr(record) as usize;
        let mut views = self.views.lock();
        views.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = views.get(&key).and_then(Weak::upgrade) {
            if is_update {
                existing.revision.fetch_add(1, Ordering::Relaxed);
            }
            return existing;
        }

        let view = Arc::new(ResourceView {
            record: record.clone(),
            bridge: self.clone(),
            revision: AtomicU64::new(0),
        });
        views.insert(key, Arc::downgrade(&view));
        view
    }

    /// Register the coordinator callback for relationship resolution.
    pub fn register_relationship_handler(&self, handler: RelationshipHandler) {
        *self.handler.write() = Some(handler);
    }

    fn relationship_handler(&self) -> Option<RelationshipHandler> {
        self.handler.read().clone()
    }

    /// Number of currently live views (prunes dead entries first).
    pub fn live_view_count(&self) -> usize {
        let mut views = self.views.lock();
        views.retain(|_, weak| weak.strong_count() > 0);
        views.len()
    }
}

/// A live, identity-stable view over a canonical record.
pub struct ResourceView {
    record: SharedRecord,
    bridge: Arc<ReactivityBridge>,
    revision: AtomicU64,
}

impl ResourceView {
    pub fn id(&self) -> String {
        self.record.read().id.clone()
    }

    pub fn resource_type(&self) -> String {
        self.record.read().resource_type.clone()
    }

    /// Read a single attribute.
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.record.read().attributes.get(name).cloned()
    }

    /// Write a single attribute through to the underlying record.
    ///
    /// Every view of the same identity (and the cache, while the record is a
    /// member) observes the new value. Keeps working after the record is
    /// removed from the cache; the record is then an inert local snapshot.
    pub fn set_attr(&self, name: &str, value: Value) {
        self.record
            .write()
            .attributes
            .insert(name.to_string(), value);
        self.revision.fetch_add(1, Ordering::Relaxed);
    }

    pub fn links(&self) -> Map<String, Value> {
        self.record.read().links.clone()
    }

    /// Observable change counter: bumped on attribute writes and on
    /// update-hinted wraps.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    /// The shared record backing this view.
    pub fn record(&self) -> SharedRecord {
        self.record.clone()
    }

    /// Flat value shape: attributes hoisted to the top level next to
    /// `id`/`type`/`links`, relationships carried under `relationships`.
    pub fn snapshot(&self) -> Value {
        let record = self.record.read();
        let mut out = Map::new();
        out.insert("id".to_string(), Value::String(record.id.clone()));
        out.insert(
            "type".to_string(),
            Value::String(record.resource_type.clone()),
        );
        if !record.links.is_empty() {
            out.insert("links".to_string(), Value::Object(record.links.clone()));
        }
        for (key, value) in &record.attributes {
            out.insert(key.clone(), value.clone());
        }
        if !record.relationships.is_empty() {
            out.insert(
                "relationships".to_string(),
                serde_json::to_value(&record.relationships).unwrap_or(Value::Null),
            );
        }
        Value::Object(out)
    }

    /// Resolve a relationship by name through the registered handler.
    ///
    /// Resolves to `None` when the relationship (or its linkage) is missing,
    /// no handler is registered, or the handler's fetch fails.
    pub async fn related(
        &self,
        name: &str,
        query: BTreeMap<String, String>,
    ) -> Option<FetchResult> {
        let (linkage, related) = {
            let record = self.record.read();
            let relationship = record.relationships.get(name)?;
            let linkage = relationship.data.clone()?;
            let related = relationship.related_link().map(str::to_string);
            (linkage, related)
        };

        let Some(handler) = self.bridge.relationship_handler() else {
            debug!(relationship = name, "no relationship handler registered");
            return None;
        };

        handler(linkage, related, query).await
    }
}
