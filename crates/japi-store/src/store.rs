//! ResourceStore - fetch coordination over the resource cache.
//!
//! This is the main entry point. It decides cache-hit vs. fetch, applies the
//! sparse-fieldset policy, resolves batch identifier lists, merges
//! compound-document includes, and drives the reactivity bridge so that
//! repeated lookups of the same `(type, id)` resolve to the same live view.
//!
//! # Example
//!
//! ```ignore
//! use japi_store::ResourceStore;
//!
//! let store = ResourceStore::new(transport);
//!
//! // First call fetches; later calls for the same key return the same
//! // view identity without touching the network.
//! let dog = store.get("dog", Some("17".into()), None).await;
//! let again = store.get("dog", Some("17".into()), None).await;
//! ```

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::Value;
use tracing::debug;

use japi_cache::ResourceCache;
use japi_transport::ResourceTransport;
use japi_types::{
    normalize, FetchOptions, Linkage, PrimaryData, RequestId, ResourceRecord, UpdateOptions,
};

use crate::bridge::{FetchResult, ReactivityBridge, ResourceView};
use crate::factory::{ResourceFactory, ViewShapeFactory};

/// Fetch coordinator: cache-first resource access with identity-stable views.
///
/// All operations are async but cooperative; the only suspension point is
/// the transport call. Cache mutation is synchronous and atomic, so no
/// invariant is ever observable half-updated. Concurrent misses of the same
/// key are not deduplicated; both responses merge into the one canonical
/// record, last write wins.
pub struct ResourceStore {
    transport: Arc<dyn ResourceTransport>,
    factory: Arc<dyn ResourceFactory>,
    cache: Arc<ResourceCache>,
    bridge: Arc<ReactivityBridge>,
}

impl ResourceStore {
    /// Create a store over the given transport with the default view-shape
    /// factory.
    pub fn new(transport: Arc<dyn ResourceTransport>) -> Arc<Self> {
        Self::with_factory(transport, Arc::new(ViewShapeFactory))
    }

    /// Create a store with a custom denormalization factory.
    pub fn with_factory(
        transport: Arc<dyn ResourceTransport>,
        factory: Arc<dyn ResourceFactory>,
    ) -> Arc<Self> {
        let store = Arc::new(Self {
            transport,
            factory,
            cache: Arc::new(ResourceCache::new()),
            bridge: ReactivityBridge::new(),
        });

        // Relationship accessors re-enter `get` with the linked ids and the
        // relationship's `related` link as the collection link, so traversal
        // reuses the exact same cache/sparse/inclusion policy.
        let weak = Arc::downgrade(&store);
        store
            .bridge
            .register_relationship_handler(Arc::new(move |linkage, related, query| {
                let weak = weak.clone();
                Box::pin(async move {
                    let store = weak.upgrade()?;
                    let options = FetchOptions {
                        query,
                        link: related,
                        included: None,
                    };
                    match linkage {
                        Linkage::One(ident) => {
                            let resource_type = ident.resource_type.clone();
                            store
                                .get(
                                    &resource_type,
                                    Some(RequestId::One(ident.id)),
                                    Some(options),
                                )
                                .await
                        }
                        Linkage::Many(idents) => {
                            let resource_type = idents.first()?.resource_type.clone();
                            let ids = idents.into_iter().map(|ident| ident.id).collect();
                            store
                                .get(&resource_type, Some(RequestId::Many(ids)), Some(options))
                                .await
                        }
                    }
                })
            }));

        store
    }

    /// The underlying cache (read access for callers and tests).
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// The reactivity bridge backing this store's views.
    pub fn bridge(&self) -> &Arc<ReactivityBridge> {
        &self.bridge
    }

    // ==================== Main API ====================

    /// Get one resource, a batch, or the per-type singleton.
    ///
    /// Resolves to `None` on any failure (missing type, batch fetch without
    /// a collection link, transport error, malformed payload) rather than
    /// surfacing the cause.
    pub async fn get(
        &self,
        resource_type: &str,
        id: Option<RequestId>,
        options: Option<FetchOptions>,
    ) -> Option<FetchResult> {
        match self
            .try_get(resource_type, id, options.unwrap_or_default())
            .await
        {
            Ok(result) => Some(result),
            Err(err) => {
                debug!(resource_type, error = %err, "get resolved to none");
                None
            }
        }
    }

    async fn try_get(
        &self,
        resource_type: &str,
        id: Option<RequestId>,
        options: FetchOptions,
    ) -> Result<FetchResult> {
        if resource_type.is_empty() {
            bail!("no type provided in get");
        }

        let mut fetch_id: Option<String> = None;
        match &id {
            Some(RequestId::Many(ids)) => {
                let cached: Option<Vec<_>> = ids
                    .iter()
                    .map(|id| self.cache.read(resource_type, Some(id)))
                    .collect();
                if let Some(records) = cached {
                    debug!(resource_type, count = records.len(), "batch served from cache");
                    return Ok(FetchResult::Many(
                        records
                            .iter()
                            .map(|record| self.bridge.wrap(record, false))
                            .collect(),
                    ));
                }
                if options.link.is_none() {
                    bail!("no link was specified to fetch multiple ids");
                }
                // The collection fetch supersedes any partial cache hits.
            }
            Some(RequestId::One(single)) => {
                if let Some(record) = self.cache.read(resource_type, Some(single)) {
                    // A cached full record wins even when this request is
                    // sparse; requested includes are fetched lazily later.
                    debug!(resource_type, id = %single, "served from cache");
                    return Ok(FetchResult::One(self.bridge.wrap(&record, false)));
                }
                fetch_id = Some(single.clone());
            }
            None => {
                if let Some(record) = self.cache.read(resource_type, None) {
                    debug!(resource_type, "singleton served from cache");
                    return Ok(FetchResult::One(self.bridge.wrap(&record, false)));
                }
            }
        }

        let document = self
            .transport
            .fetch(resource_type, fetch_id.as_deref(), &options)
            .await?;
        let sparse = options.is_sparse();

        let result = match document.data {
            PrimaryData::One(raw) => FetchResult::One(self.cache_and_wrap(&raw, sparse)?),
            PrimaryData::Many(raws) => FetchResult::Many(
                raws.iter()
                    .map(|raw| self.cache_and_wrap(raw, sparse))
                    .collect::<Result<_>>()?,
            ),
        };

        if let Some(included) = document.included {
            // Compound-document members are complete by contract: cache them
            // in full even when the primary request was sparse.
            for raw in &included {
                self.cache_and_wrap(raw, false)?;
            }
        }

        Ok(result)
    }

    /// Normalize a raw resource and route it by sparseness: sparse resources
    /// become transient, unaliased views; full resources merge into the
    /// canonical cache record.
    fn cache_and_wrap(&self, raw: &Value, sparse: bool) -> Result<Arc<ResourceView>> {
        let record = normalize(raw)?;

        if sparse {
            let transient = Arc::new(parking_lot::RwLock::new(record));
            return Ok(self.bridge.wrap(&transient, false));
        }

        let resource_type = record.resource_type.clone();
        let id = record.id.clone();
        let was_cached = self.cache.has(&resource_type, &id);
        let shared = self.cache.write_full(&resource_type, &id, record)?;
        Ok(self.bridge.wrap(&shared, was_cached))
    }

    /// Create a resource; on success the server's full record is cached and
    /// its view returned. `None` on any failure; no optimistic insert.
    pub async fn create(&self, resource: &Value) -> Option<Arc<ResourceView>> {
        match self.try_create(resource).await {
            Ok(view) => Some(view),
            Err(err) => {
                debug!(error = %err, "create resolved to none");
                None
            }
        }
    }

    async fn try_create(&self, resource: &Value) -> Result<Arc<ResourceView>> {
        let record = self.factory.to_record(resource)?;
        let raw = self.transport.create(&record).await?;
        self.cache_and_wrap(&raw, false)
    }

    /// Update a resource.
    ///
    /// With `partial` unset (the default) the denormalized fields are sent
    /// as-is; with `partial: false` they are first overlaid field by field
    /// onto the cached record to build a full replacement payload. On
    /// success the server's canonical fields merge into the
    /// same cached record, so every existing holder observes the change.
    pub async fn update(
        &self,
        resource: &Value,
        options: UpdateOptions,
    ) -> Option<Arc<ResourceView>> {
        match self.try_update(resource, options).await {
            Ok(view) => Some(view),
            Err(err) => {
                debug!(error = %err, "update resolved to none");
                None
            }
        }
    }

    async fn try_update(
        &self,
        resource: &Value,
        options: UpdateOptions,
    ) -> Result<Arc<ResourceView>> {
        let mut payload: ResourceRecord = self.factory.to_record(resource)?;
        let cached = self.cache.read(&payload.resource_type, Some(&payload.id));

        if !options.partial {
            if let Some(cached) = &cached {
                // Attributes overlay key by key onto the cached record;
                // links and relationships replace wholesale when supplied.
                let mut full = cached.read().clone();
                full.attributes.extend(payload.attributes);
                if !payload.links.is_empty() {
                    full.links = payload.links;
                }
                if !payload.relationships.is_empty() {
                    full.relationships = payload.relationships;
                }
                payload = full;
            }
        }

        let raw = self.transport.update(&payload).await?;

        // The merge target must already be cached; a full record in the cache
        // is by construction never a sparse snapshot.
        if cached.is_none() {
            bail!(
                "cannot merge update for uncached resource {}/{}",
                payload.resource_type,
                payload.id
            );
        }

        let updated = normalize(&raw)?;
        let resource_type = updated.resource_type.clone();
        let id = updated.id.clone();
        let shared = self.cache.write_full(&resource_type, &id, updated)?;
        Ok(self.bridge.wrap(&shared, true))
    }

    /// Delete a resource.
    ///
    /// Always returns the caller's resource value, deleted or not; on
    /// transport success the cache entry is removed. The returned value is
    /// an inert snapshot the caller may keep reading or mutating locally;
    /// cache membership is the only signal of whether the delete took
    /// effect.
    pub async fn delete(&self, resource: Value) -> Value {
        match self.try_delete(&resource).await {
            Ok(()) => {}
            Err(err) => debug!(error = %err, "delete left the cache untouched"),
        }
        resource
    }

    async fn try_delete(&self, resource: &Value) -> Result<()> {
        let record = self.factory.to_record(resource)?;
        self.transport.delete(&record).await?;

        if self.cache.remove(&record.resource_type, &record.id).is_some() {
            debug!(
                resource_type = %record.resource_type,
                id = %record.id,
                "removed deleted resource from cache"
            );
        }
        Ok(())
    }
}

/// Build a field-writer closure bound to a store's cache, for host state
/// containers that drive single-field reactive updates from outside the
/// view layer.
pub fn build_reactive_update_fn(
    store: &Arc<ResourceStore>,
) -> impl Fn(&str, &str, &str, Value) -> Result<()> {
    let store = store.clone();
    move |resource_type, id, field, value| {
        store.cache.write_field(resource_type, id, field, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NoTransport;

    #[async_trait::async_trait]
    impl ResourceTransport for NoTransport {
        async fn fetch(
            &self,
            _resource_type: &str,
            _id: Option<&str>,
            _options: &FetchOptions,
        ) -> Result<japi_types::Document> {
            bail!("no transport")
        }

        async fn create(&self, _record: &ResourceRecord) -> Result<Value> {
            bail!("no transport")
        }

        async fn update(&self, _record: &ResourceRecord) -> Result<Value> {
            bail!("no transport")
        }

        async fn delete(&self, _record: &ResourceRecord) -> Result<()> {
            bail!("no transport")
        }
    }

    #[test]
    fn reactive_update_fn_validates_and_writes_through() {
        let store = ResourceStore::new(Arc::new(NoTransport));
        store
            .cache()
            .write_full(
                "cat",
                "7",
                serde_json::from_value(json!({ "id": "7", "type": "cat", "attributes": {} }))
                    .unwrap(),
            )
            .unwrap();

        let update = build_reactive_update_fn(&store);
        update("cat", "7", "name", json!("kitty")).unwrap();

        let record = store.cache().read("cat", Some("7")).unwrap();
        assert_eq!(record.read().attributes.get("name"), Some(&json!("kitty")));

        assert!(update("", "7", "name", json!("x")).is_err());
        assert!(update("cat", "7", "", json!("x")).is_err());
    }
}
