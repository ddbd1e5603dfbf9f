//! Client-side JSON:API resource store.
//!
//! Maintains a canonical cache of resources keyed by `(type, id)` and hands
//! out identity-stable live views over them: every lookup of the same
//! resource resolves to the same view object, later server responses merge
//! into the record in place, and a field written through one view is
//! observable from every other holder.
//!
//! ## Architecture
//!
//! - [`ResourceStore`] coordinates fetches: cache-first reads, batch
//!   resolution, sparse-fieldset policy, compound-document includes
//! - [`ReactivityBridge`] keeps the record-to-view association weak, so the
//!   store never leaks views the host has dropped
//! - [`ResourceFactory`] converts flat view-shaped values back into
//!   canonical records on the write path
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use japi_store::{HttpTransport, ResourceStore};
//!
//! let transport = Arc::new(HttpTransport::new("https://pets.example.com"));
//! let store = ResourceStore::new(transport);
//!
//! let dog = store.get("dog", Some("17".into()), None).await?.one()?;
//! println!("{}", dog.attr("name").unwrap_or_default());
//!
//! let legs = dog.related("legs", Default::default()).await?.many()?;
//! ```

pub mod bridge;
pub mod factory;
pub mod store;

pub use bridge::{FetchResult, ReactivityBridge, RelationshipHandler, ResourceView};
pub use factory::{ResourceFactory, ViewShapeFactory};
pub use store::{build_reactive_update_fn, ResourceStore};

// Re-exports so most hosts depend on this crate alone.
pub use japi_cache::{ResourceCache, SharedRecord};
pub use japi_transport::{HttpTransport, ResourceTransport};
pub use japi_types::{FetchOptions, RequestId, ResourceRecord, UpdateOptions};
