//! Transport layer for JSON:API resource fetching.
//!
//! This crate provides:
//! - [`ResourceTransport`]: the async contract the fetch coordinator consumes
//! - [`http::HttpTransport`]: a concrete HTTP client implementation
//!
//! Transport failures propagate as errors to the coordinator, which applies
//! its own swallow-to-none policy. No retries are performed at this layer,
//! and neither is timeout/cancellation handling beyond what the underlying
//! HTTP agent enforces.
//!
//! # Example
//!
//! ```ignore
//! use japi_transport::http::HttpTransport;
//!
//! let transport = HttpTransport::new("https://pets.example.com");
//! let document = transport.fetch("dog", Some("17"), &options).await?;
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use japi_types::{Document, FetchOptions, ResourceRecord};

pub mod http;

pub use http::HttpTransport;

/// Async transport contract for the fetch coordinator.
///
/// `fetch` returns the raw wire document (primary `data` plus optional
/// `included`); normalization is the caller's concern. Write operations take
/// canonical records and return the raw wire resource the server responded
/// with.
#[async_trait]
pub trait ResourceTransport: Send + Sync {
    /// Fetch a resource (`id` set) or a collection (`id` unset; the
    /// collection URL comes from `options.link` when present).
    async fn fetch(
        &self,
        resource_type: &str,
        id: Option<&str>,
        options: &FetchOptions,
    ) -> Result<Document>;

    /// Create a resource; returns the server's raw resource object.
    async fn create(&self, record: &ResourceRecord) -> Result<Value>;

    /// Update a resource; returns the server's raw resource object.
    async fn update(&self, record: &ResourceRecord) -> Result<Value>;

    /// Delete a resource.
    async fn delete(&self, record: &ResourceRecord) -> Result<()>;
}
