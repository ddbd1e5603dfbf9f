//! Shared types for the japi-store workspace.
//!
//! This crate provides the foundational resource types used across the
//! cache, transport, and store crates, breaking circular dependency chains.
//!
//! ## Resource Types
//!
//! The [`record`] module contains the canonical data model:
//! - [`ResourceRecord`](record::ResourceRecord) - Canonical cached resource
//! - [`Linkage`](record::Linkage) - Typed relationship references
//! - [`Document`](record::Document) - Wire-format response payload
//!
//! The [`normalize`] module converts wire-format resources into canonical
//! records (and back), camel-casing keys recursively along the way.

pub mod normalize;
pub mod options;
pub mod record;

// Re-export commonly used types at crate root
pub use normalize::{camelize, camelize_keys, denormalize, hyphenate, hyphenate_keys, normalize};
pub use options::{FetchOptions, RequestId, UpdateOptions};
pub use record::{
    Document, Linkage, PrimaryData, Relationship, ResourceIdentifier, ResourceRecord,
};
