//! Shared test support: a scriptable in-memory transport plus wire-format
//! fixtures for a small pet-shop resource graph.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use japi_store::{FetchOptions, ResourceRecord, ResourceTransport};
use japi_types::Document;

/// One request observed by the mock, with the fields assertions care about.
#[derive(Debug, Clone)]
pub enum LoggedRequest {
    Fetch {
        resource_type: String,
        id: Option<String>,
        link: Option<String>,
        sparse: bool,
    },
    Create(ResourceRecord),
    Update(ResourceRecord),
    Delete(ResourceRecord),
}

/// Scriptable transport: responses are queued documents consumed in FIFO
/// order, every request is logged, and `set_fail` makes all operations
/// error until cleared.
pub struct MockTransport {
    responses: Mutex<VecDeque<Value>>,
    log: Mutex<Vec<LoggedRequest>>,
    fail: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    pub fn push_document(&self, document: Value) {
        self.responses.lock().push_back(document);
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.log.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|request| matches!(request, LoggedRequest::Fetch { .. }))
            .count()
    }

    fn check_fail(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("injected transport failure");
        }
        Ok(())
    }

    fn pop(&self) -> Result<Value> {
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow!("no queued response"))
    }
}

#[async_trait]
impl ResourceTransport for MockTransport {
    async fn fetch(
        &self,
        resource_type: &str,
        id: Option<&str>,
        options: &FetchOptions,
    ) -> Result<Document> {
        self.check_fail()?;
        self.log.lock().push(LoggedRequest::Fetch {
            resource_type: resource_type.to_string(),
            id: id.map(str::to_string),
            link: options.link.clone(),
            sparse: options.is_sparse(),
        });
        let body = self.pop()?;
        serde_json::from_value(body).map_err(|e| anyhow!("malformed queued document: {e}"))
    }

    async fn create(&self, record: &ResourceRecord) -> Result<Value> {
        self.check_fail()?;
        self.log.lock().push(LoggedRequest::Create(record.clone()));
        let body = self.pop()?;
        body.get("data")
            .cloned()
            .ok_or_else(|| anyhow!("queued create response carries no data"))
    }

    async fn update(&self, record: &ResourceRecord) -> Result<Value> {
        self.check_fail()?;
        self.log.lock().push(LoggedRequest::Update(record.clone()));
        let body = self.pop()?;
        body.get("data")
            .cloned()
            .ok_or_else(|| anyhow!("queued update response carries no data"))
    }

    async fn delete(&self, record: &ResourceRecord) -> Result<()> {
        self.check_fail()?;
        self.log.lock().push(LoggedRequest::Delete(record.clone()));
        Ok(())
    }
}

// ==================== Fixtures ====================

pub fn document(data: Value) -> Value {
    json!({ "data": data })
}

pub fn document_with_included(data: Value, included: Vec<Value>) -> Value {
    json!({ "data": data, "included": included })
}

/// Dog 17, hyphenated wire casing, with a to-many `legs` relationship and a
/// to-one `owner` relationship.
pub fn build_dog() -> Value {
    json!({
        "id": "17",
        "type": "dog",
        "attributes": {
            "name": "Doge",
            "cool-doggo-name": "DOGE the cool dog",
        },
        "links": { "self": "/api/dog/17/" },
        "relationships": {
            "legs": {
                "data": [
                    { "id": "1", "type": "leg" },
                    { "id": "2", "type": "leg" },
                    { "id": "3", "type": "leg" },
                    { "id": "4", "type": "leg" },
                ],
                "links": { "related": "/api/dog/17/legs/" },
            },
            "owner": {
                "data": { "id": "5", "type": "owner" },
                "links": { "related": "/api/dog/17/owner/" },
            },
        },
    })
}

pub fn build_leg(id: u32) -> Value {
    json!({
        "id": id.to_string(),
        "type": "leg",
        "attributes": { "leg-position": id },
        "links": { "self": format!("/api/leg/{id}/") },
    })
}

pub fn build_legs() -> Vec<Value> {
    (1..=4).map(build_leg).collect()
}

pub fn build_owner() -> Value {
    json!({
        "id": "5",
        "type": "owner",
        "attributes": {
            "name": "Cool Owner",
            "contact-email": "owner@example.com",
        },
        "links": { "self": "/api/owner/5/" },
    })
}
