//! HTTP client for JSON:API servers.
//!
//! URL conventions follow the resource server's routing:
//! - `GET {base}/{type}/{id}/` for single resources, `GET {base}/{type}/`
//!   for singletons/collections without an explicit link
//! - collection fetches with an explicit `link` option go to that link
//!   verbatim (relative links are resolved against the base URL)
//! - `POST {base}/{type}/` for creates
//! - `PATCH`/`DELETE` against the record's `links.self`
//!
//! Outbound records are hyphenated back to wire casing; responses are
//! returned raw for the coordinator to normalize. The underlying agent is
//! blocking, so every call is wrapped in `spawn_blocking`.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use japi_types::{denormalize, Document, FetchOptions, ResourceRecord};

use crate::ResourceTransport;

/// HTTP transport for a JSON:API server.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Create a transport for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self::with_agent(base_url, agent)
    }

    /// Create a transport with a preconfigured agent.
    pub fn with_agent(base_url: impl Into<String>, agent: ureq::Agent) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, agent }
    }

    /// `{base}/{type}/` or `{base}/{type}/{id}/`.
    fn collection_url(&self, resource_type: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}/", self.base_url, resource_type, id),
            None => format!("{}/{}/", self.base_url, resource_type),
        }
    }

    /// Resolve a possibly-relative link against the base URL.
    fn absolute(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}/{}", self.base_url, link.trim_start_matches('/'))
        }
    }

    fn self_url(&self, record: &ResourceRecord) -> Result<String> {
        match record.self_link() {
            Some(link) => Ok(self.absolute(link)),
            None => {
                if record.id.is_empty() {
                    bail!("record has neither a self link nor an id");
                }
                Ok(self.collection_url(&record.resource_type, Some(&record.id)))
            }
        }
    }

    async fn get_json(&self, url: String, params: Vec<(String, String)>) -> Result<Value> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || -> Result<Value> {
            let mut request = agent.get(&url);
            for (key, value) in &params {
                request = request.query(key, value);
            }
            request
                .call()
                .map_err(|e| anyhow!("GET {url} failed: {e}"))?
                .into_json()
                .map_err(|e| anyhow!("GET {url} returned malformed JSON: {e}"))
        })
        .await?
    }

    async fn send_resource(&self, method: &'static str, url: String, body: Value) -> Result<Value> {
        let agent = self.agent.clone();
        let response = tokio::task::spawn_blocking(move || -> Result<Value> {
            agent
                .request(method, &url)
                .send_json(body)
                .map_err(|e| anyhow!("{method} {url} failed: {e}"))?
                .into_json()
                .map_err(|e| anyhow!("{method} {url} returned malformed JSON: {e}"))
        })
        .await??;

        response
            .get("data")
            .cloned()
            .ok_or_else(|| anyhow!("{method} response carries no data"))
    }
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn fetch(
        &self,
        resource_type: &str,
        id: Option<&str>,
        options: &FetchOptions,
    ) -> Result<Document> {
        let url = match &options.link {
            Some(link) => self.absolute(link),
            None => self.collection_url(resource_type, id),
        };

        let mut params: Vec<(String, String)> = options
            .query
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(included) = &options.included {
            params.push(("included".to_string(), included.clone()));
        }

        let body = self.get_json(url, params).await?;
        serde_json::from_value(body).map_err(|e| anyhow!("malformed response document: {e}"))
    }

    async fn create(&self, record: &ResourceRecord) -> Result<Value> {
        let url = self.collection_url(&record.resource_type, None);
        let body = json!({ "data": denormalize(record)? });
        self.send_resource("POST", url, body).await
    }

    async fn update(&self, record: &ResourceRecord) -> Result<Value> {
        let url = self.self_url(record)?;
        let body = json!({ "data": denormalize(record)? });
        self.send_resource("PATCH", url, body).await
    }

    async fn delete(&self, record: &ResourceRecord) -> Result<()> {
        let url = self.self_url(record)?;
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            agent
                .delete(&url)
                .call()
                .map_err(|e| anyhow!("DELETE {url} failed: {e}"))?;
            Ok(())
        })
        .await?
    }
}
