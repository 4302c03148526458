//! HTTP client for the subset of the OpenSearch REST API the user store needs.
//!
//! The client knows about indices, documents, and queries. It knows nothing
//! about users; that mapping lives in [`crate::store`].

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Configuration for [`OpenSearchClient`].
#[derive(Clone, Debug)]
pub struct OpenSearchConfig {
    /// Base URL of the cluster, e.g. `http://localhost:9200`.
    pub url: String,
    /// Username for basic auth, if the cluster requires it.
    pub username: Option<String>,
    /// Password for basic auth.
    pub password: Option<String>,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            connect_timeout_ms: 5000,
            request_timeout_ms: 30000,
        }
    }
}

impl OpenSearchConfig {
    /// Create a config pointing at the given base URL.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// Set basic auth credentials.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Set connection and request timeouts.
    pub fn with_timeouts(mut self, connect_ms: u64, request_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.request_timeout_ms = request_ms;
        self
    }
}

/// Refresh behavior for write operations.
///
/// `WaitFor` blocks the request until the change is visible to search, which
/// is what the store relies on after creating users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Refresh {
    #[default]
    None,
    Immediate,
    WaitFor,
}

impl Refresh {
    fn as_param(self) -> Option<&'static str> {
        match self {
            Refresh::None => None,
            Refresh::Immediate => Some("true"),
            Refresh::WaitFor => Some("wait_for"),
        }
    }
}

/// A single document write inside a `_bulk` request.
#[derive(Clone, Debug)]
pub struct BulkOperation {
    pub index: String,
    pub id: String,
    pub source: Value,
}

/// Cluster metadata returned by `GET /`.
#[derive(Debug, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub version: ClusterVersion,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterVersion {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub distribution: Option<String>,
}

/// One hit from a search response.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct GetDocResponse {
    #[serde(rename = "_source")]
    source: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

/// Thin typed wrapper over the OpenSearch REST API.
pub struct OpenSearchClient {
    client: Client,
    config: OpenSearchConfig,
}

impl OpenSearchClient {
    /// Build a client from the given config.
    pub fn new(config: OpenSearchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_deref());
        }
        builder
    }

    /// `GET /` root endpoint, useful as a liveness check.
    pub async fn ping(&self) -> Result<ClusterInfo> {
        let url = self.build_url("/");
        let response = self.request(Method::GET, &url).send().await?;
        self.handle_response(response).await
    }

    /// Fetch a document by id. A missing document is `Ok(None)`, not an error.
    pub async fn get_doc(&self, index: &str, id: &str) -> Result<Option<Value>> {
        let url = self.build_url(&format!("/{index}/_doc/{id}"));
        let response = self.request(Method::GET, &url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc: GetDocResponse = self.handle_response(response).await?;
        Ok(doc.source)
    }

    /// Run a search and return its hits.
    pub async fn search(&self, index: &str, body: &Value) -> Result<Vec<SearchHit>> {
        let url = self.build_url(&format!("/{index}/_search"));
        debug!(index, %body, "search");
        let response = self.request(Method::POST, &url).json(body).send().await?;
        let result: SearchResponse = self.handle_response(response).await?;
        Ok(result.hits.hits)
    }

    /// Index (create or replace) a document under an explicit id.
    pub async fn index_doc(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        refresh: Refresh,
    ) -> Result<()> {
        let url = self.build_url(&format!("/{index}/_doc/{id}"));
        let mut request = self.request(Method::PUT, &url).json(body);
        if let Some(param) = refresh.as_param() {
            request = request.query(&[("refresh", param)]);
        }
        let response = request.send().await?;
        self.check_status(response).await
    }

    /// Apply a partial update (`{"doc": ...}`) to an existing document.
    pub async fn update_doc(&self, index: &str, id: &str, doc: &Value) -> Result<()> {
        let url = self.build_url(&format!("/{index}/_update/{id}"));
        let body = json!({ "doc": doc });
        let response = self.request(Method::POST, &url).json(&body).send().await?;
        self.check_status(response).await
    }

    /// Delete a document by id. Deleting a missing document is an error.
    pub async fn delete_doc(&self, index: &str, id: &str) -> Result<()> {
        let url = self.build_url(&format!("/{index}/_doc/{id}"));
        let response = self.request(Method::DELETE, &url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::DocumentNotFound {
                index: index.to_string(),
                id: id.to_string(),
            });
        }

        self.check_status(response).await
    }

    /// Delete every document matching the query, returning the deleted count.
    pub async fn delete_by_query(&self, index: &str, body: &Value) -> Result<u64> {
        let url = self.build_url(&format!("/{index}/_delete_by_query"));
        let response = self.request(Method::POST, &url).json(body).send().await?;
        let result: DeleteByQueryResponse = self.handle_response(response).await?;
        Ok(result.deleted)
    }

    /// Index a batch of documents through `_bulk`.
    ///
    /// Any per-item failure in the response is surfaced as an error even when
    /// the request itself succeeded. An empty batch is a no-op.
    pub async fn bulk(&self, operations: &[BulkOperation], refresh: Refresh) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }

        let body = ndjson_body(operations)?;
        let url = self.build_url("/_bulk");
        let mut request = self
            .request(Method::POST, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        if let Some(param) = refresh.as_param() {
            request = request.query(&[("refresh", param)]);
        }

        let response = request.send().await?;
        let result: BulkResponse = self.handle_response(response).await?;

        if result.errors {
            let detail = first_bulk_error(&result.items)
                .unwrap_or_else(|| "bulk response flagged errors without detail".to_string());
            return Err(Error::BulkFailure { detail });
        }

        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            error!(%status, url, body, "request failed");
            Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url,
                body,
            })
        }
    }

    async fn check_status(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            error!(%status, url, body, "request failed");
            Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url,
                body,
            })
        }
    }
}

/// Assemble the newline-delimited `_bulk` payload: an action line naming the
/// target index and id, then the document source, per operation.
fn ndjson_body(operations: &[BulkOperation]) -> Result<String> {
    let mut body = String::new();
    for op in operations {
        let action = json!({ "index": { "_index": op.index, "_id": op.id } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&op.source)?);
        body.push('\n');
    }
    Ok(body)
}

fn first_bulk_error(items: &[Value]) -> Option<String> {
    items.iter().find_map(|item| {
        let op = item.as_object()?.values().next()?;
        op.get("error").map(|error| error.to_string())
    })
}
