//! Notion API client for fetching finished notes and their content blocks.
//!
//! The client queries one database for pages whose status select equals a
//! completion marker, then pulls each page's block children. Both endpoints
//! are cursor-paginated and are always drained completely. Any non-success
//! response aborts the fetch; there are no retries.

mod api;
mod properties;

use std::future::Future;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use deepnotes_shared::{
    ContentBlock, DeepNotesError, NotionConfig, NotionCredentials, PageSummary, RemoteDocument,
    Result,
};

use crate::api::{ApiErrorBody, PageObject, PaginatedList, RawBlock};

pub use properties::UNTITLED;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("deepnotes/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Client options
// ---------------------------------------------------------------------------

/// Everything needed to talk to one Notion database.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, e.g. `https://api.notion.com/v1`.
    pub base_url: Url,
    /// Value of the `Notion-Version` header.
    pub version: String,
    pub credentials: NotionCredentials,
    /// Select property holding the page status.
    pub status_property: String,
    /// Status value that marks a page as ready.
    pub completed_status: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl ClientOptions {
    /// Combine the `[notion]` config section with resolved credentials.
    pub fn from_config(config: &NotionConfig, credentials: NotionCredentials) -> Self {
        Self {
            base_url: config.base_url.clone(),
            version: config.version.clone(),
            credentials,
            status_property: config.status_property.clone(),
            completed_status: config.completed_status.clone(),
            page_size: config.page_size,
            timeout_secs: config.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// NotionClient
// ---------------------------------------------------------------------------

/// Thin, fail-fast client over the two endpoints the sync needs.
pub struct NotionClient {
    client: Client,
    base_url: String,
    database_id: String,
    status_property: String,
    completed_status: String,
    page_size: u32,
}

impl NotionClient {
    /// Build a client with auth and version headers preset.
    pub fn new(opts: ClientOptions) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", opts.credentials.api_key))
            .map_err(|_| DeepNotesError::config("Notion API key contains invalid characters"))?;
        auth.set_sensitive(true);

        let version = HeaderValue::from_str(&opts.version)
            .map_err(|_| DeepNotesError::config("invalid Notion-Version value"))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", version);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| DeepNotesError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: opts.base_url.as_str().trim_end_matches('/').to_string(),
            database_id: opts.credentials.database_id,
            status_property: opts.status_property,
            completed_status: opts.completed_status,
            page_size: opts.page_size.clamp(1, 100),
        })
    }

    /// All database pages whose status equals the completion marker.
    #[instrument(skip_all, fields(database = %self.database_id))]
    pub async fn query_pages(&self) -> Result<Vec<PageSummary>> {
        let pages: Vec<PageObject> =
            drain("database query", |cursor| self.query_page(cursor)).await?;

        info!(
            count = pages.len(),
            status = %self.completed_status,
            "database query complete"
        );

        Ok(pages.into_iter().map(PageSummary::from).collect())
    }

    /// Ordered top-level blocks of a page.
    #[instrument(skip(self))]
    pub async fn block_children(&self, page_id: &str) -> Result<Vec<ContentBlock>> {
        let raw: Vec<RawBlock> =
            drain("block children", |cursor| self.children_page(page_id, cursor)).await?;

        debug!(count = raw.len(), "blocks fetched");

        Ok(raw.into_iter().map(RawBlock::into_content_block).collect())
    }

    /// Fetch a page's blocks and pair them with its properties.
    pub async fn fetch_document(&self, page: &PageSummary) -> Result<RemoteDocument> {
        let blocks = self.block_children(&page.id).await?;
        Ok(RemoteDocument {
            id: page.id.clone(),
            properties: page.properties.clone(),
            blocks,
        })
    }

    async fn query_page(&self, cursor: Option<String>) -> Result<PaginatedList<PageObject>> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);

        let mut body = json!({
            "filter": {
                "property": self.status_property,
                "select": { "equals": self.completed_status },
            },
            "page_size": self.page_size,
        });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        self.send(self.client.post(&url).json(&body), &url).await
    }

    async fn children_page(
        &self,
        page_id: &str,
        cursor: Option<String>,
    ) -> Result<PaginatedList<RawBlock>> {
        let url = format!("{}/blocks/{page_id}/children", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("page_size", self.page_size.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        self.send(request, &url).await
    }

    /// Send a request and decode a success body; anything else is fatal.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| DeepNotesError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(DeepNotesError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeepNotesError::Network(format!("{url}: failed to read body: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| DeepNotesError::parse(format!("{url}: unexpected response: {e}")))
    }
}

/// Follow `next_cursor` until the endpoint reports no more results.
async fn drain<T, F, Fut>(what: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<PaginatedList<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0usize;

    loop {
        let list = fetch(cursor.take()).await?;
        pages += 1;
        items.extend(list.results);

        if !list.has_more {
            break;
        }
        match list.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                warn!(what, "has_more without next_cursor, stopping");
                break;
            }
        }
    }

    debug!(what, pages, items = items.len(), "pagination drained");
    Ok(items)
}
