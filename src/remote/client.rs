//! Remote HTTP client
//!
//! Async client for the meeting-notes service API: JSON-over-HTTPS POST
//! endpoints with bearer-token auth. Non-success responses become typed
//! `AppError::Remote` failures so the resolution engine can decide whether
//! falling back to the cache is worth it. No retries here; fallback is the
//! caller's responsibility.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use super::types::{DocumentsPage, FolderListResponse, PeopleResponse, TranscriptResponse};
use crate::core::error::AppError;
use crate::core::filter::ListFilter;
use crate::core::model::{flatten_workspaces, Folder, Meeting, Panel, Person, Segment, Workspace};
use crate::core::resolver::DataSource;

/// Documents requested per page during cursor pagination.
const PAGE_SIZE: usize = 100;

/// HTTP client for the remote service.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl RemoteClient {
    pub fn new(base_url: &str, token: String) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid API base URL: {}", base_url))?;
        let client = Client::builder()
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .with_context(|| format!("invalid endpoint path: {}", endpoint))
    }

    /// POST a JSON body and return the raw response, turning a non-success
    /// status into a typed failure with best-effort body text.
    async fn post_raw(&self, endpoint: &str, body: Value) -> Result<reqwest::Response> {
        let url = self.url(endpoint)?;
        tracing::debug!(endpoint, "remote request");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Remote {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(resp)
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> Result<T> {
        let resp = self.post_raw(endpoint, body).await?;
        resp.json()
            .await
            .with_context(|| format!("failed to parse {} response", endpoint))
    }

    /// Single-document metadata fetch. Every failure, including HTTP 404,
    /// propagates to the caller.
    pub async fn get_meeting(&self, id: &str) -> Result<Meeting> {
        self.post("get-document-metadata", json!({ "id": id })).await
    }

    pub async fn get_transcript(&self, id: &str) -> Result<Vec<Segment>> {
        let resp: TranscriptResponse = self
            .post("get-document-transcript", json!({ "id": id }))
            .await?;
        Ok(resp.into_segments())
    }

    pub async fn get_folders(&self) -> Result<Vec<Folder>> {
        let resp: FolderListResponse = self
            .post("get-document-lists-metadata", json!({}))
            .await?;
        Ok(resp.lists.into_iter().map(Folder::from).collect())
    }

    pub async fn get_people(&self) -> Result<Vec<Person>> {
        let resp: PeopleResponse = self.post("get-people", json!({})).await?;
        Ok(resp.into_people())
    }

    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>> {
        let resp: Value = self.post("get-workspaces", json!({})).await?;
        let payload = resp.get("workspaces").unwrap_or(&resp);
        Ok(flatten_workspaces(payload))
    }

    /// Ask the service to refresh its own upstream ingestion. Fire and
    /// forget; only the status matters.
    pub async fn trigger_sync(&self) -> Result<()> {
        self.post_raw("refresh", json!({})).await?;
        Ok(())
    }

    /// Paginated document listing. Pages are fetched one at a time; each
    /// page is filtered through the shared predicates and matches
    /// accumulate until the count reaches `filter.limit` or the cursor runs
    /// out. The accumulation is returned unsorted: the resolution engine
    /// applies the final sort and slice, so a match on a late page is never
    /// lost to an early cut-off.
    pub async fn list_meetings(&self, filter: &ListFilter) -> Result<Vec<Meeting>> {
        let members = match &filter.folder {
            Some(folder) => {
                let folders = self.get_folders().await?;
                match folders.into_iter().find(|f| f.matches(folder)) {
                    Some(f) => Some(f.document_ids.into_iter().collect::<HashSet<_>>()),
                    None => return Ok(Vec::new()),
                }
            }
            None => None,
        };

        let mut matched = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut body = json!({ "limit": PAGE_SIZE });
            if let Some(cursor) = &cursor {
                body["cursor"] = json!(cursor);
            }
            if let Some(workspace) = &filter.workspace {
                body["workspace_id"] = json!(workspace);
            }

            let page: DocumentsPage = self.post("get-documents", body).await?;
            for doc in page.docs {
                if filter.matches(&doc, members.as_ref()) {
                    matched.push(doc);
                }
            }

            cursor = page.next_cursor;
            if matched.len() >= filter.limit || cursor.is_none() {
                break;
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl DataSource for RemoteClient {
    async fn meetings(&self, filter: &ListFilter) -> Result<Vec<Meeting>> {
        self.list_meetings(filter).await
    }

    async fn meeting(&self, id: &str) -> Result<Option<Meeting>> {
        self.get_meeting(id).await.map(Some)
    }

    async fn transcript(&self, id: &str) -> Result<Vec<Segment>> {
        self.get_transcript(id).await
    }

    async fn enhanced_panel(&self, id: &str) -> Result<Option<Panel>> {
        // The metadata endpoint carries the last-viewed summary panel; there
        // is no separate panel endpoint.
        Ok(self.get_meeting(id).await?.last_viewed_panel)
    }

    async fn folders(&self) -> Result<Vec<Folder>> {
        self.get_folders().await
    }

    async fn people(&self) -> Result<Vec<Person>> {
        self.get_people().await
    }

    async fn workspaces(&self) -> Result<Vec<Workspace>> {
        self.get_workspaces().await
    }

    async fn shared_meetings(&self) -> Result<Vec<Meeting>> {
        // No remote endpoint exists for shared documents; failing here lets
        // auto mode read them from the cache snapshot.
        anyhow::bail!("shared documents are only available from the cache snapshot")
    }
}
