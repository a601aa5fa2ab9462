//! Resolution engine
//!
//! Decides, per request, whether to query the network or the local cache
//! snapshot, applies `auto` fallback, and normalizes results identically
//! regardless of origin. This layer never logs and never prints; it returns
//! a normalized result or a typed failure for the command layer to
//! translate into an exit code.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::OnceCell;

use super::error::AppError;
use super::filter::{sort_by_recency, ListFilter};
use super::model::{Folder, Meeting, Panel, Person, Segment, Workspace};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::remote::RemoteClient;

/// How many meetings a single-item lookup scans before matching.
const RESOLVE_SCAN_LIMIT: usize = 200;

/// Source-selection policy, resolved once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Network first, silent fallback to cache on any failure.
    #[default]
    Auto,
    /// Network only; failures propagate.
    Api,
    /// Cache only; network commands fail fast.
    Cache,
}

/// The queries both sources answer. The remote client and the cache store
/// implement this over the same shared predicates, so list results are
/// consistent regardless of origin.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Filtered but unsorted meeting list; final sort and slicing happen in
    /// the resolver.
    async fn meetings(&self, filter: &ListFilter) -> Result<Vec<Meeting>>;
    async fn meeting(&self, id: &str) -> Result<Option<Meeting>>;
    async fn transcript(&self, id: &str) -> Result<Vec<Segment>>;
    async fn enhanced_panel(&self, id: &str) -> Result<Option<Panel>>;
    async fn folders(&self) -> Result<Vec<Folder>>;
    async fn people(&self) -> Result<Vec<Person>>;
    async fn workspaces(&self) -> Result<Vec<Workspace>>;
    /// Documents shared with the user. The remote API has no endpoint for
    /// these, so its implementation fails and `auto` mode lands on the
    /// cache.
    async fn shared_meetings(&self) -> Result<Vec<Meeting>>;
}

/// A meeting with its subordinate resources, all fetched from one origin.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingDetail {
    pub meeting: Meeting,
    pub panel: Option<Panel>,
    pub transcript: Vec<Segment>,
}

type CacheOpen = Box<dyn Fn() -> Result<Box<dyn DataSource>> + Send + Sync>;

pub struct Resolver {
    mode: SourceMode,
    remote: Option<Box<dyn DataSource>>,
    /// Concrete client handle for network-only operations (sync).
    remote_client: Option<RemoteClient>,
    cache: OnceCell<Box<dyn DataSource>>,
    cache_open: CacheOpen,
}

impl Resolver {
    pub fn new(
        mode: SourceMode,
        remote: Option<Box<dyn DataSource>>,
        cache_open: impl Fn() -> Result<Box<dyn DataSource>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            mode,
            remote,
            remote_client: None,
            cache: OnceCell::new(),
            cache_open: Box::new(cache_open),
        }
    }

    /// Build the resolver for one invocation. In `api` mode a missing
    /// credential is a hard authentication error; in `auto` mode it is
    /// treated like any other network failure and the remote side is simply
    /// absent.
    pub fn from_config(config: &Config, mode: SourceMode) -> Result<Self> {
        let client = match mode {
            SourceMode::Cache => None,
            SourceMode::Api => {
                let token = config
                    .token()
                    .map_err(|e| AppError::Auth(e.to_string()))?;
                Some(RemoteClient::new(&config.api_base(), token)?)
            }
            SourceMode::Auto => match config.token() {
                Ok(token) => Some(RemoteClient::new(&config.api_base(), token)?),
                Err(_) => None,
            },
        };

        let cache_path = config.cache_path();
        let mut resolver = Self::new(mode, None, move || {
            let store = CacheStore::load(&cache_path)?;
            Ok(Box::new(store) as Box<dyn DataSource>)
        });
        resolver.remote = client
            .clone()
            .map(|c| Box::new(c) as Box<dyn DataSource>);
        resolver.remote_client = client;
        Ok(resolver)
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    /// The snapshot loads lazily, at most once per invocation.
    async fn cache_source(&self) -> Result<&dyn DataSource> {
        let source = self
            .cache
            .get_or_try_init(|| async { (self.cache_open)() })
            .await?;
        Ok(source.as_ref())
    }

    fn remote_source(&self) -> Result<&dyn DataSource> {
        match &self.remote {
            Some(remote) => Ok(remote.as_ref()),
            None => Err(AppError::Auth(
                "no credentials available (run with --source cache to read the local snapshot)"
                    .into(),
            )
            .into()),
        }
    }

    /// Filtered meeting list, sorted by descending recency and truncated to
    /// the limit only after the sort.
    pub async fn list_meetings(&self, filter: &ListFilter) -> Result<Vec<Meeting>> {
        let mut meetings = match self.mode {
            SourceMode::Cache => self.cache_source().await?.meetings(filter).await?,
            SourceMode::Api => self.remote_source()?.meetings(filter).await?,
            SourceMode::Auto => {
                let from_remote = match &self.remote {
                    Some(remote) => remote.meetings(filter).await.ok(),
                    None => None,
                };
                match from_remote {
                    Some(meetings) => meetings,
                    None => self.cache_source().await?.meetings(filter).await?,
                }
            }
        };
        sort_by_recency(&mut meetings);
        meetings.truncate(filter.limit);
        Ok(meetings)
    }

    /// Resolve a free-form query (id, id prefix, or title fragment) to one
    /// meeting. Exact id wins, then id prefix; a title substring is only
    /// consulted when no id matched at all.
    pub async fn resolve_meeting(&self, query: &str) -> Result<Meeting> {
        let filter = ListFilter {
            limit: RESOLVE_SCAN_LIMIT,
            ..Default::default()
        };
        let meetings = self.list_meetings(&filter).await?;

        if let Some(meeting) = meetings.iter().find(|m| m.id == query) {
            return Ok(meeting.clone());
        }
        if let Some(meeting) = meetings.iter().find(|m| m.id.starts_with(query)) {
            return Ok(meeting.clone());
        }
        let needle = query.to_lowercase();
        if let Some(meeting) = meetings.iter().find(|m| {
            m.title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle))
        }) {
            return Ok(meeting.clone());
        }
        Err(AppError::meeting_not_found(query).into())
    }

    /// Detail view: metadata plus summary panel plus transcript, always
    /// from a single origin. In `auto` mode a failed primary metadata fetch
    /// sends the whole view to the cache; a failed subordinate fetch after
    /// a successful primary leaves that one piece absent.
    pub async fn meeting_detail(&self, query: &str) -> Result<MeetingDetail> {
        let resolved = self.resolve_meeting(query).await?;
        self.detail_by_id(&resolved.id, query).await
    }

    async fn detail_by_id(&self, id: &str, query: &str) -> Result<MeetingDetail> {
        match self.mode {
            SourceMode::Cache => {
                let cache = self.cache_source().await?;
                detail_from(cache, id, query).await
            }
            SourceMode::Api => detail_from(self.remote_source()?, id, query).await,
            SourceMode::Auto => {
                if let Some(remote) = &self.remote {
                    if let Ok(detail) = detail_from(remote.as_ref(), id, query).await {
                        return Ok(detail);
                    }
                }
                let cache = self.cache_source().await?;
                detail_from(cache, id, query).await
            }
        }
    }

    pub async fn folders(&self) -> Result<Vec<Folder>> {
        match self.mode {
            SourceMode::Cache => self.cache_source().await?.folders().await,
            SourceMode::Api => self.remote_source()?.folders().await,
            SourceMode::Auto => {
                let from_remote = match &self.remote {
                    Some(remote) => remote.folders().await.ok(),
                    None => None,
                };
                match from_remote {
                    Some(folders) => Ok(folders),
                    None => self.cache_source().await?.folders().await,
                }
            }
        }
    }

    /// One folder plus its member meetings.
    pub async fn folder_view(&self, id_or_name: &str) -> Result<(Folder, Vec<Meeting>)> {
        let folder = self
            .folders()
            .await?
            .into_iter()
            .find(|f| f.matches(id_or_name))
            .ok_or_else(|| {
                AppError::NotFound(format!("folder not found for: {}", id_or_name))
            })?;

        let filter = ListFilter {
            folder: Some(id_or_name.to_string()),
            limit: folder.member_count().max(1),
            ..Default::default()
        };
        let meetings = self.list_meetings(&filter).await?;
        Ok((folder, meetings))
    }

    pub async fn people(&self) -> Result<Vec<Person>> {
        match self.mode {
            SourceMode::Cache => self.cache_source().await?.people().await,
            SourceMode::Api => self.remote_source()?.people().await,
            SourceMode::Auto => {
                let from_remote = match &self.remote {
                    Some(remote) => remote.people().await.ok(),
                    None => None,
                };
                match from_remote {
                    Some(people) => Ok(people),
                    None => self.cache_source().await?.people().await,
                }
            }
        }
    }

    pub async fn workspaces(&self) -> Result<Vec<Workspace>> {
        match self.mode {
            SourceMode::Cache => self.cache_source().await?.workspaces().await,
            SourceMode::Api => self.remote_source()?.workspaces().await,
            SourceMode::Auto => {
                let from_remote = match &self.remote {
                    Some(remote) => remote.workspaces().await.ok(),
                    None => None,
                };
                match from_remote {
                    Some(workspaces) => Ok(workspaces),
                    None => self.cache_source().await?.workspaces().await,
                }
            }
        }
    }

    /// Documents shared with the user, most recent first. Only the cache
    /// holds these, so `auto` mode always lands there.
    pub async fn shared_meetings(&self) -> Result<Vec<Meeting>> {
        let mut meetings = match self.mode {
            SourceMode::Cache => self.cache_source().await?.shared_meetings().await?,
            SourceMode::Api => self.remote_source()?.shared_meetings().await?,
            SourceMode::Auto => {
                let from_remote = match &self.remote {
                    Some(remote) => remote.shared_meetings().await.ok(),
                    None => None,
                };
                match from_remote {
                    Some(meetings) => meetings,
                    None => self.cache_source().await?.shared_meetings().await?,
                }
            }
        };
        sort_by_recency(&mut meetings);
        Ok(meetings)
    }

    /// Ask the service to refresh its upstream ingestion. Network only:
    /// cache mode (or --no-network) is a configuration error, and in auto
    /// mode missing credentials cannot fall anywhere.
    pub async fn sync(&self) -> Result<()> {
        if self.mode == SourceMode::Cache {
            return Err(AppError::Config(
                "sync requires network access and cannot run with --source cache or --no-network"
                    .into(),
            )
            .into());
        }
        match &self.remote_client {
            Some(client) => client.trigger_sync().await,
            None => Err(AppError::Auth("no credentials available for sync".into()).into()),
        }
    }
}

/// Fetch a full detail view from one source. Only the primary metadata
/// fetch can fail the view; subordinate failures read as absence.
async fn detail_from(source: &dyn DataSource, id: &str, query: &str) -> Result<MeetingDetail> {
    let meeting = source
        .meeting(id)
        .await?
        .ok_or_else(|| AppError::meeting_not_found(query))?;
    let panel = match meeting.last_viewed_panel.clone() {
        Some(panel) => Some(panel),
        None => source.enhanced_panel(id).await.unwrap_or(None),
    };
    let transcript = source.transcript(id).await.unwrap_or_default();
    Ok(MeetingDetail {
        meeting,
        panel,
        transcript,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::doc::DocNode;
    use anyhow::anyhow;

    /// Serves a fixed data set; individual calls can be switched to fail.
    #[derive(Default, Clone)]
    struct StaticSource {
        meetings: Vec<Meeting>,
        transcript: Vec<Segment>,
        panel: Option<Panel>,
        fail_all: bool,
        fail_meeting: bool,
        fail_transcript: bool,
    }

    #[async_trait]
    impl DataSource for StaticSource {
        async fn meetings(&self, filter: &ListFilter) -> Result<Vec<Meeting>> {
            if self.fail_all {
                return Err(anyhow!("network down"));
            }
            Ok(self
                .meetings
                .iter()
                .filter(|m| filter.matches(m, None))
                .cloned()
                .collect())
        }

        async fn meeting(&self, id: &str) -> Result<Option<Meeting>> {
            if self.fail_all || self.fail_meeting {
                return Err(anyhow!("network down"));
            }
            Ok(self.meetings.iter().find(|m| m.id == id).cloned())
        }

        async fn transcript(&self, _id: &str) -> Result<Vec<Segment>> {
            if self.fail_all || self.fail_transcript {
                return Err(anyhow!("network down"));
            }
            Ok(self.transcript.clone())
        }

        async fn enhanced_panel(&self, _id: &str) -> Result<Option<Panel>> {
            if self.fail_all {
                return Err(anyhow!("network down"));
            }
            Ok(self.panel.clone())
        }

        async fn folders(&self) -> Result<Vec<Folder>> {
            if self.fail_all {
                return Err(anyhow!("network down"));
            }
            Ok(Vec::new())
        }

        async fn people(&self) -> Result<Vec<Person>> {
            if self.fail_all {
                return Err(anyhow!("network down"));
            }
            Ok(Vec::new())
        }

        async fn workspaces(&self) -> Result<Vec<Workspace>> {
            if self.fail_all {
                return Err(anyhow!("network down"));
            }
            Ok(Vec::new())
        }

        async fn shared_meetings(&self) -> Result<Vec<Meeting>> {
            if self.fail_all {
                return Err(anyhow!("network down"));
            }
            Ok(Vec::new())
        }
    }

    fn meeting(id: &str, title: &str, updated: &str) -> Meeting {
        Meeting {
            id: id.into(),
            title: Some(title.into()),
            kind: Some("meeting".into()),
            updated_at: Some(updated.into()),
            ..Default::default()
        }
    }

    fn segments(speaker: &str) -> Vec<Segment> {
        vec![Segment {
            text: "hello".into(),
            speaker: Some(speaker.into()),
            ..Default::default()
        }]
    }

    fn cache_data() -> StaticSource {
        StaticSource {
            meetings: vec![
                meeting("aa-11", "Standup", "2024-01-10T00:00:00Z"),
                meeting("bb-22", "Roadmap Review", "2024-01-12T00:00:00Z"),
            ],
            transcript: segments("cache"),
            panel: Some(Panel {
                title: Some("Summary".into()),
                content: Some(DocNode::default()),
            }),
            ..Default::default()
        }
    }

    fn resolver(mode: SourceMode, remote: Option<StaticSource>, cache: StaticSource) -> Resolver {
        Resolver::new(
            mode,
            remote.map(|r| Box::new(r) as Box<dyn DataSource>),
            move || Ok(Box::new(cache.clone()) as Box<dyn DataSource>),
        )
    }

    #[tokio::test]
    async fn test_auto_falls_back_to_cache_on_remote_failure() {
        let failing = StaticSource {
            fail_all: true,
            ..Default::default()
        };
        let auto = resolver(SourceMode::Auto, Some(failing), cache_data());
        let direct = resolver(SourceMode::Cache, None, cache_data());

        let filter = ListFilter::default();
        let from_auto = auto.list_meetings(&filter).await.unwrap();
        let from_cache = direct.list_meetings(&filter).await.unwrap();

        let auto_ids: Vec<&str> = from_auto.iter().map(|m| m.id.as_str()).collect();
        let cache_ids: Vec<&str> = from_cache.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(auto_ids, cache_ids);
    }

    #[tokio::test]
    async fn test_auto_without_credentials_uses_cache() {
        let auto = resolver(SourceMode::Auto, None, cache_data());
        let meetings = auto.list_meetings(&ListFilter::default()).await.unwrap();
        assert_eq!(meetings.len(), 2);
    }

    #[tokio::test]
    async fn test_api_mode_propagates_failure() {
        let failing = StaticSource {
            fail_all: true,
            ..Default::default()
        };
        let api = resolver(SourceMode::Api, Some(failing), cache_data());
        assert!(api.list_meetings(&ListFilter::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_api_mode_without_credentials_is_auth_error() {
        let api = resolver(SourceMode::Api, None, cache_data());
        let err = api.list_meetings(&ListFilter::default()).await.unwrap_err();
        assert_eq!(crate::core::error::exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_list_sorted_and_truncated_after_sort() {
        let filter = ListFilter {
            limit: 1,
            ..Default::default()
        };
        let r = resolver(SourceMode::Cache, None, cache_data());
        let meetings = r.list_meetings(&filter).await.unwrap();
        assert_eq!(meetings.len(), 1);
        // Most recent survives the cut even though it is not first in
        // fetch order.
        assert_eq!(meetings[0].id, "bb-22");
    }

    #[tokio::test]
    async fn test_resolve_by_id_prefix_and_title() {
        let r = resolver(SourceMode::Cache, None, cache_data());
        assert_eq!(r.resolve_meeting("aa-11").await.unwrap().id, "aa-11");
        assert_eq!(r.resolve_meeting("bb").await.unwrap().id, "bb-22");
        assert_eq!(r.resolve_meeting("roadmap").await.unwrap().id, "bb-22");
    }

    #[tokio::test]
    async fn test_resolve_unmatched_is_not_found() {
        let r = resolver(SourceMode::Cache, None, cache_data());
        let err = r.resolve_meeting("no such thing").await.unwrap_err();
        assert_eq!(crate::core::error::exit_code(&err), 4);
        assert!(err.to_string().contains("no such thing"));
    }

    #[tokio::test]
    async fn test_detail_all_or_nothing_fallback() {
        // Remote lists fine but the primary metadata fetch fails: the whole
        // view must come from the cache, including the transcript the
        // remote could still have served.
        let remote = StaticSource {
            meetings: vec![meeting("aa-11", "Standup", "2024-01-10T00:00:00Z")],
            transcript: segments("remote"),
            fail_meeting: true,
            ..Default::default()
        };
        let r = resolver(SourceMode::Auto, Some(remote), cache_data());
        let detail = r.meeting_detail("aa-11").await.unwrap();
        assert_eq!(detail.transcript[0].speaker.as_deref(), Some("cache"));
        assert!(detail.panel.is_some());
    }

    #[tokio::test]
    async fn test_subordinate_failure_is_absence_not_fallback() {
        let remote = StaticSource {
            meetings: vec![meeting("aa-11", "Standup", "2024-01-10T00:00:00Z")],
            transcript: segments("remote"),
            fail_transcript: true,
            ..Default::default()
        };
        let r = resolver(SourceMode::Auto, Some(remote), cache_data());
        let detail = r.meeting_detail("aa-11").await.unwrap();
        // Transcript absent, not served from cache.
        assert!(detail.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_detail_not_found_in_cache_mode() {
        let r = resolver(SourceMode::Cache, None, cache_data());
        let err = r.meeting_detail("zzz").await.unwrap_err();
        assert_eq!(crate::core::error::exit_code(&err), 4);
    }

    #[tokio::test]
    async fn test_sync_rejected_in_cache_mode() {
        let r = resolver(SourceMode::Cache, None, cache_data());
        let err = r.sync().await.unwrap_err();
        assert_eq!(crate::core::error::exit_code(&err), 5);
    }
}
