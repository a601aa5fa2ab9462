//! Cache data source
//!
//! Reads the service's on-disk snapshot and answers the same logical
//! queries as the remote client, through the shared predicates in
//! `core::filter`. The snapshot is loaded once per invocation and treated
//! as a read-only point-in-time view; references between its maps may
//! dangle, so every lookup answers "not found" instead of failing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::core::filter::ListFilter;
use crate::core::model::{flatten_workspaces, Folder, Meeting, Panel, Person, Segment, Workspace};
use crate::core::resolver::DataSource;

/// Parsed snapshot state. Field names follow the snapshot's own wire
/// casing; every map defaults to empty so partial snapshots still load.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SnapshotState {
    documents: serde_json::Map<String, Value>,
    transcripts: serde_json::Map<String, Value>,
    document_panels: serde_json::Map<String, Value>,
    document_lists: HashMap<String, Vec<String>>,
    document_lists_metadata: serde_json::Map<String, Value>,
    people: serde_json::Map<String, Value>,
    workspaces: Value,
    shared_documents: serde_json::Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FolderMeta {
    title: Option<String>,
    visibility: Option<String>,
    #[serde(alias = "is_shared")]
    shared: Option<bool>,
    deleted_at: Option<String>,
}

/// In-memory view over one loaded snapshot.
pub struct CacheStore {
    path: PathBuf,
    meetings: HashMap<String, Meeting>,
    state: SnapshotState,
}

impl CacheStore {
    /// Load and parse the snapshot file. A missing or unreadable file is a
    /// hard failure; there is no implicit empty state.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read cache snapshot at {}", path.display()))?;
        let state = parse_snapshot(&raw)
            .with_context(|| format!("cannot parse cache snapshot at {}", path.display()))?;

        // Documents that do not parse as meeting records are skipped, not
        // fatal; the map key is authoritative for the id.
        let mut meetings = HashMap::new();
        for (id, value) in &state.documents {
            if let Ok(mut meeting) = serde_json::from_value::<Meeting>(value.clone()) {
                if meeting.id.is_empty() {
                    meeting.id = id.clone();
                }
                meetings.insert(id.clone(), meeting);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            meetings,
            state,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meeting_by_id(&self, id: &str) -> Option<Meeting> {
        self.meetings.get(id).cloned()
    }

    /// Transcript segments in snapshot order; a dangling id reads as empty.
    pub fn transcript(&self, id: &str) -> Vec<Segment> {
        self.state
            .transcripts
            .get(id)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// The meeting's AI summary panel. When several panels exist the first
    /// one in the snapshot's own key order wins.
    pub fn enhanced_panel(&self, id: &str) -> Option<Panel> {
        let panels = self.state.document_panels.get(id)?.as_object()?;
        panels
            .values()
            .next()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// All folders, soft-deleted excluded, sorted by title without regard
    /// to case.
    pub fn folders(&self) -> Vec<Folder> {
        let mut ids: Vec<&String> = self
            .state
            .document_lists_metadata
            .keys()
            .chain(self.state.document_lists.keys())
            .collect();
        ids.sort();
        ids.dedup();

        let mut folders: Vec<Folder> = ids
            .into_iter()
            .map(|id| self.folder(id))
            .filter(|f| !f.deleted)
            .collect();
        folders.sort_by_key(|f| f.title.to_lowercase());
        folders
    }

    fn folder(&self, id: &str) -> Folder {
        let meta: FolderMeta = self
            .state
            .document_lists_metadata
            .get(id)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        let document_ids = self
            .state
            .document_lists
            .get(id)
            .cloned()
            .unwrap_or_default();
        Folder {
            id: id.to_string(),
            title: meta.title.unwrap_or_default(),
            document_ids,
            shared: meta
                .shared
                .unwrap_or(meta.visibility.as_deref() == Some("shared")),
            visibility: meta.visibility,
            deleted: meta.deleted_at.is_some(),
        }
    }

    /// Membership set for a folder given by exact id or case-insensitive
    /// title substring. Unresolved folders answer `None`.
    pub fn folder_members(&self, id_or_name: &str) -> Option<HashSet<String>> {
        self.folders()
            .into_iter()
            .find(|f| f.matches(id_or_name))
            .map(|f| f.document_ids.into_iter().collect())
    }

    /// Meetings belonging to a folder; an unresolved folder is an empty
    /// list, not an error.
    pub fn meetings_by_folder(&self, id_or_name: &str) -> Vec<Meeting> {
        let Some(members) = self.folder_members(id_or_name) else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|id| self.meeting_by_id(id))
            .filter(|m| m.is_meeting() && !m.is_trashed())
            .collect()
    }

    /// People with a non-empty display name.
    pub fn people(&self) -> Vec<Person> {
        self.state
            .people
            .values()
            .filter_map(|v| serde_json::from_value::<Person>(v.clone()).ok())
            .filter(|p| p.name.as_deref().is_some_and(|n| !n.is_empty()))
            .collect()
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        flatten_workspaces(&self.state.workspaces)
    }

    /// Documents shared with the user. Entries that only reference an id
    /// resolve through the documents map.
    pub fn shared_meetings(&self) -> Vec<Meeting> {
        self.state
            .shared_documents
            .iter()
            .filter_map(|(id, value)| match value {
                Value::Object(_) => serde_json::from_value::<Meeting>(value.clone())
                    .ok()
                    .map(|mut m| {
                        if m.id.is_empty() {
                            m.id = id.clone();
                        }
                        m
                    }),
                _ => self.meeting_by_id(id),
            })
            .filter(|m| m.is_meeting() && !m.is_trashed())
            .collect()
    }

    /// Entry counts per map, for the `cache` command.
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("documents", self.state.documents.len()),
            ("transcripts", self.state.transcripts.len()),
            ("panels", self.state.document_panels.len()),
            ("folders", self.state.document_lists.len()),
            ("people", self.state.people.len()),
            ("shared", self.state.shared_documents.len()),
        ]
    }
}

#[async_trait]
impl DataSource for CacheStore {
    async fn meetings(&self, filter: &ListFilter) -> Result<Vec<Meeting>> {
        let members = match &filter.folder {
            Some(folder) => match self.folder_members(folder) {
                Some(members) => Some(members),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        Ok(self
            .meetings
            .values()
            .filter(|m| filter.matches(m, members.as_ref()))
            .cloned()
            .collect())
    }

    async fn meeting(&self, id: &str) -> Result<Option<Meeting>> {
        Ok(self.meeting_by_id(id))
    }

    async fn transcript(&self, id: &str) -> Result<Vec<Segment>> {
        Ok(CacheStore::transcript(self, id))
    }

    async fn enhanced_panel(&self, id: &str) -> Result<Option<Panel>> {
        Ok(CacheStore::enhanced_panel(self, id))
    }

    async fn folders(&self) -> Result<Vec<Folder>> {
        Ok(CacheStore::folders(self))
    }

    async fn people(&self) -> Result<Vec<Person>> {
        Ok(CacheStore::people(self))
    }

    async fn workspaces(&self) -> Result<Vec<Workspace>> {
        Ok(CacheStore::workspaces(self))
    }

    async fn shared_meetings(&self) -> Result<Vec<Meeting>> {
        Ok(CacheStore::shared_meetings(self))
    }
}

/// Unwrap the snapshot document down to its state object. The payload under
/// the `cache` key may be double-encoded (a JSON document serialized into a
/// JSON string).
fn parse_snapshot(raw: &str) -> Result<SnapshotState> {
    let value: Value = serde_json::from_str(raw).context("snapshot is not valid JSON")?;

    let value = match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).context("double-encoded payload is not valid JSON")?
        }
        other => other,
    };
    let value = match value.get("cache").cloned() {
        Some(Value::String(inner)) => {
            serde_json::from_str(&inner).context("double-encoded payload is not valid JSON")?
        }
        Some(other) => other,
        None => value,
    };
    let state = value
        .get("state")
        .cloned()
        .context("snapshot has no state object")?;

    serde_json::from_value(state).context("state object has unexpected shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_from(state: serde_json::Value) -> CacheStore {
        let doc = serde_json::json!({
            "cache": serde_json::json!({ "state": state }).to_string(),
        });
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", doc).unwrap();
        CacheStore::load(file.path()).unwrap()
    }

    fn sample_state() -> serde_json::Value {
        serde_json::json!({
            "documents": {
                "a1": {"id": "a1", "title": "Standup", "type": "meeting",
                       "updated_at": "2024-01-10T00:00:00Z"},
                "b2": {"id": "b2", "title": "1:1 with Sam", "type": "meeting",
                       "updated_at": "2024-01-12T00:00:00Z", "trashed": true},
                "c3": {"id": "c3", "title": "Planning", "type": "meeting",
                       "updated_at": "2024-01-11T00:00:00Z"}
            },
            "transcripts": {
                "a1": [{"text": "hi", "source": "microphone"},
                       {"text": "hello", "source": "system"}]
            },
            "documentPanels": {
                "a1": {
                    "p-first": {"title": "Summary", "content":
                        {"type": "paragraph", "content": [{"type": "text", "text": "first"}]}},
                    "p-second": {"title": "Other", "content":
                        {"type": "paragraph", "content": [{"type": "text", "text": "second"}]}}
                }
            },
            "documentLists": {
                "f1": ["a1"],
                "f2": ["c3"]
            },
            "documentListsMetadata": {
                "f1": {"title": "Sales", "visibility": "shared"},
                "f2": {"title": "archive", "deleted_at": "2024-01-01T00:00:00Z"}
            },
            "people": {
                "p1": {"name": "Ada", "email": "ada@example.com"},
                "p2": {"name": "", "email": "ghost@example.com"}
            },
            "workspaces": [{"workspace": {"id": "w1", "name": "Acme"}}],
            "sharedDocuments": {
                "a1": "ref",
                "z9": {"id": "z9", "title": "Shared deck", "type": "meeting"}
            }
        })
    }

    #[tokio::test]
    async fn test_trashed_excluded_from_list() {
        let store = store_from(sample_state());
        let meetings = store.meetings(&ListFilter::default()).await.unwrap();
        let ids: Vec<&str> = meetings.iter().map(|m| m.id.as_str()).collect();
        assert!(ids.contains(&"a1"));
        assert!(ids.contains(&"c3"));
        assert!(!ids.contains(&"b2"));
    }

    #[test]
    fn test_double_encoded_payload() {
        // store_from already writes the state as a string inside "cache".
        let store = store_from(sample_state());
        assert!(store.meeting_by_id("a1").is_some());
    }

    #[test]
    fn test_plain_payload_also_loads() {
        let doc = serde_json::json!({ "cache": { "state": sample_state() } });
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", doc).unwrap();
        let store = CacheStore::load(file.path()).unwrap();
        assert!(store.meeting_by_id("c3").is_some());
    }

    #[test]
    fn test_missing_file_is_hard_failure() {
        assert!(CacheStore::load(Path::new("/nonexistent/cache.json")).is_err());
    }

    #[test]
    fn test_first_panel_by_key_order() {
        let store = store_from(sample_state());
        let panel = store.enhanced_panel("a1").unwrap();
        assert_eq!(panel.title.as_deref(), Some("Summary"));
    }

    #[test]
    fn test_dangling_ids_answer_not_found() {
        let store = store_from(sample_state());
        assert!(store.meeting_by_id("nope").is_none());
        assert!(store.transcript("nope").is_empty());
        assert!(store.enhanced_panel("nope").is_none());
        assert!(store.folder_members("nope").is_none());
        assert!(store.meetings_by_folder("nope").is_empty());
    }

    #[test]
    fn test_folders_exclude_deleted_and_sort() {
        let store = store_from(sample_state());
        let folders = store.folders();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].title, "Sales");
        assert!(folders[0].shared);
        assert_eq!(folders[0].member_count(), 1);
    }

    #[test]
    fn test_folder_resolution_by_substring() {
        let store = store_from(sample_state());
        let members = store.folder_members("Sal").unwrap();
        assert!(members.contains("a1"));
        let meetings = store.meetings_by_folder("sal");
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0].id, "a1");
    }

    #[test]
    fn test_people_require_name() {
        let store = store_from(sample_state());
        let people = store.people();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_workspaces_unwrap_nested_records() {
        let store = store_from(sample_state());
        let workspaces = store.workspaces();
        assert_eq!(workspaces.len(), 1);
        assert_eq!(workspaces[0].name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_shared_meetings_resolve_references() {
        let store = store_from(sample_state());
        let shared = store.shared_meetings();
        let ids: Vec<&str> = shared.iter().map(|m| m.id.as_str()).collect();
        assert!(ids.contains(&"a1"));
        assert!(ids.contains(&"z9"));
    }

    #[test]
    fn test_transcript_order_preserved() {
        let store = store_from(sample_state());
        let transcript = store.transcript("a1");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].speaker_label(), "You");
        assert_eq!(transcript[1].speaker_label(), "Them");
    }
}
