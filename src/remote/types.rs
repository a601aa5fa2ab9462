//! Remote API types
//!
//! Response DTOs for the meeting-notes service. Only the consumed fields
//! are modeled; everything defaults so schema drift does not break parsing.

use serde::Deserialize;

use crate::core::model::{Folder, Meeting, Person, Segment};

/// One page of the cursor-paginated document listing. The cursor is opaque
/// and absent on the last page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentsPage {
    #[serde(alias = "documents")]
    pub docs: Vec<Meeting>,
    pub next_cursor: Option<String>,
}

/// Transcript responses come back as a bare segment array or wrapped in an
/// object with a `transcript` field. Anything else reads as empty.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TranscriptResponse {
    Bare(Vec<Segment>),
    Wrapped {
        #[serde(default)]
        transcript: Vec<Segment>,
    },
    Other(serde_json::Value),
}

impl TranscriptResponse {
    pub fn into_segments(self) -> Vec<Segment> {
        match self {
            TranscriptResponse::Bare(segments) => segments,
            TranscriptResponse::Wrapped { transcript } => transcript,
            TranscriptResponse::Other(_) => Vec::new(),
        }
    }
}

/// Folder listing response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FolderListResponse {
    #[serde(alias = "document_lists")]
    pub lists: Vec<RemoteFolder>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoteFolder {
    pub id: String,
    pub title: Option<String>,
    pub document_ids: Vec<String>,
    pub visibility: Option<String>,
    #[serde(alias = "is_shared")]
    pub shared: Option<bool>,
    pub deleted_at: Option<String>,
}

impl From<RemoteFolder> for Folder {
    fn from(remote: RemoteFolder) -> Self {
        Folder {
            id: remote.id,
            title: remote.title.unwrap_or_default(),
            document_ids: remote.document_ids,
            shared: remote
                .shared
                .unwrap_or(remote.visibility.as_deref() == Some("shared")),
            visibility: remote.visibility,
            deleted: remote.deleted_at.is_some(),
        }
    }
}

/// People responses: bare array or `{"people": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PeopleResponse {
    Bare(Vec<Person>),
    Wrapped {
        #[serde(default)]
        people: Vec<Person>,
    },
}

impl PeopleResponse {
    pub fn into_people(self) -> Vec<Person> {
        match self {
            PeopleResponse::Bare(people) => people,
            PeopleResponse::Wrapped { people } => people,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_shapes() {
        let bare: TranscriptResponse = serde_json::from_str(r#"[{"text": "hi"}]"#).unwrap();
        assert_eq!(bare.into_segments().len(), 1);

        let wrapped: TranscriptResponse =
            serde_json::from_str(r#"{"transcript": [{"text": "hi"}, {"text": "there"}]}"#).unwrap();
        assert_eq!(wrapped.into_segments().len(), 2);

        let neither: TranscriptResponse = serde_json::from_str(r#"{"status": "empty"}"#).unwrap();
        assert!(neither.into_segments().is_empty());
    }

    #[test]
    fn test_folder_conversion() {
        let remote = RemoteFolder {
            id: "f1".into(),
            title: Some("Sales".into()),
            document_ids: vec!["a1".into()],
            visibility: Some("shared".into()),
            shared: None,
            deleted_at: None,
        };
        let folder: Folder = remote.into();
        assert!(folder.shared);
        assert!(!folder.deleted);
        assert_eq!(folder.member_count(), 1);
    }
}
