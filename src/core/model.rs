//! Domain records
//!
//! Canonical shapes shared by the remote API and the cache snapshot. Both
//! sides speak loosely-typed JSON, so normalization happens here, at
//! ingestion: shape-varying fields (attendee lists that arrive as either an
//! array or a keyed map, event start times that arrive as either a string or
//! an object) are converted into one canonical representation before any
//! filtering runs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::doc::DocNode;

/// A meeting document. Produced fresh per request, immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meeting {
    pub id: String,
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Document type discriminator; only "meeting" records are surfaced.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub trashed: Option<bool>,
    pub notes_plain: Option<String>,
    pub notes_markdown: Option<String>,
    #[serde(deserialize_with = "attendees_list_or_map")]
    pub people: Vec<Attendee>,
    #[serde(alias = "google_calendar_event")]
    pub calendar_event: Option<CalendarEvent>,
    pub last_viewed_panel: Option<Panel>,
    pub workspace_id: Option<String>,
}

impl Meeting {
    pub fn is_trashed(&self) -> bool {
        self.trashed.unwrap_or(false)
    }

    /// True for "meeting" documents. A missing discriminator passes: absent
    /// data never excludes a record.
    pub fn is_meeting(&self) -> bool {
        match self.kind.as_deref() {
            Some(kind) => kind == "meeting",
            None => true,
        }
    }

    /// Best-available date for window filtering: creation time, else update
    /// time, else the linked calendar event's start.
    pub fn best_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
            .or_else(|| parse_timestamp(self.updated_at.as_deref()))
            .or_else(|| self.calendar_event.as_ref().and_then(|e| e.start_time()))
    }

    /// Recency key for sorting: update time, else creation time, else epoch.
    pub fn recency(&self) -> DateTime<Utc> {
        parse_timestamp(self.updated_at.as_deref())
            .or_else(|| parse_timestamp(self.created_at.as_deref()))
            .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_default())
    }

    /// Notes text for free-text matching and plain rendering: markdown
    /// variant first, plain text when no markdown is present.
    pub fn notes_text(&self) -> Option<&str> {
        self.notes_markdown
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.notes_plain.as_deref())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// One attendee entry on a meeting or its calendar event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attendee {
    #[serde(alias = "displayName", alias = "display_name")]
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Attendee {
    /// Case-insensitive substring match against name or email.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(needle_lower))
            || self
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(needle_lower))
    }
}

/// Linked calendar event. Its start time and attendee list back up the
/// meeting's own fields for date/attendee filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarEvent {
    pub start: Option<EventStart>,
    pub attendees: Vec<Attendee>,
}

impl CalendarEvent {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start.as_ref().and_then(EventStart::parse)
    }
}

/// Event start, either a bare timestamp string or an object with a
/// `dateTime` (or all-day `date`) field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventStart {
    Timestamp(String),
    Structured {
        #[serde(default, alias = "dateTime")]
        date_time: Option<String>,
        #[serde(default)]
        date: Option<String>,
    },
}

impl EventStart {
    fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            EventStart::Timestamp(s) => parse_timestamp(Some(s)),
            EventStart::Structured { date_time, date } => {
                parse_timestamp(date_time.as_deref()).or_else(|| parse_timestamp(date.as_deref()))
            }
        }
    }
}

/// AI summary panel attached to a meeting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Panel {
    pub title: Option<String>,
    pub content: Option<DocNode>,
}

/// One transcript utterance. Order within a transcript is chronological and
/// preserved end to end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub text: String,
    pub speaker: Option<String>,
    /// Audio channel tag: "microphone" is local input, anything else is
    /// remote/system audio.
    pub source: Option<String>,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
}

impl Segment {
    /// Explicit speaker label, else one inferred from the source channel.
    pub fn speaker_label(&self) -> &str {
        if let Some(speaker) = self.speaker.as_deref() {
            if !speaker.is_empty() {
                return speaker;
            }
        }
        match self.source.as_deref() {
            Some("microphone") => "You",
            Some(_) => "Them",
            None => "Unknown",
        }
    }
}

/// A person record from the service. Non-exhaustive on the remote side, so
/// everything beyond name and email is kept loosely typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A folder with its membership list and derived attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    pub id: String,
    pub title: String,
    pub document_ids: Vec<String>,
    pub visibility: Option<String>,
    pub shared: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl Folder {
    pub fn member_count(&self) -> usize {
        self.document_ids.len()
    }

    /// Exact id or case-insensitive title substring.
    pub fn matches(&self, id_or_name: &str) -> bool {
        self.id == id_or_name
            || self
                .title
                .to_lowercase()
                .contains(&id_or_name.to_lowercase())
    }
}

/// A workspace, loosely typed beyond id and name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub id: Option<String>,
    #[serde(alias = "display_name")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Workspace payloads arrive as a bare array or a map; entries may nest the
/// record under a `workspace` key. Unparseable entries are skipped.
pub fn flatten_workspaces(value: &Value) -> Vec<Workspace> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };
    entries
        .into_iter()
        .map(|v| v.get("workspace").unwrap_or(v))
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}

/// Tolerant timestamp parse: RFC 3339, else a bare date. Malformed values
/// read as missing, never as errors.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Attendee lists arrive as either a JSON array or a map keyed by some id.
/// Both become one ordered sequence (map values in the document's own key
/// order); entries that are not objects are skipped.
fn attendees_list_or_map<'de, D>(deserializer: D) -> Result<Vec<Attendee>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(_, v)| match v {
                Value::Object(_) => serde_json::from_value(v).ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
