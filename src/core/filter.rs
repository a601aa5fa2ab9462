//! List filtering and ordering
//!
//! The predicates here are the single definition of list semantics: both the
//! remote client and the cache store call `matches`, so results are
//! consistent regardless of origin. All filters are conjunctive; absent or
//! malformed inputs make a filter non-restrictive, never an error.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::model::{parse_timestamp, Meeting};

pub const DEFAULT_LIMIT: usize = 20;

/// Filters for a meeting list query. Bounds are kept as the raw user
/// strings; malformed values parse to no bound.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub limit: usize,
    pub workspace: Option<String>,
    pub folder: Option<String>,
    pub attendee: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub query: Option<String>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            workspace: None,
            folder: None,
            attendee: None,
            since: None,
            until: None,
            query: None,
        }
    }
}

impl ListFilter {
    pub fn since_bound(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.since.as_deref())
    }

    pub fn until_bound(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.until.as_deref())
    }

    /// Full predicate for one record. `folder_members` is the resolved
    /// membership set when a folder filter is active (resolved once, up
    /// front, by the source).
    pub fn matches(&self, meeting: &Meeting, folder_members: Option<&HashSet<String>>) -> bool {
        if !meeting.is_meeting() || meeting.is_trashed() {
            return false;
        }
        if let Some(ws) = &self.workspace {
            if meeting.workspace_id.as_deref() != Some(ws.as_str()) {
                return false;
            }
        }
        if let Some(members) = folder_members {
            if !members.contains(&meeting.id) {
                return false;
            }
        }
        if !matches_date(meeting, self.since_bound(), self.until_bound()) {
            return false;
        }
        if let Some(attendee) = &self.attendee {
            if !matches_attendee(meeting, attendee) {
                return false;
            }
        }
        if let Some(query) = &self.query {
            if !matches_query(meeting, query) {
                return false;
            }
        }
        true
    }
}

/// Date-window check against the record's best-available date. Records with
/// no usable date always pass.
pub fn matches_date(
    meeting: &Meeting,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> bool {
    let Some(date) = meeting.best_date() else {
        return true;
    };
    if let Some(since) = since {
        if date < since {
            return false;
        }
    }
    if let Some(until) = until {
        if date > until {
            return false;
        }
    }
    true
}

/// Case-insensitive substring match against any attendee name or email,
/// over the record's own people list and the calendar event's attendees.
pub fn matches_attendee(meeting: &Meeting, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    meeting.people.iter().any(|a| a.matches(&needle))
        || meeting
            .calendar_event
            .as_ref()
            .is_some_and(|e| e.attendees.iter().any(|a| a.matches(&needle)))
}

/// Case-insensitive substring match against title or notes.
pub fn matches_query(meeting: &Meeting, query: &str) -> bool {
    let query = query.to_lowercase();
    meeting
        .title
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains(&query))
        || meeting
            .notes_text()
            .is_some_and(|n| n.to_lowercase().contains(&query))
}

/// Stable sort by descending recency; ties keep fetch order.
pub fn sort_by_recency(meetings: &mut [Meeting]) {
    meetings.sort_by(|a, b| b.recency().cmp(&a.recency()));
}
