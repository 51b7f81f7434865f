/// Data structures for Tidy Tabs
use serde::{Deserialize, Serialize};

use crate::domain::count_distinct_domains;

/// Mirror of a browser tab as reported by the host tabs API.
///
/// The host owns the tab's lifecycle; this struct is only ever a snapshot.
/// Optional fields default so a sparse payload never fails the whole query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: i32,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub discarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
}

/// Minimal tab descriptor captured into a saved session.
///
/// `pinned` defaults to false so legacy records, which never stored the
/// flag, still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTab {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub pinned: bool,
}

impl SavedTab {
    pub fn from_tab(tab: &TabInfo) -> SavedTab {
        SavedTab {
            url: tab.url.clone(),
            title: tab.title.clone(),
            fav_icon_url: tab.fav_icon_url.clone(),
            pinned: tab.pinned,
        }
    }
}

/// Derived counts for a saved session, computed once at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub tab_count: usize,
    pub pinned_count: usize,
    pub domains: usize,
}

impl SessionMetadata {
    pub fn compute(tabs: &[SavedTab]) -> SessionMetadata {
        SessionMetadata {
            tab_count: tabs.len(),
            pinned_count: tabs.iter().filter(|tab| tab.pinned).count(),
            domains: count_distinct_domains(tabs.iter().map(|tab| tab.url.as_str())),
        }
    }
}

/// A named, timestamped capture of a tab set.
///
/// `tabs` is an owned copy; closing or navigating the real tabs afterwards
/// never changes a saved record. `timestamp` is JS epoch millis, set once.
/// `metadata` is optional on read (older records predate it) but always
/// written alongside the tabs it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub tabs: Vec<SavedTab>,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,
}

impl SessionRecord {
    /// Capture a tab set, computing metadata from it at this instant.
    pub fn capture(tabs: Vec<SavedTab>, timestamp: f64) -> SessionRecord {
        let metadata = Some(SessionMetadata::compute(&tabs));
        SessionRecord {
            tabs,
            timestamp,
            metadata,
        }
    }
}

/// A stored session: either the current record shape or the legacy bare
/// array of descriptors written by early versions. Legacy entries are
/// recognized and displayed as-is, never rewritten in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSession {
    Current(SessionRecord),
    Legacy(Vec<SavedTab>),
}

/// Display summary for one stored session, shape-independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionInfo {
    pub tab_count: usize,
    pub domains: usize,
    pub timestamp: Option<f64>,
    pub is_legacy: bool,
}

impl StoredSession {
    pub fn tabs(&self) -> &[SavedTab] {
        match self {
            StoredSession::Current(record) => &record.tabs,
            StoredSession::Legacy(tabs) => tabs,
        }
    }

    pub fn info(&self) -> SessionInfo {
        match self {
            StoredSession::Current(record) => SessionInfo {
                tab_count: record
                    .metadata
                    .map(|m| m.tab_count)
                    .unwrap_or(record.tabs.len()),
                domains: record.metadata.map(|m| m.domains).unwrap_or(0),
                timestamp: Some(record.timestamp),
                is_legacy: false,
            },
            StoredSession::Legacy(tabs) => SessionInfo {
                tab_count: tabs.len(),
                domains: 0,
                timestamp: None,
                is_legacy: true,
            },
        }
    }
}
