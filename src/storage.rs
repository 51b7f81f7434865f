/// Session persistence against chrome.storage.local.
///
/// The whole name -> session mapping lives under one well-known key and is
/// rewritten on every mutation. Callers apply a mutation to a clone, issue
/// the write, and commit the clone to their in-memory mirror only on
/// success, so a failed write leaves memory at the last persisted state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::tab_data::{SavedTab, SessionRecord, StoredSession};

/// Storage key holding the entire session mapping.
pub const STORAGE_KEY: &str = "tidyTabSessions";

// Import JS bridge functions
#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

/// Name -> session mapping, persisted as a whole.
///
/// Names are unique keys; iteration is in name order so the session list
/// renders deterministically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionMapping {
    sessions: BTreeMap<String, StoredSession>,
}

impl SessionMapping {
    pub fn new() -> SessionMapping {
        SessionMapping::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StoredSession> {
        self.sessions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoredSession)> {
        self.sessions.iter()
    }

    /// Capture `tabs` under `name`, computing metadata at this instant.
    ///
    /// The name is trimmed; a blank name is rejected. An existing record
    /// under the same name is overwritten, last write wins.
    pub fn save(&mut self, name: &str, tabs: Vec<SavedTab>, timestamp: f64) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.sessions.insert(
            name.to_string(),
            StoredSession::Current(SessionRecord::capture(tabs, timestamp)),
        );
        true
    }

    /// Move a record to a new name.
    ///
    /// No-ops when the new name trims to empty or to the old name, or when
    /// the old name is absent. An existing record under the new name is
    /// silently overwritten, same policy as save.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == old_name {
            return false;
        }
        match self.sessions.remove(old_name) {
            Some(record) => {
                self.sessions.insert(new_name.to_string(), record);
                true
            }
            None => false,
        }
    }

    /// Remove a record. An absent name is a no-op, not an error.
    pub fn delete(&mut self, name: &str) -> bool {
        self.sessions.remove(name).is_some()
    }
}

/// Read the whole mapping from the host store.
///
/// Absent or malformed data yields an empty mapping; a read error is
/// logged and also yields an empty mapping rather than propagating.
pub async fn load_sessions() -> SessionMapping {
    let value = match getStorage(STORAGE_KEY).await {
        Ok(value) => value,
        Err(e) => {
            log::error!("Failed to read session storage: {:?}", e);
            return SessionMapping::new();
        }
    };

    if value.is_null() || value.is_undefined() {
        return SessionMapping::new();
    }

    match serde_wasm_bindgen::from_value(value) {
        Ok(mapping) => mapping,
        Err(e) => {
            log::warn!("Discarding malformed session data: {:?}", e);
            SessionMapping::new()
        }
    }
}

/// Write the whole mapping back under the well-known key.
pub async fn persist_sessions(mapping: &SessionMapping) -> Result<(), String> {
    let value = serde_wasm_bindgen::to_value(mapping)
        .map_err(|e| format!("Failed to serialize sessions: {:?}", e))?;
    setStorage(STORAGE_KEY, value)
        .await
        .map_err(|e| format!("Failed to persist sessions: {:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(urls: &[&str]) -> Vec<SavedTab> {
        urls.iter()
            .map(|url| SavedTab {
                url: url.to_string(),
                title: String::new(),
                fav_icon_url: None,
                pinned: false,
            })
            .collect()
    }

    #[test]
    fn test_save_then_read_back() {
        let mut mapping = SessionMapping::new();
        let tabs = descriptors(&["https://a.com/x", "https://b.com/y"]);
        assert!(mapping.save("work", tabs.clone(), 10.0));

        let session = mapping.get("work").unwrap();
        assert_eq!(session.tabs(), tabs.as_slice());
        let info = session.info();
        assert_eq!(info.tab_count, 2);
        assert_eq!(info.timestamp, Some(10.0));
    }

    #[test]
    fn test_save_computes_metadata() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com/x", "https://b.com/y"]), 1.0);

        match mapping.get("work").unwrap() {
            StoredSession::Current(record) => {
                let metadata = record.metadata.unwrap();
                assert_eq!(metadata.tab_count, 2);
                assert_eq!(metadata.pinned_count, 0);
                assert_eq!(metadata.domains, 2);
            }
            StoredSession::Legacy(_) => panic!("save must write the current shape"),
        }
    }

    #[test]
    fn test_save_trims_name() {
        let mut mapping = SessionMapping::new();
        assert!(mapping.save("  work  ", descriptors(&["https://a.com"]), 1.0));
        assert!(mapping.get("work").is_some());
        assert!(mapping.get("  work  ").is_none());
    }

    #[test]
    fn test_save_rejects_blank_name() {
        let mut mapping = SessionMapping::new();
        assert!(!mapping.save("", descriptors(&["https://a.com"]), 1.0));
        assert!(!mapping.save("   ", descriptors(&["https://a.com"]), 1.0));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_save_overwrites_last_write_wins() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com"]), 1.0);
        mapping.save("work", descriptors(&["https://b.com"]), 2.0);

        assert_eq!(mapping.len(), 1);
        let session = mapping.get("work").unwrap();
        assert_eq!(session.tabs()[0].url, "https://b.com");
        assert_eq!(session.info().timestamp, Some(2.0));
    }

    #[test]
    fn test_rename_moves_record() {
        let mut mapping = SessionMapping::new();
        mapping.save("old", descriptors(&["https://a.com"]), 1.0);

        assert!(mapping.rename("old", "new"));
        assert!(mapping.get("old").is_none());
        assert_eq!(mapping.get("new").unwrap().tabs()[0].url, "https://a.com");
    }

    #[test]
    fn test_rename_round_trip_restores_record() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com"]), 7.0);
        let original = mapping.get("work").cloned().unwrap();

        assert!(mapping.rename("work", "play"));
        assert!(mapping.rename("play", "work"));
        assert_eq!(mapping.get("work"), Some(&original));
    }

    #[test]
    fn test_rename_no_ops() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com"]), 1.0);
        let before = mapping.clone();

        assert!(!mapping.rename("work", ""));
        assert!(!mapping.rename("work", "   "));
        assert!(!mapping.rename("work", " work "));
        assert!(!mapping.rename("missing", "new"));
        assert_eq!(mapping, before);
    }

    #[test]
    fn test_rename_collision_overwrites() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com"]), 1.0);
        mapping.save("play", descriptors(&["https://b.com"]), 2.0);

        assert!(mapping.rename("work", "play"));
        assert_eq!(mapping.len(), 1);
        // the renamed record wins over the pre-existing one
        assert_eq!(mapping.get("play").unwrap().tabs()[0].url, "https://a.com");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com"]), 1.0);

        assert!(mapping.delete("work"));
        let after_first = mapping.clone();
        assert!(!mapping.delete("work"));
        assert_eq!(mapping, after_first);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_mapping_parses_mixed_legacy_and_current_entries() {
        let json = r#"{
            "old stuff": [{"url": "https://a.com", "title": "A"}],
            "work": {
                "tabs": [{"url": "https://b.com", "title": "B", "pinned": false}],
                "timestamp": 3.0,
                "metadata": {"tabCount": 1, "pinnedCount": 0, "domains": 1}
            }
        }"#;
        let mapping: SessionMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(mapping.get("old stuff").unwrap().info().is_legacy);
        assert!(!mapping.get("work").unwrap().info().is_legacy);
    }

    #[test]
    fn test_mapping_serializes_as_plain_object() {
        let mut mapping = SessionMapping::new();
        mapping.save("work", descriptors(&["https://a.com"]), 1.0);

        let json = serde_json::to_value(&mapping).unwrap();
        assert!(json.is_object());
        assert!(json["work"]["tabs"].is_array());
    }

    #[test]
    fn test_malformed_mapping_fails_parse() {
        // load_sessions maps this failure to an empty mapping
        assert!(serde_json::from_str::<SessionMapping>(r#"{"work": 42}"#).is_err());
        assert!(serde_json::from_str::<SessionMapping>(r#""nonsense""#).is_err());
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let mut mapping = SessionMapping::new();
        mapping.save("zebra", descriptors(&["https://z.com"]), 1.0);
        mapping.save("alpha", descriptors(&["https://a.com"]), 2.0);

        let names: Vec<&String> = mapping.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "zebra"]);
    }
}
