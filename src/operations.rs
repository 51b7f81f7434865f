/// View-model operations: search filtering, domain grouping, selection.

use std::collections::HashSet;

use crate::domain::extract_domain;
use crate::tab_data::TabInfo;

/// Case-insensitive substring filter over title OR URL.
///
/// A blank query matches every tab. The result is a stable subsequence of
/// the input, never a re-sort.
pub fn filter_tabs(tabs: &[TabInfo], query: &str) -> Vec<TabInfo> {
    if query.is_empty() {
        return tabs.to_vec();
    }
    let needle = query.to_lowercase();
    tabs.iter()
        .filter(|tab| {
            tab.title.to_lowercase().contains(&needle) || tab.url.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Group an already-filtered sequence by domain.
///
/// Buckets appear in first-seen-domain order and each bucket preserves the
/// relative order of the input, so concatenating all buckets partitions the
/// input exactly.
pub fn group_by_domain(tabs: &[TabInfo]) -> Vec<(String, Vec<TabInfo>)> {
    let mut groups: Vec<(String, Vec<TabInfo>)> = Vec::new();
    for tab in tabs {
        let domain = extract_domain(&tab.url);
        match groups.iter_mut().find(|(key, _)| *key == domain) {
            Some((_, bucket)) => bucket.push(tab.clone()),
            None => groups.push((domain, vec![tab.clone()])),
        }
    }
    groups
}

/// Toggle a tab id in a selection set, returning the updated set.
///
/// The input set is left untouched so state handles can detect the change
/// by equality.
pub fn toggle_selection(selected: &HashSet<i32>, tab_id: i32) -> HashSet<i32> {
    let mut next = selected.clone();
    if !next.remove(&tab_id) {
        next.insert(tab_id);
    }
    next
}

/// Popup view state, advanced immutably through [`ViewAction`]s.
///
/// `tabs` mirrors the host's open-tab set as of the last completed query;
/// the selection lives only as long as the popup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub tabs: Vec<TabInfo>,
    pub search_query: String,
    pub group_by_domain: bool,
    pub selected: HashSet<i32>,
}

pub enum ViewAction {
    /// A completed host query; replaces the tab list wholesale. When
    /// queries overlap, whichever snapshot lands last wins.
    TabsLoaded(Vec<TabInfo>),
    SearchChanged(String),
    ToggleGrouping,
    ToggleSelect(i32),
    ClearSelection,
}

impl ViewState {
    pub fn apply(&self, action: ViewAction) -> ViewState {
        let mut next = self.clone();
        match action {
            ViewAction::TabsLoaded(snapshot) => {
                // Drop selected ids that no longer exist in the live set
                let live: HashSet<i32> = snapshot.iter().map(|tab| tab.id).collect();
                next.selected.retain(|id| live.contains(id));
                next.tabs = snapshot;
            }
            ViewAction::SearchChanged(query) => next.search_query = query,
            ViewAction::ToggleGrouping => next.group_by_domain = !self.group_by_domain,
            ViewAction::ToggleSelect(tab_id) => {
                next.selected = toggle_selection(&self.selected, tab_id)
            }
            ViewAction::ClearSelection => next.selected.clear(),
        }
        next
    }

    pub fn filtered(&self) -> Vec<TabInfo> {
        filter_tabs(&self.tabs, &self.search_query)
    }

    pub fn grouped(&self) -> Vec<(String, Vec<TabInfo>)> {
        group_by_domain(&self.filtered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: i32, url: &str, title: &str) -> TabInfo {
        TabInfo {
            id,
            url: url.to_string(),
            title: title.to_string(),
            fav_icon_url: None,
            pinned: false,
            active: false,
            discarded: false,
            index: None,
            window_id: None,
        }
    }

    fn sample_tabs() -> Vec<TabInfo> {
        vec![
            tab(1, "https://a.com/x", "A"),
            tab(2, "https://b.com/y", "B"),
        ]
    }

    #[test]
    fn test_filter_matches_url() {
        let filtered = filter_tabs(&sample_tabs(), "a.com");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_filter_matches_title_case_insensitively() {
        let tabs = vec![tab(1, "https://x.com", "Rust Book"), tab(2, "https://y.com", "News")];
        let filtered = filter_tabs(&tabs, "rUsT");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_filter_blank_query_matches_all() {
        let tabs = sample_tabs();
        assert_eq!(filter_tabs(&tabs, ""), tabs);
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let tabs = vec![
            tab(3, "https://a.com/3", "zz"),
            tab(1, "https://a.com/1", "aa"),
            tab(2, "https://a.com/2", "mm"),
        ];
        let ids: Vec<i32> = filter_tabs(&tabs, "a.com").iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        assert!(filter_tabs(&sample_tabs(), "zzz").is_empty());
    }

    #[test]
    fn test_group_partitions_input_exactly() {
        let tabs = vec![
            tab(1, "https://a.com/1", "A1"),
            tab(2, "https://b.com/1", "B1"),
            tab(3, "https://a.com/2", "A2"),
            tab(4, "junk", "J"),
        ];
        let groups = group_by_domain(&tabs);

        let flattened: Vec<i32> = groups
            .iter()
            .flat_map(|(_, bucket)| bucket.iter().map(|t| t.id))
            .collect();
        let mut sorted = flattened.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4]);

        for (domain, bucket) in &groups {
            for tab in bucket {
                assert_eq!(&extract_domain(&tab.url), domain);
            }
        }
    }

    #[test]
    fn test_group_first_seen_order_and_bucket_order() {
        let tabs = vec![
            tab(1, "https://b.com/1", "B1"),
            tab(2, "https://a.com/1", "A1"),
            tab(3, "https://b.com/2", "B2"),
        ];
        let groups = group_by_domain(&tabs);
        assert_eq!(groups[0].0, "b.com");
        assert_eq!(groups[1].0, "a.com");
        let b_ids: Vec<i32> = groups[0].1.iter().map(|t| t.id).collect();
        assert_eq!(b_ids, vec![1, 3]);
    }

    #[test]
    fn test_group_unparseable_urls_land_in_other() {
        let tabs = vec![tab(1, "nope", "N"), tab(2, "also nope", "M")];
        let groups = group_by_domain(&tabs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "other");
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_toggle_selection_is_idempotent_per_id() {
        let empty = HashSet::new();
        let once = toggle_selection(&empty, 5);
        assert!(once.contains(&5));
        let twice = toggle_selection(&once, 5);
        assert_eq!(twice, empty);
    }

    #[test]
    fn test_selection_does_not_affect_views() {
        let mut state = ViewState::default();
        state.tabs = sample_tabs();
        let before = (state.filtered(), state.grouped());
        let toggled = state.apply(ViewAction::ToggleSelect(1));
        assert_eq!(before.0, toggled.filtered());
        assert_eq!(before.1, toggled.grouped());
    }

    #[test]
    fn test_last_snapshot_wins() {
        // Two overlapping refreshes: whichever completes last replaces the
        // list wholesale
        let first = vec![tab(1, "https://a.com", "A")];
        let second = vec![tab(2, "https://b.com", "B")];
        let state = ViewState::default()
            .apply(ViewAction::TabsLoaded(first))
            .apply(ViewAction::TabsLoaded(second.clone()));
        assert_eq!(state.tabs, second);
    }

    #[test]
    fn test_snapshot_load_prunes_stale_selection() {
        let state = ViewState::default()
            .apply(ViewAction::TabsLoaded(sample_tabs()))
            .apply(ViewAction::ToggleSelect(1))
            .apply(ViewAction::ToggleSelect(2))
            .apply(ViewAction::TabsLoaded(vec![tab(2, "https://b.com/y", "B")]));
        assert_eq!(state.selected, HashSet::from([2]));
    }

    #[test]
    fn test_clear_selection() {
        let state = ViewState::default()
            .apply(ViewAction::TabsLoaded(sample_tabs()))
            .apply(ViewAction::ToggleSelect(1))
            .apply(ViewAction::ClearSelection);
        assert!(state.selected.is_empty());
    }

    #[test]
    fn test_toggle_grouping_flips() {
        let state = ViewState::default().apply(ViewAction::ToggleGrouping);
        assert!(state.group_by_domain);
        assert!(!state.apply(ViewAction::ToggleGrouping).group_by_domain);
    }

    #[test]
    fn test_search_feeds_filtered_view() {
        let mut state = ViewState::default();
        state.tabs = sample_tabs();
        let searched = state.apply(ViewAction::SearchChanged("b.com".to_string()));
        let ids: Vec<i32> = searched.filtered().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);
    }
}
