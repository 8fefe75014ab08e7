//! Block configuration and its store record.
//!
//! The configuration lives in an eventually-consistent key-value store shared
//! by the content script, the popup and the options page. [`StoreRecord`] is
//! the raw shape of that store (every key optional, used both for reads and
//! for partial writes); [`BlockConfig`] is the resolved in-memory mirror.

use serde::{Deserialize, Serialize};

use crate::list::BlockList;

/// Store key for the blocked streamer list.
pub const KEY_BLOCKED_STREAMERS: &str = "blockedStreamers";
/// Store key for the blocked tag list.
pub const KEY_BLOCKED_TAGS: &str = "blockedTags";
/// Store key for the master toggle.
pub const KEY_MASTER_ENABLED: &str = "masterBlockEnabled";
/// Store key for the streamer category toggle.
pub const KEY_STREAMER_ENABLED: &str = "streamerBlockEnabled";
/// Store key for the tag category toggle.
pub const KEY_TAG_ENABLED: &str = "tagBlockEnabled";

/// Every key the content script reads.
pub const STORE_KEYS: [&str; 5] = [
    KEY_BLOCKED_STREAMERS,
    KEY_BLOCKED_TAGS,
    KEY_MASTER_ENABLED,
    KEY_STREAMER_ENABLED,
    KEY_TAG_ENABLED,
];

/// Block list category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Streamers,
    Tags,
}

impl ListKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "streamers" | "streamer" | KEY_BLOCKED_STREAMERS => Some(Self::Streamers),
            "tags" | "tag" | KEY_BLOCKED_TAGS => Some(Self::Tags),
            _ => None,
        }
    }

    pub fn store_key(self) -> &'static str {
        match self {
            Self::Streamers => KEY_BLOCKED_STREAMERS,
            Self::Tags => KEY_BLOCKED_TAGS,
        }
    }

    /// Noun used in user-facing text.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Streamers => "streamer",
            Self::Tags => "tag",
        }
    }
}

/// Raw store contents, or a partial patch to write back.
///
/// Absent keys deserialize to `None` and are skipped when serializing, so a
/// record with only one field set is a one-key write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_streamers: Option<BlockList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_tags: Option<BlockList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_block_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streamer_block_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_block_enabled: Option<bool>,
}

impl StoreRecord {
    /// Patch writing a single list.
    pub fn list(kind: ListKind, list: BlockList) -> Self {
        match kind {
            ListKind::Streamers => Self {
                blocked_streamers: Some(list),
                ..Self::default()
            },
            ListKind::Tags => Self {
                blocked_tags: Some(list),
                ..Self::default()
            },
        }
    }

    pub fn list_of(&self, kind: ListKind) -> Option<&BlockList> {
        match kind {
            ListKind::Streamers => self.blocked_streamers.as_ref(),
            ListKind::Tags => self.blocked_tags.as_ref(),
        }
    }
}

/// In-memory block configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockConfig {
    pub blocked_streamers: BlockList,
    pub blocked_tags: BlockList,
    pub master_enabled: bool,
    pub streamer_filter_enabled: bool,
    pub tag_filter_enabled: bool,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            blocked_streamers: BlockList::new(),
            blocked_tags: BlockList::new(),
            master_enabled: true,
            streamer_filter_enabled: true,
            tag_filter_enabled: true,
        }
    }
}

impl BlockConfig {
    /// Resolve a store snapshot. Lists default to empty; toggles are on
    /// unless explicitly `false`.
    pub fn from_record(record: StoreRecord) -> Self {
        Self {
            blocked_streamers: record.blocked_streamers.unwrap_or_default(),
            blocked_tags: record.blocked_tags.unwrap_or_default(),
            master_enabled: record.master_block_enabled != Some(false),
            streamer_filter_enabled: record.streamer_block_enabled != Some(false),
            tag_filter_enabled: record.tag_block_enabled != Some(false),
        }
    }

    /// Full record for this configuration.
    pub fn to_record(&self) -> StoreRecord {
        StoreRecord {
            blocked_streamers: Some(self.blocked_streamers.clone()),
            blocked_tags: Some(self.blocked_tags.clone()),
            master_block_enabled: Some(self.master_enabled),
            streamer_block_enabled: Some(self.streamer_filter_enabled),
            tag_block_enabled: Some(self.tag_filter_enabled),
        }
    }

    pub fn effective_streamer_filter(&self) -> bool {
        self.master_enabled && self.streamer_filter_enabled
    }

    pub fn effective_tag_filter(&self) -> bool {
        self.master_enabled && self.tag_filter_enabled
    }

    pub fn list(&self, kind: ListKind) -> &BlockList {
        match kind {
            ListKind::Streamers => &self.blocked_streamers,
            ListKind::Tags => &self.blocked_tags,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut BlockList {
        match kind {
            ListKind::Streamers => &mut self.blocked_streamers,
            ListKind::Tags => &mut self.blocked_tags,
        }
    }

    /// Toggle states as the popup displays them.
    pub fn toggle_view(&self) -> ToggleView {
        ToggleView {
            master: self.master_enabled,
            streamer: self.master_enabled && self.streamer_filter_enabled,
            tag: self.master_enabled && self.tag_filter_enabled,
            categories_locked: !self.master_enabled,
            streamer_count: self.blocked_streamers.len(),
            tag_count: self.blocked_tags.len(),
        }
    }
}

/// Popup display state.
///
/// With the master toggle off both category switches show as off and are
/// locked; their stored values are kept so switching the master back on
/// restores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleView {
    pub master: bool,
    pub streamer: bool,
    pub tag: bool,
    pub categories_locked: bool,
    pub streamer_count: usize,
    pub tag_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_store() {
        let record: StoreRecord = serde_json::from_str("{}").unwrap();
        let config = BlockConfig::from_record(record);
        assert_eq!(config, BlockConfig::default());
        assert!(config.effective_streamer_filter());
        assert!(config.effective_tag_filter());
    }

    #[test]
    fn test_only_explicit_false_disables() {
        let record: StoreRecord = serde_json::from_str(
            r#"{"masterBlockEnabled": null, "streamerBlockEnabled": false, "tagBlockEnabled": true}"#,
        )
        .unwrap();
        let config = BlockConfig::from_record(record);
        assert!(config.master_enabled);
        assert!(!config.streamer_filter_enabled);
        assert!(config.tag_filter_enabled);
    }

    #[test]
    fn test_master_gates_categories() {
        let config = BlockConfig {
            master_enabled: false,
            ..BlockConfig::default()
        };
        assert!(!config.effective_streamer_filter());
        assert!(!config.effective_tag_filter());

        let view = config.toggle_view();
        assert!(!view.streamer);
        assert!(view.categories_locked);
    }

    #[test]
    fn test_patch_serializes_only_set_keys() {
        let list: BlockList = ["a"].into_iter().collect();
        let patch = StoreRecord::list(ListKind::Streamers, list);
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"blockedStreamers":["a"]}"#
        );
    }

    #[test]
    fn test_list_kind_parse() {
        assert_eq!(ListKind::parse("blockedTags"), Some(ListKind::Tags));
        assert_eq!(ListKind::parse("streamers"), Some(ListKind::Streamers));
        assert_eq!(ListKind::parse("users"), None);
    }
}
