//! Cross-surface messages.
//!
//! The popup and the options page push configuration changes to every open
//! listing tab; the background script relays context-menu clicks. Delivery
//! is best effort: a tab that is not listening yet simply misses the push
//! and reads the full configuration from the store when it starts.

use serde::{Deserialize, Serialize};

use crate::config::{BlockConfig, ListKind};
use crate::list::BlockList;

/// Full settings as pushed by the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    pub master_enabled: bool,
    pub streamer_enabled: bool,
    pub tag_enabled: bool,
    #[serde(default)]
    pub blocked_streamers: BlockList,
    #[serde(default)]
    pub blocked_tags: BlockList,
}

impl From<BlockSettings> for BlockConfig {
    fn from(settings: BlockSettings) -> Self {
        Self {
            blocked_streamers: settings.blocked_streamers,
            blocked_tags: settings.blocked_tags,
            master_enabled: settings.master_enabled,
            streamer_filter_enabled: settings.streamer_enabled,
            tag_filter_enabled: settings.tag_enabled,
        }
    }
}

impl From<&BlockConfig> for BlockSettings {
    fn from(config: &BlockConfig) -> Self {
        Self {
            master_enabled: config.master_enabled,
            streamer_enabled: config.streamer_filter_enabled,
            tag_enabled: config.tag_filter_enabled,
            blocked_streamers: config.blocked_streamers.clone(),
            blocked_tags: config.blocked_tags.clone(),
        }
    }
}

/// Messages delivered to the content script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum InboundMessage {
    /// Replace whichever lists are present.
    #[serde(rename = "updateBlockList", rename_all = "camelCase")]
    UpdateBlockList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blocked_streamers: Option<BlockList>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blocked_tags: Option<BlockList>,
    },
    /// Replace the whole configuration atomically.
    #[serde(rename = "updateBlockSettings")]
    UpdateBlockSettings { settings: BlockSettings },
    /// The extension menu item was clicked; act on the pending card.
    #[serde(rename = "handleContextMenu")]
    HandleContextMenu,
}

impl InboundMessage {
    /// Push replacing a single list.
    pub fn list_update(kind: ListKind, list: BlockList) -> Self {
        match kind {
            ListKind::Streamers => Self::UpdateBlockList {
                blocked_streamers: Some(list),
                blocked_tags: None,
            },
            ListKind::Tags => Self::UpdateBlockList {
                blocked_streamers: None,
                blocked_tags: Some(list),
            },
        }
    }

    /// Push replacing the whole configuration.
    pub fn settings(config: &BlockConfig) -> Self {
        Self::UpdateBlockSettings {
            settings: config.into(),
        }
    }
}

/// Messages sent by the content script to the background script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum OutboundMessage {
    /// Relabel the extension context-menu item.
    #[serde(rename = "updateContextMenu")]
    UpdateContextMenu { title: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_list_update() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"action": "updateBlockList", "blockedTags": ["x"]}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::UpdateBlockList {
                blocked_streamers: None,
                blocked_tags: Some(["x"].into_iter().collect()),
            }
        );
    }

    #[test]
    fn test_empty_list_still_replaces() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"action": "updateBlockList", "blockedStreamers": []}"#).unwrap();
        match msg {
            InboundMessage::UpdateBlockList { blocked_streamers, .. } => {
                assert_eq!(blocked_streamers, Some(BlockList::new()));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_parse_settings_and_menu_click() {
        let msg: InboundMessage = serde_json::from_str(
            r#"{"action": "updateBlockSettings", "settings": {
                "masterEnabled": false, "streamerEnabled": true, "tagEnabled": true,
                "blockedStreamers": ["A"], "blockedTags": []}}"#,
        )
        .unwrap();
        let InboundMessage::UpdateBlockSettings { settings } = msg else {
            panic!("expected settings");
        };
        let config = BlockConfig::from(settings);
        assert!(!config.master_enabled);
        assert!(config.blocked_streamers.contains("A"));

        let click: InboundMessage = serde_json::from_str(r#"{"action": "handleContextMenu"}"#).unwrap();
        assert_eq!(click, InboundMessage::HandleContextMenu);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(serde_json::from_str::<InboundMessage>(r#"{"action": "reboot"}"#).is_err());
    }

    #[test]
    fn test_list_update_carries_one_key() {
        let msg = InboundMessage::list_update(ListKind::Tags, BlockList::new());
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"action":"updateBlockList","blockedTags":[]}"#
        );
    }

    #[test]
    fn test_outbound_shape() {
        let msg = OutboundMessage::UpdateContextMenu { title: "Hide streamer".to_string() };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"action":"updateContextMenu","title":"Hide streamer"}"#
        );
    }
}
