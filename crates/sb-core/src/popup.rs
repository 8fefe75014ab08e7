//! Popup toggle switches and page status.

use serde::Serialize;

use crate::config::{BlockConfig, StoreRecord};

/// Host of the listing site.
pub const SITE_HOST: &str = "www.sooplive.co.kr";
/// Tab match pattern for pushes to open listing pages.
pub const LISTING_URL_PATTERN: &str = "https://www.sooplive.co.kr/*";

/// One of the popup switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupToggle {
    Master,
    Streamer,
    Tag,
}

impl PopupToggle {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "master" => Some(Self::Master),
            "streamer" | "streamers" => Some(Self::Streamer),
            "tag" | "tags" => Some(Self::Tag),
            _ => None,
        }
    }
}

/// Store write for flipping one switch.
///
/// Only the flipped key is written. Switching the master off does not
/// overwrite the category switches, so switching it back on brings them
/// back as they were.
pub fn toggle_patch(toggle: PopupToggle, enabled: bool) -> StoreRecord {
    let mut patch = StoreRecord::default();
    match toggle {
        PopupToggle::Master => patch.master_block_enabled = Some(enabled),
        PopupToggle::Streamer => patch.streamer_block_enabled = Some(enabled),
        PopupToggle::Tag => patch.tag_block_enabled = Some(enabled),
    }
    patch
}

/// Whether blocking applies to the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageStatus {
    Active,
    Disabled,
    OtherSite,
}

impl PageStatus {
    pub fn for_tab(url: Option<&str>, config: &BlockConfig) -> Self {
        match url {
            Some(url) if is_listing_url(url) => {
                if config.master_enabled {
                    Self::Active
                } else {
                    Self::Disabled
                }
            }
            _ => Self::OtherSite,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active on this page",
            Self::Disabled => "Blocking is turned off",
            Self::OtherSite => "Not a SoopLive page",
        }
    }
}

fn is_listing_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    host == SITE_HOST || host.ends_with(".sooplive.co.kr") || host == "sooplive.co.kr"
}
