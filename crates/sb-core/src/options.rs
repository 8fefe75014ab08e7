//! Runtime tuning for the content script.
//!
//! All fields have defaults that match the live site; the JS loader may pass
//! a partial object to override any of them.

use serde::{Deserialize, Serialize};

/// How the right-click gesture is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuMode {
    /// Defer to the browser context menu; the extension menu item acts on
    /// the last right-clicked card.
    #[default]
    Native,
    /// Suppress the page menu and render our own one-item menu.
    Floating,
}

/// Content script options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeOptions {
    /// Settle delay after a relevant DOM mutation
    pub mutation_settle_ms: u32,
    /// Settle delay after a client-side navigation
    pub navigation_settle_ms: u32,
    /// How often the location is polled
    pub navigation_poll_ms: u32,
    /// Extra passes after startup, measured from start
    pub startup_passes_ms: Vec<u32>,
    /// Total toast lifetime
    pub toast_lifetime_ms: u32,
    /// Toast fade-in/out duration
    pub toast_fade_ms: u32,
    pub menu_mode: MenuMode,
    /// Selector matching one feed card
    pub card_selector: String,
    /// Identity candidates, queried together; the first non-empty text in
    /// document order wins
    pub identity_selectors: Vec<String>,
    /// Selector matching the tag links inside a card
    pub tag_selector: String,
    /// Attribute changes that count as relevant mutations
    pub attribute_filter: Vec<String>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            mutation_settle_ms: 100,
            navigation_settle_ms: 500,
            navigation_poll_ms: 500,
            startup_passes_ms: vec![1000, 3000],
            toast_lifetime_ms: 3000,
            toast_fade_ms: 300,
            menu_mode: MenuMode::Native,
            card_selector: r#"li[data-type="cBox"]"#.to_string(),
            identity_selectors: vec![".nick span".to_string(), ".nick".to_string()],
            tag_selector: ".tag_wrap a".to_string(),
            attribute_filter: vec!["class".to_string(), "style".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_keep_defaults() {
        let options: RuntimeOptions =
            serde_json::from_str(r#"{"menuMode": "floating", "mutationSettleMs": 50}"#).unwrap();
        assert_eq!(options.menu_mode, MenuMode::Floating);
        assert_eq!(options.mutation_settle_ms, 50);
        assert_eq!(options.navigation_settle_ms, 500);
        assert_eq!(options.identity_selectors, vec![".nick span", ".nick"]);
    }

    #[test]
    fn test_navigation_settles_longer_than_mutation() {
        let options = RuntimeOptions::default();
        assert!(options.navigation_settle_ms > options.mutation_settle_ms);
    }
}
