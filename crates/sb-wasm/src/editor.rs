//! Entry points for the options page and the popup.
//!
//! Each call reads a fresh snapshot of the keys it changes, writes the
//! result back, and pushes the change to open listing tabs.

use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use sb_core::config::{ListKind, ToggleView, KEY_BLOCKED_STREAMERS, KEY_BLOCKED_TAGS};
use sb_core::popup::{toggle_patch, PageStatus, PopupToggle};
use sb_core::protocol::InboundMessage;
use sb_core::{BlockConfig, BlockList, StoreRecord, STORE_KEYS};
use sb_lists::{build_snapshot, import_snapshot as merge_snapshot, merge_entries, parse_entry_input, parse_snapshot, MergeStats};

use crate::chrome;

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_err)
}

fn list_kind(kind: &str) -> Result<ListKind, JsValue> {
    ListKind::parse(kind).ok_or_else(|| js_err(format!("unknown list {:?}", kind)))
}

async fn read_list(kind: ListKind) -> Result<BlockList, JsValue> {
    let record = chrome::read_record(&[kind.store_key()]).await.map_err(js_err)?;
    Ok(record.list_of(kind).cloned().unwrap_or_default())
}

async fn save_list(kind: ListKind, list: BlockList) -> Result<(), JsValue> {
    chrome::write_record(&StoreRecord::list(kind, list.clone()))
        .await
        .map_err(js_err)?;
    chrome::broadcast(&InboundMessage::list_update(kind, list)).await;
    Ok(())
}

async fn read_config() -> Result<BlockConfig, JsValue> {
    let record = chrome::read_record(&STORE_KEYS).await.map_err(js_err)?;
    Ok(BlockConfig::from_record(record))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddResult {
    added: Vec<String>,
    duplicates: Vec<String>,
    summary: Option<String>,
}

/// Add comma-separated entries to a list.
#[wasm_bindgen(js_name = addEntries)]
pub async fn add_entries(kind: String, input: String) -> Result<JsValue, JsValue> {
    let kind = list_kind(&kind)?;
    let entries = parse_entry_input(&input).map_err(js_err)?;

    let mut list = read_list(kind).await?;
    let stats = merge_entries(&mut list, entries);
    if stats.changed() {
        save_list(kind, list).await?;
    }

    to_js(&AddResult {
        summary: stats.summary(kind),
        added: stats.added,
        duplicates: stats.duplicates,
    })
}

/// Remove one entry. Returns whether it was present.
#[wasm_bindgen(js_name = removeEntry)]
pub async fn remove_entry(kind: String, entry: String) -> Result<bool, JsValue> {
    let kind = list_kind(&kind)?;
    let mut list = read_list(kind).await?;
    if !list.remove(&entry) {
        return Ok(false);
    }
    save_list(kind, list).await?;
    Ok(true)
}

/// Empty a list.
#[wasm_bindgen(js_name = clearEntries)]
pub async fn clear_entries(kind: String) -> Result<(), JsValue> {
    let kind = list_kind(&kind)?;
    save_list(kind, BlockList::new()).await
}

#[wasm_bindgen(js_name = listEntries)]
pub async fn list_entries(kind: String) -> Result<JsValue, JsValue> {
    let kind = list_kind(&kind)?;
    to_js(&read_list(kind).await?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupState {
    toggles: ToggleView,
    page_status: PageStatus,
    page_status_label: &'static str,
}

async fn popup_state_for(config: &BlockConfig) -> PopupState {
    let url = match chrome::query_tabs(None, true).await {
        Ok(tabs) => tabs.into_iter().next().and_then(|tab| tab.url),
        Err(e) => {
            log::warn!("cannot read active tab: {}", e);
            None
        }
    };
    let status = PageStatus::for_tab(url.as_deref(), config);
    PopupState {
        toggles: config.toggle_view(),
        page_status: status,
        page_status_label: status.label(),
    }
}

/// Switch states, counts and page status for the popup.
#[wasm_bindgen(js_name = popupState)]
pub async fn popup_state() -> Result<JsValue, JsValue> {
    let config = read_config().await?;
    to_js(&popup_state_for(&config).await)
}

/// Flip one popup switch, then push the full settings to open tabs.
#[wasm_bindgen(js_name = setToggle)]
pub async fn set_toggle(which: String, enabled: bool) -> Result<JsValue, JsValue> {
    let toggle = PopupToggle::parse(&which).ok_or_else(|| js_err(format!("unknown switch {:?}", which)))?;
    let config = read_config().await?;
    if toggle != PopupToggle::Master && !config.master_enabled {
        return Err(js_err("Turn blocking on first"));
    }

    chrome::write_record(&toggle_patch(toggle, enabled)).await.map_err(js_err)?;

    let config = read_config().await?;
    chrome::broadcast(&InboundMessage::settings(&config)).await;
    to_js(&popup_state_for(&config).await)
}

/// Both lists in the export file format.
#[wasm_bindgen(js_name = exportSnapshot)]
pub async fn export_snapshot() -> Result<String, JsValue> {
    let record = chrome::read_record(&[KEY_BLOCKED_STREAMERS, KEY_BLOCKED_TAGS])
        .await
        .map_err(js_err)?;
    let config = BlockConfig::from_record(record);
    Ok(build_snapshot(&config.blocked_streamers, &config.blocked_tags))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResult {
    streamers: MergeStats,
    tags: MergeStats,
    skipped_lines: usize,
    summary: String,
}

/// Merge an export file into the stored lists.
#[wasm_bindgen(js_name = importSnapshot)]
pub async fn import_snapshot(text: String) -> Result<JsValue, JsValue> {
    let parsed = parse_snapshot(&text);
    let record = chrome::read_record(&[KEY_BLOCKED_STREAMERS, KEY_BLOCKED_TAGS])
        .await
        .map_err(js_err)?;
    let mut config = BlockConfig::from_record(record);
    let report = merge_snapshot(&mut config, &parsed);

    if report.changed() {
        let patch = StoreRecord {
            blocked_streamers: Some(config.blocked_streamers.clone()),
            blocked_tags: Some(config.blocked_tags.clone()),
            ..StoreRecord::default()
        };
        chrome::write_record(&patch).await.map_err(js_err)?;
        chrome::broadcast(&InboundMessage::UpdateBlockList {
            blocked_streamers: patch.blocked_streamers,
            blocked_tags: patch.blocked_tags,
        })
        .await;
    }

    to_js(&ImportResult {
        summary: report.summary(),
        streamers: report.streamers,
        tags: report.tags,
        skipped_lines: report.skipped_lines,
    })
}
