//! Bindings to the extension APIs.
//!
//! Only the handful of `chrome.*` calls the extension needs. Store access
//! maps rejections to [`Error::StoreUnavailable`]; messaging is best effort
//! and never reports failure to the caller.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use sb_core::popup::LISTING_URL_PATTERN;
use sb_core::protocol::{InboundMessage, OutboundMessage};
use sb_core::{Error, StoreRecord};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    async fn sync_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    async fn sync_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    async fn runtime_send_message(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn on_message_add_listener(listener: &js_sys::Function);

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn tabs_query(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    async fn tabs_send_message(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Debug, Deserialize)]
pub struct Tab {
    pub id: Option<i32>,
    pub url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_window: Option<bool>,
}

/// Best-effort text for a rejected promise.
pub fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, Error> {
    serde_wasm_bindgen::to_value(value).map_err(|e| Error::InvalidMessage(e.to_string()))
}

/// Read `keys` from the synced store.
pub async fn read_record(keys: &[&str]) -> Result<StoreRecord, Error> {
    let result = sync_get(to_js(&keys)?)
        .await
        .map_err(|e| Error::StoreUnavailable(describe(&e)))?;
    serde_wasm_bindgen::from_value(result).map_err(|e| Error::StoreUnavailable(e.to_string()))
}

/// Write the keys set in `patch`.
pub async fn write_record(patch: &StoreRecord) -> Result<(), Error> {
    sync_set(to_js(patch)?)
        .await
        .map(|_| ())
        .map_err(|e| Error::StoreUnavailable(describe(&e)))
}

/// Send to the background script. Failures are dropped: the background may
/// still be starting.
pub async fn notify_background(message: &OutboundMessage) {
    let value = match to_js(message) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("cannot encode {:?}: {}", message, e);
            return;
        }
    };
    if let Err(e) = runtime_send_message(value).await {
        log::debug!("background did not take {:?}: {}", message, describe(&e));
    }
}

pub async fn query_tabs(url: Option<&str>, active_only: bool) -> Result<Vec<Tab>, Error> {
    let query = TabQuery {
        url,
        active: active_only.then_some(true),
        current_window: active_only.then_some(true),
    };
    let result = tabs_query(to_js(&query)?)
        .await
        .map_err(|e| Error::InvalidMessage(describe(&e)))?;
    serde_wasm_bindgen::from_value(result).map_err(|e| Error::InvalidMessage(e.to_string()))
}

/// Push `message` to every open listing tab. Tabs that are not listening
/// are skipped silently; they read the store when their script starts.
pub async fn broadcast(message: &InboundMessage) {
    let tabs = match query_tabs(Some(LISTING_URL_PATTERN), false).await {
        Ok(tabs) => tabs,
        Err(e) => {
            log::warn!("cannot list tabs: {}", e);
            return;
        }
    };
    let value = match to_js(message) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("cannot encode push: {}", e);
            return;
        }
    };

    for id in tabs.iter().filter_map(|tab| tab.id) {
        if let Err(e) = tabs_send_message(id, value.clone()).await {
            log::debug!("tab {} not listening: {}", id, describe(&e));
        }
    }
}

/// Register a `chrome.runtime.onMessage` listener. The closure must outlive
/// the page, so the caller keeps it.
pub fn add_message_listener(listener: &Closure<dyn FnMut(JsValue, JsValue, JsValue)>) {
    on_message_add_listener(listener.as_ref().unchecked_ref());
}
