//! WebAssembly bindings for SoopBlock
//!
//! One module serves every extension surface: the content script calls
//! `startContentScript`, the options page and the popup call the editor
//! functions.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use sb_core::RuntimeOptions;

mod chrome;
pub mod dom;
pub mod editor;
pub mod presenter;
pub mod runtime;

use runtime::{Runtime, Shared};

thread_local! {
    static RUNTIME: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Start blocking on the current page. `options` may be `undefined` or a
/// partial options object.
#[wasm_bindgen(js_name = startContentScript)]
pub async fn start_content_script(options: JsValue) -> Result<(), JsValue> {
    if is_running() {
        return Err(JsValue::from_str("Already running. Reload the page to restart."));
    }

    let options: RuntimeOptions = if options.is_undefined() || options.is_null() {
        RuntimeOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let rt = Runtime::new(window, document, options);
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(rt.clone()));
    let result = runtime::start(rt).await;
    if result.is_err() {
        // Nothing was installed; let the loader try again.
        RUNTIME.with(|slot| *slot.borrow_mut() = None);
    }
    result
}

#[wasm_bindgen(js_name = isRunning)]
pub fn is_running() -> bool {
    RUNTIME.with(|slot| slot.borrow().is_some())
}

/// Counters for debugging from the page console.
#[wasm_bindgen(js_name = runtimeInfo)]
pub fn runtime_info() -> JsValue {
    let result = js_sys::Object::new();
    RUNTIME.with(|slot| {
        let slot = slot.borrow();
        let Some(rt) = slot.as_ref() else {
            let _ = js_sys::Reflect::set(&result, &"running".into(), &JsValue::from(false));
            return;
        };
        let Ok(runtime) = rt.try_borrow() else {
            return;
        };
        let session = runtime.session();
        let config = session.config();
        let _ = js_sys::Reflect::set(&result, &"running".into(), &JsValue::from(true));
        let _ = js_sys::Reflect::set(&result, &"masterEnabled".into(), &JsValue::from(config.master_enabled));
        let _ = js_sys::Reflect::set(
            &result,
            &"blockedStreamers".into(),
            &JsValue::from(config.blocked_streamers.len() as u32),
        );
        let _ = js_sys::Reflect::set(&result, &"blockedTags".into(), &JsValue::from(config.blocked_tags.len() as u32));
        let _ = js_sys::Reflect::set(
            &result,
            &"trackedCards".into(),
            &JsValue::from(session.reconciler().tracked_cards() as u32),
        );
    });
    result.into()
}
