//! Content-script runtime.
//!
//! Owns the engine session for the page and carries out what it asks for:
//! settle timers, the location poll, the mutation observer, store access and
//! messaging. Every browser callback holds only a weak reference and never
//! keeps the runtime borrowed across an `await`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, MouseEvent, MutationObserver, MutationObserverInit, MutationRecord, Node, Window};

use sb_core::config::KEY_BLOCKED_STREAMERS;
use sb_core::protocol::{InboundMessage, OutboundMessage};
use sb_core::session::MessageEffect;
use sb_core::watcher::Arm;
use sb_core::{PassReport, RuntimeOptions, Session, STORE_KEYS};

use crate::chrome;
use crate::dom::DomSurface;
use crate::presenter::DomPresenter;

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;
type MessageCallback = Closure<dyn FnMut(JsValue, JsValue, JsValue)>;

pub type Shared = Rc<RefCell<Runtime>>;

pub struct Runtime {
    window: Window,
    options: RuntimeOptions,
    session: Session<DomSurface, DomPresenter>,
    settle: Option<Timeout>,
    poll: Option<Interval>,
    startup: Vec<Timeout>,
    observer: Option<(MutationObserver, ObserverCallback)>,
    listeners: Vec<EventListener>,
    on_message: Option<MessageCallback>,
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn log_pass(trigger: &str, report: &PassReport) {
    if report.changes() > 0 {
        log::info!(
            "{}: hid {}, restored {} of {} cards",
            trigger,
            report.hidden.len(),
            report.restored.len(),
            report.evaluated
        );
    }
}

impl Runtime {
    /// Build the runtime for `window`. Nothing is installed yet.
    pub fn new(window: Window, document: Document, options: RuntimeOptions) -> Shared {
        Rc::new_cyclic(|weak: &Weak<RefCell<Runtime>>| {
            let on_select = {
                let weak = weak.clone();
                Rc::new(move || {
                    if let Some(rt) = weak.upgrade() {
                        confirm(rt);
                    }
                }) as Rc<dyn Fn()>
            };
            let surface = DomSurface::new(document.clone(), &options);
            let presenter = DomPresenter::new(document, &options, on_select);
            RefCell::new(Runtime {
                window,
                session: Session::new(surface, presenter, &options),
                options,
                settle: None,
                poll: None,
                startup: Vec::new(),
                observer: None,
                listeners: Vec::new(),
                on_message: None,
            })
        })
    }

    pub fn session(&self) -> &Session<DomSurface, DomPresenter> {
        &self.session
    }

    fn location(&self) -> Option<String> {
        self.window.location().href().ok()
    }
}

/// Start a settle timer, replacing (and so cancelling) the previous one.
fn arm(rt: &Shared, arm: Arm) {
    let weak = Rc::downgrade(rt);
    let timeout = Timeout::new(arm.delay_ms, move || {
        let Some(rt) = weak.upgrade() else {
            return;
        };
        let report = rt.borrow_mut().session.on_timer(arm.token, now_ms());
        if let Some(report) = report {
            log_pass("settled pass", &report);
        }
    });
    rt.borrow_mut().settle = Some(timeout);
}

fn on_records(rt: &Shared, records: js_sys::Array) {
    let pending = {
        let mut runtime = rt.borrow_mut();
        let mutations = records
            .iter()
            .filter_map(|value| value.dyn_into::<MutationRecord>().ok())
            .map(|record| runtime.session.surface().summarize(&record))
            .collect();
        runtime.session.on_mutations(mutations, now_ms())
    };
    if let Some(pending) = pending {
        arm(rt, pending);
    }
}

fn install_observer(rt: &Shared) -> Result<(), JsValue> {
    let weak = Rc::downgrade(rt);
    let callback: ObserverCallback = Closure::new(move |records: js_sys::Array, _observer: MutationObserver| {
        if let Some(rt) = weak.upgrade() {
            on_records(&rt, records);
        }
    });
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    init.set_attributes(true);
    let filter: js_sys::Array = rt
        .borrow()
        .options
        .attribute_filter
        .iter()
        .map(|name| JsValue::from_str(name))
        .collect();
    init.set_attribute_filter(&filter);

    let body = {
        let runtime = rt.borrow();
        runtime.session.surface().document().body()
    };
    let body = body.ok_or_else(|| JsValue::from_str("document has no body"))?;
    observer.observe_with_options(&body, &init)?;

    rt.borrow_mut().observer = Some((observer, callback));
    Ok(())
}

fn install_poller(rt: &Shared) {
    let weak = Rc::downgrade(rt);
    let period = rt.borrow().options.navigation_poll_ms;
    let interval = Interval::new(period, move || {
        let Some(rt) = weak.upgrade() else {
            return;
        };
        let pending = {
            let mut runtime = rt.borrow_mut();
            match runtime.location() {
                Some(location) => runtime.session.on_location(&location, now_ms()),
                None => None,
            }
        };
        if let Some(pending) = pending {
            arm(&rt, pending);
        }
    });

    let mut runtime = rt.borrow_mut();
    if let Some(location) = runtime.location() {
        runtime.session.set_location(&location);
    }
    runtime.poll = Some(interval);
}

fn install_startup_passes(rt: &Shared) {
    let delays = rt.borrow().options.startup_passes_ms.clone();
    let timers = delays
        .into_iter()
        .map(|delay| {
            let weak = Rc::downgrade(rt);
            Timeout::new(delay, move || {
                if let Some(rt) = weak.upgrade() {
                    let report = rt.borrow_mut().session.reconcile();
                    log_pass("startup pass", &report);
                }
            })
        })
        .collect();
    rt.borrow_mut().startup = timers;
}

fn install_ready_pass(rt: &Shared) {
    let document = rt.borrow().session.surface().document().clone();
    if document.ready_state() != "loading" {
        return;
    }
    let weak = Rc::downgrade(rt);
    let listener = EventListener::once(&document, "DOMContentLoaded", move |_| {
        if let Some(rt) = weak.upgrade() {
            let report = rt.borrow_mut().session.reconcile();
            log_pass("ready pass", &report);
        }
    });
    rt.borrow_mut().listeners.push(listener);
}

fn install_context_menu(rt: &Shared) {
    let document = rt.borrow().session.surface().document().clone();
    let weak = Rc::downgrade(rt);
    let listener = EventListener::new(&document, "contextmenu", move |event| {
        let Some(rt) = weak.upgrade() else {
            return;
        };
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
            return;
        };

        let effect = {
            let mut runtime = rt.borrow_mut();
            let card = runtime.session.surface().card_for_target(&target);
            match card {
                Some(card) => runtime
                    .session
                    .on_context_menu(card, mouse.client_x(), mouse.client_y()),
                None => runtime.session.on_context_menu_elsewhere(),
            }
        };

        if effect.prevent_default {
            event.prevent_default();
        }
        if let Some(title) = effect.native_title {
            spawn_local(async move {
                chrome::notify_background(&OutboundMessage::UpdateContextMenu { title }).await;
            });
        }
    });
    rt.borrow_mut().listeners.push(listener);
}

fn install_message_listener(rt: &Shared) {
    let weak = Rc::downgrade(rt);
    let callback: MessageCallback = Closure::new(move |message: JsValue, _sender: JsValue, _respond: JsValue| {
        let Some(rt) = weak.upgrade() else {
            return;
        };
        let message: InboundMessage = match serde_wasm_bindgen::from_value(message) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("ignoring message: {}", e);
                return;
            }
        };

        let effect = rt.borrow_mut().session.on_message(message);
        match effect {
            MessageEffect::Reconciled(report) => log_pass("settings push", &report),
            MessageEffect::ConfirmPending => confirm(rt),
        }
    });
    chrome::add_message_listener(&callback);
    rt.borrow_mut().on_message = Some(callback);
}

/// Toggle the pending card's streamer: fresh read, in-memory toggle,
/// persist, then re-reconcile whether or not the write succeeded.
pub fn confirm(rt: Shared) {
    spawn_local(async move {
        let fresh = match chrome::read_record(&[KEY_BLOCKED_STREAMERS]).await {
            Ok(record) => record.blocked_streamers.unwrap_or_default(),
            Err(e) => {
                rt.borrow_mut().session.abort_toggle(&e);
                return;
            }
        };

        let pending = rt.borrow_mut().session.begin_toggle(Some(fresh));
        let Ok(pending) = pending else {
            return;
        };

        let persisted = chrome::write_record(&pending.patch).await;
        let report = rt.borrow_mut().session.finish_toggle(pending, persisted);
        log_pass("toggle", &report);
    });
}

/// Load the configuration and install every observer.
pub async fn start(rt: Shared) -> Result<(), JsValue> {
    let record = match chrome::read_record(&STORE_KEYS).await {
        Ok(record) => record,
        Err(e) => {
            // Fail open: nothing is hidden, and the page stays usable.
            log::warn!("{}", e);
            return Err(JsValue::from_str(&e.to_string()));
        }
    };

    let report = rt.borrow_mut().session.load(record);
    log_pass("initial pass", &report);

    install_message_listener(&rt);
    install_context_menu(&rt);
    install_observer(&rt)?;
    install_poller(&rt);
    install_ready_pass(&rt);
    install_startup_passes(&rt);
    Ok(())
}
