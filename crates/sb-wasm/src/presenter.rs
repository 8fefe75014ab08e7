//! Toast and floating menu rendered into the page.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, Node};

use sb_core::{Presenter, RuntimeOptions};

pub const TOAST_ID: &str = "sb-toast";
pub const MENU_ID: &str = "sb-menu";
/// Matches the toast and the menu.
pub const OVERLAY_SELECTOR: &str = "#sb-toast, #sb-menu";

const TOAST_STYLE: &str = "position:fixed;bottom:24px;left:50%;transform:translateX(-50%);\
    z-index:2147483647;background:rgba(20,20,20,.9);color:#fff;padding:10px 16px;\
    border-radius:6px;font-size:14px;pointer-events:none;opacity:0;";

const MENU_STYLE: &str = "position:fixed;z-index:2147483647;background:#fff;color:#222;\
    border:1px solid #ccc;border-radius:4px;box-shadow:0 2px 8px rgba(0,0,0,.2);\
    padding:8px 14px;font-size:13px;cursor:pointer;white-space:nowrap;";

struct OpenMenu {
    element: Element,
    _select: EventListener,
    _outside: EventListener,
}

type MenuSlot = Rc<RefCell<Option<OpenMenu>>>;

/// Remove the open menu. Its listeners are dropped on a later task, since
/// one of them may be the handler running right now.
fn close(slot: &MenuSlot) {
    let open = slot.borrow_mut().take();
    if let Some(open) = open {
        open.element.remove();
        spawn_local(async move {
            drop(open);
        });
    }
}

fn set_opacity(element: &HtmlElement, value: &str) {
    if element.style().set_property("opacity", value).is_err() {
        log::debug!("could not set toast opacity");
    }
}

pub struct DomPresenter {
    document: Document,
    lifetime_ms: u32,
    fade_ms: u32,
    on_select: Rc<dyn Fn()>,
    toast_timers: Vec<Timeout>,
    menu: MenuSlot,
}

impl DomPresenter {
    /// `on_select` runs when the floating menu item is clicked.
    pub fn new(document: Document, options: &RuntimeOptions, on_select: Rc<dyn Fn()>) -> Self {
        Self {
            document,
            lifetime_ms: options.toast_lifetime_ms,
            fade_ms: options.toast_fade_ms.min(options.toast_lifetime_ms / 2),
            on_select,
            toast_timers: Vec::new(),
            menu: Rc::new(RefCell::new(None)),
        }
    }

    fn create(&self, id: &str, style: &str, text: &str) -> Option<HtmlElement> {
        let element = self.document.create_element("div").ok()?;
        element.set_id(id);
        element.set_text_content(Some(text));
        let element: HtmlElement = element.dyn_into().ok()?;
        element.style().set_css_text(style);
        self.document.body()?.append_child(&element).ok()?;
        Some(element)
    }

    fn show_toast(&mut self, message: &str) -> Option<()> {
        if let Some(old) = self.document.get_element_by_id(TOAST_ID) {
            old.remove();
        }
        self.toast_timers.clear();

        let toast = self.create(TOAST_ID, TOAST_STYLE, message)?;
        toast
            .style()
            .set_property("transition", &format!("opacity {}ms", self.fade_ms))
            .ok()?;

        let fade_in = toast.clone();
        let fade_out = toast.clone();
        self.toast_timers = vec![
            Timeout::new(16, move || set_opacity(&fade_in, "1")),
            Timeout::new(self.lifetime_ms - self.fade_ms, move || set_opacity(&fade_out, "0")),
            Timeout::new(self.lifetime_ms, move || toast.remove()),
        ];
        Some(())
    }

    fn show_menu(&mut self, label: &str, x: i32, y: i32) -> Option<()> {
        let element = self.create(MENU_ID, MENU_STYLE, label)?;
        let style = element.style();
        style.set_property("left", &format!("{}px", x)).ok()?;
        style.set_property("top", &format!("{}px", y)).ok()?;

        let on_select = Rc::clone(&self.on_select);
        let select = EventListener::new(&element, "click", move |event| {
            event.stop_propagation();
            on_select();
        });

        let slot = Rc::downgrade(&self.menu);
        let inside: Node = element.clone().into();
        let outside = EventListener::new(&self.document, "click", move |event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            if inside.contains(target.as_ref()) {
                return;
            }
            if let Some(slot) = slot.upgrade() {
                close(&slot);
            }
        });

        *self.menu.borrow_mut() = Some(OpenMenu {
            element: element.into(),
            _select: select,
            _outside: outside,
        });
        Some(())
    }
}

impl Presenter for DomPresenter {
    fn toast(&mut self, message: &str) {
        if self.show_toast(message).is_none() {
            log::warn!("could not show toast: {}", message);
        }
    }

    fn context_menu(&mut self, label: &str, x: i32, y: i32) {
        self.dismiss_menu();
        if self.show_menu(label, x, y).is_none() {
            log::warn!("could not open menu at {},{}", x, y);
        }
    }

    fn dismiss_menu(&mut self) {
        close(&self.menu);
    }
}
