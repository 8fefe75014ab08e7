//! Live document card surface.

use std::cell::Cell;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MutationRecord, Node, NodeList};

use sb_core::watcher::Mutation;
use sb_core::{CardKey, CardSurface, RuntimeOptions};

use crate::presenter::OVERLAY_SELECTOR;

/// Attribute carrying a card's key. A node the page re-creates arrives
/// without it and is keyed afresh.
pub const CARD_KEY_ATTR: &str = "data-sb-card";

pub struct DomSurface {
    document: Document,
    card_selector: String,
    identity_selector: String,
    tag_selector: String,
    next_key: Cell<u64>,
}

fn elements(list: NodeList) -> impl Iterator<Item = Element> {
    (0..list.length())
        .filter_map(move |i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
}

fn text_of(element: &Element) -> Option<String> {
    let text = element.text_content()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Our own toast or menu, or a node inside one.
fn is_overlay(node: &Node) -> bool {
    let element = match node.dyn_ref::<Element>() {
        Some(element) => element.clone(),
        None => match node.parent_element() {
            Some(parent) => parent,
            None => return false,
        },
    };
    element
        .closest(OVERLAY_SELECTOR)
        .ok()
        .flatten()
        .is_some()
}

fn read_key(element: &Element) -> Option<CardKey> {
    element
        .get_attribute(CARD_KEY_ATTR)
        .and_then(|v| v.parse().ok())
        .map(CardKey)
}

impl DomSurface {
    pub fn new(document: Document, options: &RuntimeOptions) -> Self {
        Self {
            document,
            card_selector: options.card_selector.clone(),
            identity_selector: options.identity_selectors.join(", "),
            tag_selector: options.tag_selector.clone(),
            next_key: Cell::new(0),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The card containing an event target, if any.
    pub fn card_for_target(&self, target: &Node) -> Option<Element> {
        let element = match target.dyn_ref::<Element>() {
            Some(element) => element.clone(),
            None => target.parent_element()?,
        };
        element.closest(&self.card_selector).ok().flatten()
    }

    /// Keys of cards inside nodes that left the document. Nodes that were
    /// moved rather than removed are connected again by the time the
    /// observer reports them, and keep their state.
    pub fn removed_keys(&self, removed: &NodeList) -> Vec<CardKey> {
        let selector = format!("[{}]", CARD_KEY_ATTR);
        let mut keys = Vec::new();
        for element in elements(removed.clone()).filter(|e| !e.is_connected()) {
            keys.extend(read_key(&element));
            if let Ok(inner) = element.query_selector_all(&selector) {
                keys.extend(elements(inner).filter_map(|e| read_key(&e)));
            }
        }
        keys
    }

    /// Added nodes that are not our own toast or menu.
    pub fn added_count(&self, added: &NodeList) -> usize {
        (0..added.length())
            .filter_map(|i| added.item(i))
            .filter(|node| !is_overlay(node))
            .count()
    }

    /// Summarize one observer record for the watcher. Changes to the toast
    /// and menu are reported as irrelevant.
    pub fn summarize(&self, record: &MutationRecord) -> Mutation {
        match record.type_().as_str() {
            "childList" => Mutation::ChildList {
                added: self.added_count(&record.added_nodes()),
                removed: self.removed_keys(&record.removed_nodes()),
            },
            "attributes" if record.target().is_some_and(|node| is_overlay(&node)) => Mutation::Other,
            "attributes" => Mutation::Attribute {
                name: record.attribute_name(),
            },
            _ => Mutation::Other,
        }
    }
}

impl CardSurface for DomSurface {
    type Card = Element;

    fn cards(&self) -> Vec<Element> {
        match self.document.query_selector_all(&self.card_selector) {
            Ok(list) => elements(list).collect(),
            Err(e) => {
                log::warn!("bad card selector {:?}: {:?}", self.card_selector, e);
                Vec::new()
            }
        }
    }

    fn key(&self, card: &Element) -> CardKey {
        if let Some(key) = read_key(card) {
            return key;
        }
        let key = self.next_key.get() + 1;
        self.next_key.set(key);
        if card.set_attribute(CARD_KEY_ATTR, &key.to_string()).is_err() {
            log::debug!("could not tag card {}", key);
        }
        CardKey(key)
    }

    fn identity(&self, card: &Element) -> Option<String> {
        card.query_selector_all(&self.identity_selector)
            .ok()
            .and_then(|list| elements(list).find_map(|e| text_of(&e)))
    }

    fn tags(&self, card: &Element) -> Vec<String> {
        card.query_selector_all(&self.tag_selector)
            .map(|list| elements(list).filter_map(|e| text_of(&e)).collect())
            .unwrap_or_default()
    }

    fn set_hidden(&mut self, card: &Element, hidden: bool) {
        let Some(element) = card.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        let currently = style.get_property_value("display").map(|v| v == "none").unwrap_or(false);
        if currently == hidden {
            return;
        }
        let result = if hidden {
            style.set_property("display", "none")
        } else {
            style.remove_property("display").map(|_| ())
        };
        if let Err(e) = result {
            log::warn!("could not change card display: {:?}", e);
        }
    }

    fn is_attached(&self, card: &Element) -> bool {
        card.is_connected()
    }
}
