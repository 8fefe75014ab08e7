//! Card surface abstraction.
//!
//! A surface is whatever holds the feed cards: the live document in the
//! browser, or a plain vector in tests and the CLI simulator.

use crate::types::CardKey;

/// Access to the feed cards of a page.
pub trait CardSurface {
    /// Handle to one card. Cheap to clone.
    type Card: Clone;

    /// Cards currently in the page, in rendering order.
    fn cards(&self) -> Vec<Self::Card>;

    /// Stable key for a card. The same node always yields the same key; a
    /// node that replaced another yields a new one.
    fn key(&self, card: &Self::Card) -> CardKey;

    /// Creator display name, if one can be read.
    fn identity(&self, card: &Self::Card) -> Option<String>;

    /// Tag texts in rendering order.
    fn tags(&self, card: &Self::Card) -> Vec<String>;

    /// Suppress or restore the card's display.
    fn set_hidden(&mut self, card: &Self::Card, hidden: bool);

    /// Whether the card is still part of the page.
    fn is_attached(&self, card: &Self::Card) -> bool;
}
