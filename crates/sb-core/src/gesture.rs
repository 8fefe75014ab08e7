//! Gesture Handler
//!
//! Captures the card under a right-click and, on confirmation, toggles that
//! card's streamer in the block list.

use crate::config::{BlockConfig, ListKind, StoreRecord};
use crate::error::Error;
use crate::feedback::menu_title;
use crate::list::Toggle;
use crate::options::MenuMode;
use crate::surface::CardSurface;

/// The most recent right-clicked card.
#[derive(Debug, Clone)]
pub struct PendingGesture<C> {
    pub card: C,
    /// Identity as read at right-click time
    pub identity: Option<String>,
}

/// What the host should do with the right-click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuRequest {
    /// Let the browser menu open, relabelling our item first.
    Native { title: String },
    /// Suppress the page menu and show ours.
    Floating { label: String },
    /// Nothing to offer for this card.
    Unresolved,
}

/// A toggle applied in memory and waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub identity: String,
    pub toggle: Toggle,
    /// Store write carrying the updated streamer list
    pub patch: StoreRecord,
}

/// Holds at most one pending gesture.
#[derive(Debug)]
pub struct GestureHandler<C> {
    mode: MenuMode,
    pending: Option<PendingGesture<C>>,
}

impl<C: Clone> GestureHandler<C> {
    pub fn new(mode: MenuMode) -> Self {
        Self { mode, pending: None }
    }

    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    pub fn pending(&self) -> Option<&PendingGesture<C>> {
        self.pending.as_ref()
    }

    /// Remember `card` as the pending gesture, replacing any earlier one.
    pub fn capture<S>(&mut self, surface: &S, card: C, config: &BlockConfig) -> MenuRequest
    where
        S: CardSurface<Card = C>,
    {
        let identity = surface.identity(&card);
        let blocked = identity
            .as_deref()
            .map(|name| config.blocked_streamers.contains(name))
            .unwrap_or(false);
        let title = menu_title(identity.as_deref(), blocked);
        let resolved = identity.is_some();

        self.pending = Some(PendingGesture { card, identity });

        match self.mode {
            MenuMode::Native => MenuRequest::Native { title },
            MenuMode::Floating if resolved => MenuRequest::Floating { label: title },
            MenuMode::Floating => MenuRequest::Unresolved,
        }
    }

    /// Consume the pending gesture and resolve its identity.
    ///
    /// The card is re-read if it is still in the page, since its text may
    /// have been filled in after the right-click; otherwise the identity
    /// captured at right-click time is used.
    pub fn take_identity<S>(&mut self, surface: &S) -> Result<String, Error>
    where
        S: CardSurface<Card = C>,
    {
        let pending = self.pending.take().ok_or(Error::NoPendingGesture)?;
        let identity = if surface.is_attached(&pending.card) {
            surface.identity(&pending.card).or(pending.identity)
        } else {
            pending.identity
        };
        identity.ok_or(Error::IdentityUnresolved)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Build the store write for a toggled streamer list.
pub fn streamer_patch(config: &BlockConfig) -> StoreRecord {
    StoreRecord::list(ListKind::Streamers, config.blocked_streamers.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryCard, MemorySurface};

    #[test]
    fn test_native_mode_title_reflects_membership() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("B"), &[]));
        let mut handler = GestureHandler::new(MenuMode::Native);

        let config = BlockConfig::default();
        assert_eq!(
            handler.capture(&surface, card, &config),
            MenuRequest::Native { title: "Hide streamer \"B\"".to_string() }
        );

        let mut blocked = BlockConfig::default();
        blocked.blocked_streamers.insert("B");
        assert_eq!(
            handler.capture(&surface, card, &blocked),
            MenuRequest::Native { title: "Unhide streamer \"B\"".to_string() }
        );
    }

    #[test]
    fn test_floating_mode_without_identity_offers_nothing() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(None, &["x"]));
        let mut handler = GestureHandler::new(MenuMode::Floating);
        assert_eq!(
            handler.capture(&surface, card, &BlockConfig::default()),
            MenuRequest::Unresolved
        );
    }

    #[test]
    fn test_take_identity_consumes_pending() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("B"), &[]));
        let mut handler = GestureHandler::new(MenuMode::Native);

        assert_eq!(handler.take_identity(&surface), Err(Error::NoPendingGesture));

        handler.capture(&surface, card, &BlockConfig::default());
        assert_eq!(handler.take_identity(&surface), Ok("B".to_string()));
        assert!(handler.pending().is_none());
    }

    #[test]
    fn test_detached_card_uses_captured_identity() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("B"), &[]));
        let mut handler = GestureHandler::new(MenuMode::Native);
        handler.capture(&surface, card, &BlockConfig::default());

        surface.remove(card);
        assert_eq!(handler.take_identity(&surface), Ok("B".to_string()));
    }

    #[test]
    fn test_unresolved_identity_is_an_error() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(None, &[]));
        let mut handler = GestureHandler::new(MenuMode::Native);
        handler.capture(&surface, card, &BlockConfig::default());
        assert_eq!(handler.take_identity(&surface), Err(Error::IdentityUnresolved));
    }
}
