//! In-memory card surface and presenter.
//!
//! Used by unit tests, the CLI simulator and the benches. Cards are plain
//! records; the card handle is its key.

use serde::{Deserialize, Serialize};

use crate::feedback::Presenter;
use crate::surface::CardSurface;
use crate::types::CardKey;

/// One feed card held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCard {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(skip)]
    key: u64,
}

impl MemoryCard {
    pub fn new(identity: Option<&str>, tags: &[&str]) -> Self {
        Self {
            identity: identity.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            hidden: false,
            key: 0,
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey(self.key)
    }
}

/// Card surface backed by a vector.
#[derive(Debug, Default)]
pub struct MemorySurface {
    cards: Vec<MemoryCard>,
    next_key: u64,
    /// Number of `set_hidden` calls that changed a card
    pub visibility_writes: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: impl IntoIterator<Item = MemoryCard>) -> Self {
        let mut surface = Self::new();
        for card in cards {
            surface.push(card);
        }
        surface
    }

    /// Append a card and return its key.
    pub fn push(&mut self, mut card: MemoryCard) -> CardKey {
        self.next_key += 1;
        card.key = self.next_key;
        self.cards.push(card);
        CardKey(self.next_key)
    }

    /// Replace a card with a fresh node carrying the same content, the way
    /// the host page re-renders. The new card is visible and has a new key.
    pub fn rerender(&mut self, key: CardKey) -> Option<CardKey> {
        let pos = self.cards.iter().position(|c| c.key() == key)?;
        self.next_key += 1;
        let card = &mut self.cards[pos];
        card.key = self.next_key;
        card.hidden = false;
        Some(CardKey(self.next_key))
    }

    pub fn remove(&mut self, key: CardKey) -> Option<MemoryCard> {
        let pos = self.cards.iter().position(|c| c.key() == key)?;
        Some(self.cards.remove(pos))
    }

    /// Hide a card the way the host page would, without our involvement.
    pub fn host_hide(&mut self, key: CardKey) {
        if let Some(card) = self.get_mut(key) {
            card.hidden = true;
        }
    }

    pub fn get(&self, key: CardKey) -> Option<&MemoryCard> {
        self.cards.iter().find(|c| c.key() == key)
    }

    pub fn get_mut(&mut self, key: CardKey) -> Option<&mut MemoryCard> {
        self.cards.iter_mut().find(|c| c.key() == key)
    }

    pub fn is_hidden(&self, key: CardKey) -> bool {
        self.get(key).map(|c| c.hidden).unwrap_or(false)
    }

    pub fn all(&self) -> &[MemoryCard] {
        &self.cards
    }

    pub fn hidden_count(&self) -> usize {
        self.cards.iter().filter(|c| c.hidden).count()
    }
}

impl CardSurface for MemorySurface {
    type Card = CardKey;

    fn cards(&self) -> Vec<CardKey> {
        self.cards.iter().map(MemoryCard::key).collect()
    }

    fn key(&self, card: &CardKey) -> CardKey {
        *card
    }

    fn identity(&self, card: &CardKey) -> Option<String> {
        self.get(*card)
            .and_then(|c| c.identity.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    fn tags(&self, card: &CardKey) -> Vec<String> {
        self.get(*card)
            .map(|c| {
                c.tags
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_hidden(&mut self, card: &CardKey, hidden: bool) {
        if let Some(c) = self.get_mut(*card) {
            if c.hidden != hidden {
                c.hidden = hidden;
                self.visibility_writes += 1;
            }
        }
    }

    fn is_attached(&self, card: &CardKey) -> bool {
        self.get(*card).is_some()
    }
}

/// Presenter that records what it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub toasts: Vec<String>,
    pub menu: Option<(String, i32, i32)>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_toast(&self) -> Option<&str> {
        self.toasts.last().map(String::as_str)
    }
}

impl Presenter for RecordingPresenter {
    fn toast(&mut self, message: &str) {
        self.toasts.push(message.to_string());
    }

    fn context_menu(&mut self, label: &str, x: i32, y: i32) {
        self.menu = Some((label.to_string(), x, y));
    }

    fn dismiss_menu(&mut self) {
        self.menu = None;
    }
}
