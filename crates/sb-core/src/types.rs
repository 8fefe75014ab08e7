//! Shared type definitions for the reconciliation engine.

use std::collections::HashMap;

// =============================================================================
// Card Keys
// =============================================================================

/// Stable per-card key.
///
/// The host page owns card nodes and may replace them at any time, so
/// reconciliation state is kept in a side table keyed by this value rather
/// than on the node itself. A replaced node gets a fresh key and therefore
/// fresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardKey(pub u64);

// =============================================================================
// Card Flags
// =============================================================================

bitflags::bitflags! {
    /// Per-card reconciliation state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CardFlags: u8 {
        /// Card has been evaluated against the current configuration
        const RECONCILED = 1 << 0;
        /// Card is hidden and the hide was done by us (safe to revert)
        const HIDDEN_BY_US = 1 << 1;
    }
}

/// Side table of card flags.
///
/// Only the reconciler writes `HIDDEN_BY_US`. Invalidation may only clear
/// `RECONCILED`.
#[derive(Debug, Default)]
pub struct CardTable {
    entries: HashMap<CardKey, CardFlags>,
}

impl CardTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CardKey) -> CardFlags {
        self.entries.get(&key).copied().unwrap_or(CardFlags::empty())
    }

    pub fn set(&mut self, key: CardKey, flags: CardFlags) {
        if flags.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, flags);
        }
    }

    /// Clear `RECONCILED` on every entry. Returns how many were cleared.
    pub fn invalidate_all(&mut self) -> usize {
        let mut cleared = 0;
        for flags in self.entries.values_mut() {
            if flags.contains(CardFlags::RECONCILED) {
                flags.remove(CardFlags::RECONCILED);
                cleared += 1;
            }
        }
        self.entries.retain(|_, flags| !flags.is_empty());
        cleared
    }

    /// Drop state for cards that left the document.
    pub fn forget(&mut self, keys: &[CardKey]) {
        for key in keys {
            self.entries.remove(key);
        }
    }

    /// Keep only entries whose key satisfies `present`.
    pub fn retain_present(&mut self, present: impl Fn(CardKey) -> bool) {
        self.entries.retain(|key, _| present(*key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Pass Results
// =============================================================================

/// Why a card was hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideReason {
    /// The card's identity is on the streamer list
    Streamer(String),
    /// One of the card's tags is on the tag list
    Tag(String),
}

impl std::fmt::Display for HideReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streamer(name) => write!(f, "streamer \"{}\"", name),
            Self::Tag(tag) => write!(f, "tag \"{}\"", tag),
        }
    }
}

/// Why a pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactiveReason {
    /// Master toggle is off
    MasterDisabled,
    /// Both category filters are off
    FiltersDisabled,
    /// Both block lists are empty
    NothingBlocked,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PassReport {
    /// Set when the pass exited early without evaluating anything
    pub inactive: Option<InactiveReason>,
    /// Cards evaluated in this pass
    pub evaluated: usize,
    /// Cards skipped because they were already reconciled
    pub skipped: usize,
    /// Cards hidden in this pass, with the reason
    pub hidden: Vec<(CardKey, HideReason)>,
    /// Cards made visible again because we had hidden them
    pub restored: Vec<CardKey>,
}

impl PassReport {
    pub fn inactive(reason: InactiveReason) -> Self {
        Self {
            inactive: Some(reason),
            ..Self::default()
        }
    }

    /// Number of hide or restore decisions made in this pass.
    pub fn changes(&self) -> usize {
        self.hidden.len() + self.restored.len()
    }

    pub fn reason_for(&self, key: CardKey) -> Option<&HideReason> {
        self.hidden
            .iter()
            .find(|(hidden, _)| *hidden == key)
            .map(|(_, reason)| reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_keeps_hidden_flag() {
        let mut table = CardTable::new();
        table.set(CardKey(1), CardFlags::RECONCILED | CardFlags::HIDDEN_BY_US);
        table.set(CardKey(2), CardFlags::RECONCILED);

        assert_eq!(table.invalidate_all(), 2);
        assert_eq!(table.get(CardKey(1)), CardFlags::HIDDEN_BY_US);
        assert_eq!(table.get(CardKey(2)), CardFlags::empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_forget_and_retain() {
        let mut table = CardTable::new();
        for i in 0..4 {
            table.set(CardKey(i), CardFlags::RECONCILED);
        }
        table.forget(&[CardKey(0)]);
        table.retain_present(|key| key.0 % 2 == 1);
        assert_eq!(table.len(), 2);
        assert!(table.get(CardKey(2)).is_empty());
    }
}
