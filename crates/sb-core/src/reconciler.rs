//! Reconciler
//!
//! Owns the in-memory configuration mirror and the card side table, and
//! applies the visibility predicate to every card that has not been
//! evaluated since the last invalidation.

use std::collections::HashSet;

use crate::config::BlockConfig;
use crate::list::{BlockList, Toggle};
use crate::surface::CardSurface;
use crate::types::{CardFlags, CardKey, CardTable, HideReason, InactiveReason, PassReport};

/// Decide whether a card should be hidden.
///
/// A streamer match wins over a tag match; tags are only consulted when the
/// identity did not match.
pub fn evaluate(config: &BlockConfig, identity: Option<&str>, tags: &[String]) -> Option<HideReason> {
    if config.effective_streamer_filter() {
        if let Some(name) = identity.filter(|name| config.blocked_streamers.contains(name)) {
            return Some(HideReason::Streamer(name.to_string()));
        }
    }

    if config.effective_tag_filter() {
        if let Some(tag) = config.blocked_tags.first_match(tags.iter().map(String::as_str)) {
            return Some(HideReason::Tag(tag.to_string()));
        }
    }

    None
}

/// Reconciliation state for one content-script lifetime.
#[derive(Debug, Default)]
pub struct Reconciler {
    config: BlockConfig,
    table: CardTable,
}

impl Reconciler {
    pub fn new(config: BlockConfig) -> Self {
        Self {
            config,
            table: CardTable::new(),
        }
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn flags(&self, key: CardKey) -> CardFlags {
        self.table.get(key)
    }

    pub fn tracked_cards(&self) -> usize {
        self.table.len()
    }

    fn inactive_reason(&self) -> Option<InactiveReason> {
        let config = &self.config;
        if !config.master_enabled {
            return Some(InactiveReason::MasterDisabled);
        }
        if !config.streamer_filter_enabled && !config.tag_filter_enabled {
            return Some(InactiveReason::FiltersDisabled);
        }
        if config.blocked_streamers.is_empty() && config.blocked_tags.is_empty() {
            return Some(InactiveReason::NothingBlocked);
        }
        None
    }

    /// One pass over the un-reconciled cards.
    ///
    /// When filtering is inactive the pass returns without touching any
    /// card or flag, so a later configuration change re-evaluates
    /// everything.
    pub fn apply<S: CardSurface>(&mut self, surface: &mut S) -> PassReport {
        if let Some(reason) = self.inactive_reason() {
            log::debug!("reconcile skipped: {:?}", reason);
            return PassReport::inactive(reason);
        }

        let wants_tags = self.config.effective_tag_filter() && !self.config.blocked_tags.is_empty();
        let cards = surface.cards();
        let mut present = HashSet::with_capacity(cards.len());
        let mut report = PassReport::default();

        for card in &cards {
            let key = surface.key(card);
            present.insert(key);

            let flags = self.table.get(key);
            if flags.contains(CardFlags::RECONCILED) {
                report.skipped += 1;
                continue;
            }
            report.evaluated += 1;

            let identity = surface.identity(card);
            let tags = if wants_tags { surface.tags(card) } else { Vec::new() };

            let mut next = flags | CardFlags::RECONCILED;
            match evaluate(&self.config, identity.as_deref(), &tags) {
                Some(reason) => {
                    log::debug!("hiding card {:?}: {}", key, reason);
                    surface.set_hidden(card, true);
                    next |= CardFlags::HIDDEN_BY_US;
                    report.hidden.push((key, reason));
                }
                None if flags.contains(CardFlags::HIDDEN_BY_US) => {
                    surface.set_hidden(card, false);
                    next.remove(CardFlags::HIDDEN_BY_US);
                    report.restored.push(key);
                }
                None => {}
            }
            self.table.set(key, next);
        }

        self.table.retain_present(|key| present.contains(&key));

        log::debug!(
            "reconciled {} cards ({} skipped): {} hidden, {} restored",
            report.evaluated,
            report.skipped,
            report.hidden.len(),
            report.restored.len()
        );
        report
    }

    /// Run a pass; if filtering turned out to be inactive, make visible the
    /// cards we hid earlier.
    pub fn reconcile<S: CardSurface>(&mut self, surface: &mut S) -> PassReport {
        let mut report = self.apply(surface);
        if report.inactive.is_some() {
            report.restored = self.release(surface);
        }
        report
    }

    /// Restore every card we hid. Leaves `RECONCILED` alone.
    pub fn release<S: CardSurface>(&mut self, surface: &mut S) -> Vec<CardKey> {
        let mut restored = Vec::new();
        for card in surface.cards() {
            let key = surface.key(&card);
            let flags = self.table.get(key);
            if flags.contains(CardFlags::HIDDEN_BY_US) {
                surface.set_hidden(&card, false);
                self.table.set(key, flags - CardFlags::HIDDEN_BY_US);
                restored.push(key);
            }
        }
        restored
    }

    /// Make every card visible, whoever hid it, and reset all state.
    pub fn force_visible<S: CardSurface>(&mut self, surface: &mut S) -> Vec<CardKey> {
        let mut shown = Vec::new();
        for card in surface.cards() {
            surface.set_hidden(&card, false);
            shown.push(surface.key(&card));
        }
        self.table = CardTable::new();
        shown
    }

    /// Clear `RECONCILED` on every tracked card.
    pub fn invalidate_all(&mut self) -> usize {
        self.table.invalidate_all()
    }

    pub fn forget(&mut self, keys: &[CardKey]) {
        self.table.forget(keys);
    }

    /// Replace any list present in the arguments.
    pub fn replace_lists(&mut self, streamers: Option<BlockList>, tags: Option<BlockList>) {
        if let Some(streamers) = streamers {
            self.config.blocked_streamers = streamers;
        }
        if let Some(tags) = tags {
            self.config.blocked_tags = tags;
        }
    }

    /// Adopt a configuration read from the store and invalidate every card.
    /// Unlike [`Reconciler::replace_config`] nothing is shown here; the next
    /// pass only restores cards we hid.
    pub fn set_config(&mut self, config: BlockConfig) {
        self.config = config;
        self.invalidate_all();
    }

    /// Swap in a full configuration.
    ///
    /// With the master toggle off every card is forced visible immediately,
    /// bypassing the predicate. Otherwise all cards are re-evaluated.
    pub fn replace_config<S: CardSurface>(&mut self, config: BlockConfig, surface: &mut S) -> PassReport {
        self.config = config;
        if !self.config.master_enabled {
            let mut report = PassReport::inactive(InactiveReason::MasterDisabled);
            report.restored = self.force_visible(surface);
            return report;
        }
        self.invalidate_all();
        self.reconcile(surface)
    }

    /// Replace the streamer list with a fresher copy from the store.
    pub fn set_streamers(&mut self, streamers: BlockList) {
        self.config.blocked_streamers = streamers;
    }

    pub fn toggle_streamer(&mut self, name: &str) -> Toggle {
        self.config.blocked_streamers.toggle(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryCard, MemorySurface};

    fn config(streamers: &[&str], tags: &[&str]) -> BlockConfig {
        BlockConfig {
            blocked_streamers: streamers.iter().copied().collect(),
            blocked_tags: tags.iter().copied().collect(),
            ..BlockConfig::default()
        }
    }

    #[test]
    fn test_hides_blocked_streamer() {
        let mut surface = MemorySurface::new();
        let a = surface.push(MemoryCard::new(Some("A"), &[]));
        let b = surface.push(MemoryCard::new(Some("B"), &[]));

        let mut reconciler = Reconciler::new(config(&["A"], &[]));
        let report = reconciler.apply(&mut surface);

        assert!(surface.is_hidden(a));
        assert!(!surface.is_hidden(b));
        assert!(reconciler.flags(a).contains(CardFlags::HIDDEN_BY_US));
        assert!(reconciler.flags(b).contains(CardFlags::RECONCILED));
        assert_eq!(report.reason_for(a), Some(&HideReason::Streamer("A".to_string())));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut surface = MemorySurface::with_cards([
            MemoryCard::new(Some("A"), &["x"]),
            MemoryCard::new(Some("B"), &["y"]),
            MemoryCard::new(Some("C"), &[]),
        ]);
        let mut reconciler = Reconciler::new(config(&["A"], &["y"]));

        reconciler.apply(&mut surface);
        let writes = surface.visibility_writes;
        assert_eq!(writes, 2);

        let second = reconciler.apply(&mut surface);
        assert_eq!(second.evaluated, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(surface.visibility_writes, writes);
    }

    #[test]
    fn test_streamer_reason_wins_over_tag() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("A"), &["x"]));
        let mut reconciler = Reconciler::new(config(&["A"], &["x"]));

        let report = reconciler.apply(&mut surface);
        assert_eq!(report.reason_for(card), Some(&HideReason::Streamer("A".to_string())));
    }

    #[test]
    fn test_disabled_streamer_filter_leaves_tags_active() {
        let mut surface = MemorySurface::new();
        let only_name = surface.push(MemoryCard::new(Some("A"), &[]));
        let tagged = surface.push(MemoryCard::new(Some("A"), &["x"]));
        let mut cfg = config(&["A"], &["x"]);
        cfg.streamer_filter_enabled = false;
        let mut reconciler = Reconciler::new(cfg);

        let report = reconciler.apply(&mut surface);
        assert!(!surface.is_hidden(only_name));
        assert!(surface.is_hidden(tagged));
        assert_eq!(report.reason_for(tagged), Some(&HideReason::Tag("x".to_string())));
    }

    #[test]
    fn test_card_without_identity_or_tags_never_hidden() {
        let mut surface = MemorySurface::new();
        let blank = surface.push(MemoryCard::new(Some("   "), &[]));
        let none = surface.push(MemoryCard::new(None, &[]));
        let mut reconciler = Reconciler::new(config(&["A", ""], &["x"]));

        reconciler.apply(&mut surface);
        assert!(!surface.is_hidden(blank));
        assert!(!surface.is_hidden(none));
    }

    #[test]
    fn test_inactive_pass_does_not_mark_reconciled() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("A"), &[]));

        let mut reconciler = Reconciler::new(config(&[], &[]));
        let report = reconciler.apply(&mut surface);
        assert_eq!(report.inactive, Some(InactiveReason::NothingBlocked));
        assert!(reconciler.flags(card).is_empty());

        let mut cfg = config(&["A"], &[]);
        cfg.streamer_filter_enabled = false;
        cfg.tag_filter_enabled = false;
        let mut reconciler = Reconciler::new(cfg);
        let report = reconciler.apply(&mut surface);
        assert_eq!(report.inactive, Some(InactiveReason::FiltersDisabled));
        assert!(!surface.is_hidden(card));
    }

    #[test]
    fn test_unblocking_via_list_replace_restores_card() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("A"), &[]));
        let mut reconciler = Reconciler::new(config(&["A"], &[]));
        reconciler.apply(&mut surface);
        assert!(surface.is_hidden(card));

        reconciler.replace_lists(Some(BlockList::new()), None);
        reconciler.invalidate_all();
        let report = reconciler.reconcile(&mut surface);

        assert_eq!(report.inactive, Some(InactiveReason::NothingBlocked));
        assert_eq!(report.restored, vec![card]);
        assert!(!surface.is_hidden(card));
        assert!(!reconciler.flags(card).contains(CardFlags::HIDDEN_BY_US));
    }

    #[test]
    fn test_restores_only_cards_we_hid() {
        let mut surface = MemorySurface::new();
        let ours = surface.push(MemoryCard::new(Some("A"), &[]));
        let theirs = surface.push(MemoryCard::new(Some("B"), &[]));
        surface.host_hide(theirs);

        let mut reconciler = Reconciler::new(config(&["A", "Z"], &[]));
        reconciler.apply(&mut surface);

        reconciler.replace_lists(Some(["Z"].into_iter().collect()), None);
        reconciler.invalidate_all();
        let report = reconciler.reconcile(&mut surface);

        assert_eq!(report.restored, vec![ours]);
        assert!(!surface.is_hidden(ours));
        assert!(surface.is_hidden(theirs));
    }

    #[test]
    fn test_master_off_forces_everything_visible() {
        let mut surface = MemorySurface::new();
        let a = surface.push(MemoryCard::new(Some("A"), &[]));
        let t = surface.push(MemoryCard::new(Some("B"), &["x"]));
        let mut reconciler = Reconciler::new(config(&["A"], &["x"]));
        reconciler.apply(&mut surface);
        assert_eq!(surface.hidden_count(), 2);

        let mut off = config(&["A"], &["x"]);
        off.master_enabled = false;
        let report = reconciler.replace_config(off, &mut surface);

        assert_eq!(report.inactive, Some(InactiveReason::MasterDisabled));
        assert_eq!(surface.hidden_count(), 0);
        assert!(reconciler.flags(a).is_empty());
        assert!(reconciler.flags(t).is_empty());
    }

    #[test]
    fn test_rerendered_card_is_hidden_again() {
        let mut surface = MemorySurface::new();
        let card = surface.push(MemoryCard::new(Some("A"), &[]));
        let mut reconciler = Reconciler::new(config(&["A"], &[]));
        reconciler.apply(&mut surface);

        let fresh = surface.rerender(card).unwrap();
        assert!(!surface.is_hidden(fresh));

        reconciler.apply(&mut surface);
        assert!(surface.is_hidden(fresh));
        // stale entry for the replaced node is pruned
        assert_eq!(reconciler.tracked_cards(), 1);
    }

    #[test]
    fn test_evaluate_ignores_disabled_master() {
        let mut cfg = config(&["A"], &["x"]);
        cfg.master_enabled = false;
        assert_eq!(evaluate(&cfg, Some("A"), &["x".to_string()]), None);
    }
}
