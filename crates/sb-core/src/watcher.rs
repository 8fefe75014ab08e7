//! Mutation Watcher
//!
//! Two independent producers feed one invalidation consumer:
//!
//! - DOM mutations (child additions, allow-listed attribute changes)
//! - client-side navigations, detected by polling the location
//!
//! Either one invalidates every card and asks for a reconciliation pass
//! after a settle delay. Passes are coalesced: while one is pending a new
//! trigger does not schedule another, except that a navigation upgrades a
//! pending mutation pass to the longer navigation delay.
//!
//! Time is passed in explicitly as milliseconds, and timers are identified
//! by token, so the host decides how timers are run and tests can use a
//! logical clock.

use crate::types::CardKey;

/// What caused an invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mutation,
    Navigation,
}

/// Identifies one armed settle timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Request to start a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arm {
    pub token: TimerToken,
    pub delay_ms: u32,
}

/// Summary of one DOM mutation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ChildList {
        added: usize,
        /// Cards found in the removed subtrees
        removed: Vec<CardKey>,
    },
    Attribute {
        name: Option<String>,
    },
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: TimerToken,
    trigger: Trigger,
    due_ms: u64,
}

/// Coalescing settle timer.
#[derive(Debug)]
pub struct Debouncer {
    mutation_delay_ms: u32,
    navigation_delay_ms: u32,
    pending: Option<Pending>,
    next_token: u64,
}

impl Debouncer {
    pub fn new(mutation_delay_ms: u32, navigation_delay_ms: u32) -> Self {
        Self {
            mutation_delay_ms,
            navigation_delay_ms,
            pending: None,
            next_token: 0,
        }
    }

    pub fn delay_for(&self, trigger: Trigger) -> u32 {
        match trigger {
            Trigger::Mutation => self.mutation_delay_ms,
            Trigger::Navigation => self.navigation_delay_ms,
        }
    }

    /// Register a trigger. Returns the timer to start, if any; a returned
    /// timer supersedes any earlier one.
    pub fn trigger(&mut self, trigger: Trigger, now_ms: u64) -> Option<Arm> {
        if let Some(pending) = self.pending {
            let upgrade = pending.trigger == Trigger::Mutation && trigger == Trigger::Navigation;
            if !upgrade {
                return None;
            }
        }

        let delay_ms = self.delay_for(trigger);
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.pending = Some(Pending {
            token,
            trigger,
            due_ms: now_ms + u64::from(delay_ms),
        });
        Some(Arm { token, delay_ms })
    }

    /// A timer went off. Returns `true` if it is the live one and the pass
    /// should run; superseded timers are ignored.
    pub fn fire(&mut self, token: TimerToken, now_ms: u64) -> bool {
        match self.pending {
            Some(pending) if pending.token == token => {
                if now_ms < pending.due_ms {
                    log::debug!("settle timer {:?} fired {}ms early", token, pending.due_ms - now_ms);
                }
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Due time of the pending pass.
    pub fn due_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms)
    }
}

/// Detects client-side navigation by comparing successive locations.
#[derive(Debug, Default)]
pub struct NavigationPoller {
    last: Option<String>,
}

impl NavigationPoller {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            last: initial.map(str::to_string),
        }
    }

    /// Record the current location. Returns `true` if it changed since the
    /// previous observation; the first observation only seeds the poller.
    pub fn observe(&mut self, location: &str) -> bool {
        match &self.last {
            Some(last) if last == location => false,
            Some(_) => {
                self.last = Some(location.to_string());
                true
            }
            None => {
                self.last = Some(location.to_string());
                false
            }
        }
    }
}

/// Result of feeding an event to the watcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tick {
    /// Set when the event calls for invalidating every card
    pub trigger: Option<Trigger>,
    /// Cards that left the document
    pub removed: Vec<CardKey>,
    /// Timer to start
    pub arm: Option<Arm>,
}

/// Both triggers plus the debouncer.
#[derive(Debug)]
pub struct Watcher {
    attribute_filter: Vec<String>,
    poller: NavigationPoller,
    debouncer: Debouncer,
}

impl Watcher {
    pub fn new(attribute_filter: Vec<String>, debouncer: Debouncer) -> Self {
        Self {
            attribute_filter,
            poller: NavigationPoller::default(),
            debouncer,
        }
    }

    fn is_relevant(&self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::ChildList { added, .. } => *added > 0,
            Mutation::Attribute { name: Some(name) } => {
                self.attribute_filter.iter().any(|allowed| allowed == name)
            }
            Mutation::Attribute { name: None } | Mutation::Other => false,
        }
    }

    /// Feed a batch of mutation records.
    pub fn on_mutations(&mut self, records: Vec<Mutation>, now_ms: u64) -> Tick {
        let mut tick = Tick::default();
        let mut relevant = false;

        for record in records {
            relevant |= self.is_relevant(&record);
            if let Mutation::ChildList { removed, .. } = record {
                tick.removed.extend(removed);
            }
        }

        if relevant {
            tick.trigger = Some(Trigger::Mutation);
            tick.arm = self.debouncer.trigger(Trigger::Mutation, now_ms);
        }
        tick
    }

    /// Record the starting location without triggering.
    pub fn seed_location(&mut self, location: &str) {
        self.poller = NavigationPoller::new(Some(location));
    }

    /// Feed the current location from the poll interval.
    pub fn on_location(&mut self, location: &str, now_ms: u64) -> Tick {
        if !self.poller.observe(location) {
            return Tick::default();
        }
        log::debug!("navigation to {}", location);
        Tick {
            trigger: Some(Trigger::Navigation),
            removed: Vec::new(),
            arm: self.debouncer.trigger(Trigger::Navigation, now_ms),
        }
    }

    pub fn fire(&mut self, token: TimerToken, now_ms: u64) -> bool {
        self.debouncer.fire(token, now_ms)
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher() -> Watcher {
        Watcher::new(
            vec!["class".to_string(), "style".to_string()],
            Debouncer::new(100, 500),
        )
    }

    fn added(n: usize) -> Mutation {
        Mutation::ChildList { added: n, removed: Vec::new() }
    }

    #[test]
    fn test_added_nodes_schedule_pass() {
        let mut w = watcher();
        let tick = w.on_mutations(vec![added(2)], 0);
        assert_eq!(tick.trigger, Some(Trigger::Mutation));
        let arm = tick.arm.expect("timer should be armed");
        assert_eq!(arm.delay_ms, 100);
        assert!(w.fire(arm.token, 100));
        assert!(!w.debouncer().is_pending());
    }

    #[test]
    fn test_irrelevant_mutations_are_ignored() {
        let mut w = watcher();
        let records = vec![
            added(0),
            Mutation::Attribute { name: Some("data-foo".to_string()) },
            Mutation::Other,
        ];
        assert_eq!(w.on_mutations(records, 0), Tick::default());

        let tick = w.on_mutations(vec![Mutation::Attribute { name: Some("style".to_string()) }], 0);
        assert!(tick.arm.is_some());
    }

    #[test]
    fn test_triggers_coalesce_while_pending() {
        let mut w = watcher();
        let first = w.on_mutations(vec![added(1)], 0).arm.unwrap();

        let second = w.on_mutations(vec![added(1)], 40);
        assert_eq!(second.trigger, Some(Trigger::Mutation));
        assert_eq!(second.arm, None);

        assert!(w.fire(first.token, 100));
        assert!(!w.fire(first.token, 101));

        // after the pass ran, the next trigger arms a new timer
        let third = w.on_mutations(vec![added(1)], 150).arm.unwrap();
        assert_ne!(third.token, first.token);
    }

    #[test]
    fn test_navigation_upgrades_pending_mutation() {
        let mut w = watcher();
        w.on_location("https://www.sooplive.co.kr/", 0);
        let mutation = w.on_mutations(vec![added(1)], 0).arm.unwrap();

        let nav = w.on_location("https://www.sooplive.co.kr/directory", 20);
        let nav_arm = nav.arm.expect("navigation should re-arm");
        assert_eq!(nav_arm.delay_ms, 500);
        assert_eq!(w.debouncer().due_ms(), Some(520));

        // the superseded mutation timer does nothing
        assert!(!w.fire(mutation.token, 100));
        assert!(w.fire(nav_arm.token, 520));
    }

    #[test]
    fn test_mutation_does_not_shorten_navigation_wait() {
        let mut w = watcher();
        w.on_location("/a", 0);
        let nav = w.on_location("/b", 0).arm.unwrap();
        assert_eq!(w.on_mutations(vec![added(3)], 10).arm, None);
        assert!(w.fire(nav.token, 500));
    }

    #[test]
    fn test_poller_seeds_then_detects_change() {
        let mut poller = NavigationPoller::default();
        assert!(!poller.observe("/a"));
        assert!(!poller.observe("/a"));
        assert!(poller.observe("/b"));
        assert!(!poller.observe("/b"));
    }

    #[test]
    fn test_removed_cards_are_reported_without_trigger() {
        let mut w = watcher();
        let tick = w.on_mutations(
            vec![Mutation::ChildList { added: 0, removed: vec![CardKey(7)] }],
            0,
        );
        assert_eq!(tick.trigger, None);
        assert_eq!(tick.removed, vec![CardKey(7)]);
    }
}
