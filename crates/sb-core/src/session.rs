//! One content-script lifetime.
//!
//! A [`Session`] owns the reconciler, the gesture handler and the watcher,
//! together with the card surface and presenter they act on. The host
//! forwards browser events to it and carries out the timers and store
//! writes it asks for. Nothing here suspends: a store write is split into
//! [`Session::begin_toggle`] and [`Session::finish_toggle`] so the host can
//! await the write in between.

use crate::config::{BlockConfig, StoreRecord};
use crate::error::Error;
use crate::feedback::{error_message, menu_title, toggle_message, Presenter};
use crate::gesture::{streamer_patch, GestureHandler, MenuRequest, PendingToggle};
use crate::list::BlockList;
use crate::options::{MenuMode, RuntimeOptions};
use crate::protocol::InboundMessage;
use crate::reconciler::Reconciler;
use crate::surface::CardSurface;
use crate::types::PassReport;
use crate::watcher::{Arm, Debouncer, Mutation, Tick, TimerToken, Trigger, Watcher};

/// What the host should do after a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEffect {
    /// The message was fully handled.
    Reconciled(PassReport),
    /// Run the confirm sequence for the pending gesture.
    ConfirmPending,
}

/// What the host should do with a right-click event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuEffect {
    /// Suppress the page's own context menu
    pub prevent_default: bool,
    /// New title for the browser menu item
    pub native_title: Option<String>,
}

pub struct Session<S: CardSurface, P: Presenter> {
    surface: S,
    presenter: P,
    reconciler: Reconciler,
    gestures: GestureHandler<S::Card>,
    watcher: Watcher,
}

impl<S: CardSurface, P: Presenter> Session<S, P> {
    pub fn new(surface: S, presenter: P, options: &RuntimeOptions) -> Self {
        let debouncer = Debouncer::new(options.mutation_settle_ms, options.navigation_settle_ms);
        Self {
            surface,
            presenter,
            reconciler: Reconciler::new(BlockConfig::default()),
            gestures: GestureHandler::new(options.menu_mode),
            watcher: Watcher::new(options.attribute_filter.clone(), debouncer),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn config(&self) -> &BlockConfig {
        self.reconciler.config()
    }

    /// Adopt a store snapshot read at startup and run the first pass.
    pub fn load(&mut self, record: StoreRecord) -> PassReport {
        let config = BlockConfig::from_record(record);
        log::info!(
            "loaded {} blocked streamers, {} blocked tags (enabled: {})",
            config.blocked_streamers.len(),
            config.blocked_tags.len(),
            config.master_enabled
        );
        self.reconciler.set_config(config);
        self.reconciler.reconcile(&mut self.surface)
    }

    /// Evaluate un-reconciled cards now.
    pub fn reconcile(&mut self) -> PassReport {
        self.reconciler.reconcile(&mut self.surface)
    }

    /// Invalidate everything and evaluate now.
    pub fn refresh(&mut self) -> PassReport {
        self.reconciler.invalidate_all();
        self.reconciler.reconcile(&mut self.surface)
    }

    /// Seed the navigation poller with the starting location.
    pub fn set_location(&mut self, location: &str) {
        self.watcher.seed_location(location);
    }

    fn apply_tick(&mut self, tick: Tick) -> Option<Arm> {
        if !tick.removed.is_empty() {
            self.reconciler.forget(&tick.removed);
        }
        match tick.trigger {
            Some(Trigger::Navigation) => {
                self.reconciler.invalidate_all();
                self.gestures.clear();
                self.presenter.dismiss_menu();
            }
            Some(Trigger::Mutation) => {
                self.reconciler.invalidate_all();
            }
            None => {}
        }
        tick.arm
    }

    /// Feed DOM mutation records. Returns a settle timer to start.
    pub fn on_mutations(&mut self, records: Vec<Mutation>, now_ms: u64) -> Option<Arm> {
        let tick = self.watcher.on_mutations(records, now_ms);
        self.apply_tick(tick)
    }

    /// Feed the current location. Returns a settle timer to start.
    pub fn on_location(&mut self, location: &str, now_ms: u64) -> Option<Arm> {
        let tick = self.watcher.on_location(location, now_ms);
        self.apply_tick(tick)
    }

    /// A settle timer went off.
    pub fn on_timer(&mut self, token: TimerToken, now_ms: u64) -> Option<PassReport> {
        if !self.watcher.fire(token, now_ms) {
            return None;
        }
        Some(self.reconcile())
    }

    /// Handle a cross-surface push.
    pub fn on_message(&mut self, message: InboundMessage) -> MessageEffect {
        match message {
            InboundMessage::UpdateBlockList {
                blocked_streamers,
                blocked_tags,
            } => {
                self.reconciler.replace_lists(blocked_streamers, blocked_tags);
                MessageEffect::Reconciled(self.refresh())
            }
            InboundMessage::UpdateBlockSettings { settings } => {
                let report = self
                    .reconciler
                    .replace_config(settings.into(), &mut self.surface);
                MessageEffect::Reconciled(report)
            }
            InboundMessage::HandleContextMenu => MessageEffect::ConfirmPending,
        }
    }

    /// A right-click landed on `card`.
    pub fn on_context_menu(&mut self, card: S::Card, x: i32, y: i32) -> MenuEffect {
        let request = self
            .gestures
            .capture(&self.surface, card, self.reconciler.config());
        match request {
            MenuRequest::Native { title } => MenuEffect {
                prevent_default: false,
                native_title: Some(title),
            },
            MenuRequest::Floating { label } => {
                self.presenter.context_menu(&label, x, y);
                MenuEffect {
                    prevent_default: true,
                    native_title: None,
                }
            }
            MenuRequest::Unresolved => MenuEffect::default(),
        }
    }

    /// A right-click landed outside every card. The earlier gesture no
    /// longer applies, and the browser menu item goes back to its default.
    pub fn on_context_menu_elsewhere(&mut self) -> MenuEffect {
        self.gestures.clear();
        self.presenter.dismiss_menu();
        match self.gestures.mode() {
            MenuMode::Native => MenuEffect {
                prevent_default: false,
                native_title: Some(menu_title(None, false)),
            },
            MenuMode::Floating => MenuEffect::default(),
        }
    }

    /// First half of a confirm: resolve the pending card and toggle its
    /// streamer in memory. `fresh` is the streamer list as just read from
    /// the store; when given it replaces the mirror before toggling.
    ///
    /// On failure the error is shown to the user and nothing is changed.
    pub fn begin_toggle(&mut self, fresh: Option<BlockList>) -> Result<PendingToggle, Error> {
        self.presenter.dismiss_menu();

        let identity = match self.gestures.take_identity(&self.surface) {
            Ok(identity) => identity,
            Err(e) => {
                log::warn!("block toggle aborted: {}", e);
                self.presenter.toast(&error_message(&e));
                return Err(e);
            }
        };

        if let Some(fresh) = fresh {
            self.reconciler.set_streamers(fresh);
        }
        let toggle = self.reconciler.toggle_streamer(&identity);
        let patch = streamer_patch(self.reconciler.config());

        Ok(PendingToggle {
            identity,
            toggle,
            patch,
        })
    }

    /// Give up on a confirm before anything changed, for instance because
    /// the fresh store read failed. The pending gesture is dropped.
    pub fn abort_toggle(&mut self, error: &Error) {
        self.gestures.clear();
        self.presenter.dismiss_menu();
        log::warn!("block toggle aborted: {}", error);
        self.presenter.toast(&error.to_string());
    }

    /// Second half of a confirm, after the store write settled either way.
    pub fn finish_toggle(&mut self, pending: PendingToggle, persisted: Result<(), Error>) -> PassReport {
        let report = self.refresh();
        match persisted {
            Ok(()) => {
                log::info!("{:?} streamer {}", pending.toggle, pending.identity);
                self.presenter.toast(&toggle_message(&pending.identity, pending.toggle));
            }
            Err(e) => {
                log::warn!("failed to persist block list: {}", e);
                self.presenter.toast(&error_message(&e));
            }
        }
        report
    }
}
