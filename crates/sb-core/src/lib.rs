//! SoopBlock Core Library
//!
//! This crate holds the in-page reconciliation engine for the SoopBlock
//! streamer blocker. It owns the block configuration mirror and decides,
//! for every feed card in the listing, whether the card should be shown.
//!
//! # Architecture
//!
//! The engine never touches a real document. Everything it needs from the
//! page goes through the [`CardSurface`] trait, and everything it shows the
//! user goes through the [`Presenter`] trait. Timers are modelled as tokens
//! with explicit millisecond timestamps, so the whole state machine can be
//! driven from tests without a browser.
//!
//! # Modules
//!
//! - `list`: Ordered, duplicate-free block lists
//! - `config`: Block configuration and its key-value store record
//! - `options`: Runtime tuning (settle delays, selectors, menu mode)
//! - `types`: Card keys, per-card flags and pass reports
//! - `surface`: The card surface abstraction over the host document
//! - `reconciler`: Visibility predicate and reconciliation passes
//! - `watcher`: Mutation/navigation triggers and the settle debouncer
//! - `gesture`: Right-click capture and block toggling
//! - `feedback`: Presenter contract and user-facing message text
//! - `protocol`: Cross-surface push messages
//! - `popup`: Popup switches and page status
//! - `session`: One content-script lifetime wiring all of the above
//! - `memory`: In-memory card surface and presenter

pub mod config;
pub mod error;
pub mod feedback;
pub mod gesture;
pub mod list;
pub mod memory;
pub mod options;
pub mod popup;
pub mod protocol;
pub mod reconciler;
pub mod session;
pub mod surface;
pub mod types;
pub mod watcher;

// Re-export commonly used types
pub use config::{BlockConfig, StoreRecord, STORE_KEYS};
pub use error::Error;
pub use feedback::Presenter;
pub use list::{BlockList, Toggle};
pub use options::{MenuMode, RuntimeOptions};
pub use reconciler::Reconciler;
pub use session::Session;
pub use surface::CardSurface;
pub use types::{CardFlags, CardKey, HideReason, PassReport};
