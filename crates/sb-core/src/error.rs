//! Error type for the engine.

/// Errors surfaced by engine operations.
///
/// None of these end the content script. Store failures are logged,
/// identity failures are shown to the user, and the page stays usable with
/// unblocked content visible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Settings storage unavailable: {0}")]
    StoreUnavailable(String),
    #[error("No card was selected")]
    NoPendingGesture,
    #[error("Could not read a streamer name from this card")]
    IdentityUnresolved,
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}
