//! Feedback presenter contract and user-facing text.

use crate::error::Error;
use crate::list::Toggle;

/// Transient user feedback.
///
/// Implementations hold no engine state; everything they show comes in
/// through the arguments.
pub trait Presenter {
    /// Show a self-dismissing toast, replacing any toast still visible.
    fn toast(&mut self, message: &str);

    /// Show a one-item menu at viewport coordinates, replacing any open one.
    /// It closes on the next click outside itself.
    fn context_menu(&mut self, label: &str, x: i32, y: i32);

    /// Close the menu if open.
    fn dismiss_menu(&mut self);
}

/// Label for the block/unblock menu item.
pub fn menu_title(identity: Option<&str>, blocked: bool) -> String {
    match (identity, blocked) {
        (Some(name), false) => format!("Hide streamer \"{}\"", name),
        (Some(name), true) => format!("Unhide streamer \"{}\"", name),
        (None, _) => "Hide streamer".to_string(),
    }
}

/// Toast confirming a toggle.
pub fn toggle_message(identity: &str, toggle: Toggle) -> String {
    match toggle {
        Toggle::Added => format!("Blocked streamer \"{}\"", identity),
        Toggle::Removed => format!("Unblocked streamer \"{}\"", identity),
    }
}

/// Toast for a failed operation.
pub fn error_message(error: &Error) -> String {
    match error {
        Error::StoreUnavailable(detail) => format!("Could not save block list ({})", detail),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_title_reflects_state() {
        assert_eq!(menu_title(Some("B"), false), "Hide streamer \"B\"");
        assert_eq!(menu_title(Some("B"), true), "Unhide streamer \"B\"");
        assert_eq!(menu_title(None, true), "Hide streamer");
    }

    #[test]
    fn test_toggle_message() {
        assert!(toggle_message("B", Toggle::Added).starts_with("Blocked"));
        assert!(toggle_message("B", Toggle::Removed).starts_with("Unblocked"));
    }
}
