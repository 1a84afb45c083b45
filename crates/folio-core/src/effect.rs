//! Deferred UI effects produced by conversation changes.
//!
//! These are conveniences for the front-end, not part of the conversation
//! contract: the controller queues them and the UI drains and schedules them.

use std::time::Duration;

/// Delay before the input takes focus after the panel opens, leaving room for
/// the panel's entrance.
pub const FOCUS_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Move keyboard focus to the text input once `after` has elapsed.
    FocusInput { after: Duration },
    /// Scroll the message list so the newest message is visible.
    ScrollToEnd,
}
