//! Scan session event system.

use crate::session::ScanMode;
use crate::verify::OutcomeCategory;
use tokio::sync::broadcast;

/// Events emitted by a scan session.
///
/// Consumed by presentation surfaces only; nothing listening to these events
/// feeds back into the state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Session has started and is watching the decode feed.
    Started,

    /// Session mode changed.
    ModeChanged {
        /// The new mode.
        mode: ScanMode,
    },

    /// A decoded payload was accepted for verification.
    ScanAccepted {
        /// The accepted payload.
        payload: String,
    },

    /// A repeated payload was suppressed inside the debounce window.
    ScanSuppressed {
        /// The suppressed payload.
        payload: String,
    },

    /// The decode source reported an error.
    DecodeFailed {
        /// Error message from the source.
        message: String,
    },

    /// A verification resolved.
    OutcomeReady {
        /// The classified outcome.
        category: OutcomeCategory,
    },

    /// Session is shutting down.
    ShuttingDown,
}

/// Channel for receiving session events.
pub type SessionEventsChannel = broadcast::Receiver<SessionEvent>;

/// Sender for session events.
pub type SessionEventsSender = broadcast::Sender<SessionEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (SessionEventsSender, SessionEventsChannel) {
    broadcast::channel(256)
}
