//! Application state.

use std::time::Duration;

use crate::live_reload::BrokerHandle;

/// State shared by all request handlers.
pub(crate) struct AppState {
    /// Handle for registering preview sessions.
    pub(crate) broker: BrokerHandle,
    /// Interval between keep-alive comments on event streams.
    pub(crate) heartbeat: Duration,
}
