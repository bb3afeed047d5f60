//! Signal types carried on the buses.

use std::fmt;

/// Signals exchanged between the transport, the coordinator and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusEvent {
    /// The real-time connection was restored.
    Reconnect,
    /// The real-time connection was lost.
    Disconnect,
    /// One resync attempt finished (successfully or not).
    ReconnectCompleted,
}

impl BusEvent {
    /// Wire name used by UI listeners.
    pub fn name(self) -> &'static str {
        match self {
            Self::Reconnect => "WEBSOCKET_RECONNECT",
            Self::Disconnect => "WEBSOCKET_DISCONNECT",
            Self::ReconnectCompleted => "WEBSOCKET_RECONNECT_COMPLETED",
        }
    }
}

impl fmt::Display for BusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signals raised by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// The host regained network connectivity.
    Online,
}
