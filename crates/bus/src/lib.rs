//! Typed publish/subscribe bus for connectivity signals.
//!
//! The real-time transport publishes [`BusEvent::Disconnect`] and
//! [`BusEvent::Reconnect`]; the resync coordinator publishes
//! [`BusEvent::ReconnectCompleted`] for UI listeners. Host-level network
//! signals travel on a separate bus of [`HostEvent`].

pub mod bus;
pub mod events;

pub use bus::{EventBus, Subscription};
pub use events::{BusEvent, HostEvent};
