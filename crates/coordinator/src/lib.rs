//! Reconnect coordinator for long-lived real-time connections.
//!
//! When the transport drops and later recovers, the coordinator decides
//! between a full reload (outage of three hours or more) and an incremental
//! resync of the current view. It is a library crate with no UI or transport
//! dependencies: the application supplies [`Store`], [`RouteClassifier`] and
//! [`Host`] implementations plus the signal buses.
//!
//! # Pipeline
//!
//! 1. **Disconnect**: record when the transport dropped
//! 2. **Online**: reload if the outage passed the threshold
//! 3. **Reconnect**: revalidate label/inbox/team caches
//! 4. **Refetch**: replay the fetch matching the current route and filters
//! 5. **Complete**: publish `ReconnectCompleted` for UI listeners

pub mod config;
mod context;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod navigation;
mod pipeline;
pub mod store;
mod strategy;
pub mod timing;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export primary types for convenience.
pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorDeps, ReconnectCoordinator};
pub use error::{ConfigError, CoordinatorError, DispatchError};
pub use host::{Clock, Host, SystemClock};
pub use lifecycle::CoordinatorSlot;
pub use navigation::{Route, RouteClassifier, RouteTable};
pub use resync_bus::{BusEvent, EventBus, HostEvent};
pub use store::{DispatchFuture, Store};
pub use timing::{DisconnectClock, RELOAD_THRESHOLD_SECS, exceeds_reload_threshold};
pub use types::{
    Action, CacheKeys, FetchOutcome, Filters, OnlineDecision, ResyncPhase, ResyncReport,
    ViewRefetch, ViewScope, ViewStrategy,
};
