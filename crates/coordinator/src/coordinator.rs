//! Reconnect coordinator: signal listeners and the public resync API.
//!
//! The coordinator listens for three signals once activated:
//!
//! - host `Online`: reload if the outage lasted at least three hours,
//! - transport `Disconnect`: remember when the connection dropped,
//! - transport `Reconnect`: run a resync pipeline in its own task.
//!
//! Every pipeline run publishes `ReconnectCompleted` from whichever view
//! strategy it ends in.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use resync_bus::{BusEvent, EventBus, HostEvent, Subscription};
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::context::{ResyncContext, ViewState};
use crate::error::CoordinatorError;
use crate::host::{Clock, Host, SystemClock};
use crate::navigation::{Route, RouteClassifier};
use crate::store::Store;
use crate::timing::DisconnectClock;
use crate::types::{
    CacheKeys, FetchOutcome, Filters, OnlineDecision, ResyncPhase, ResyncReport, ViewRefetch,
    ViewScope,
};

/// External collaborators a coordinator is built from.
#[derive(Clone)]
pub struct CoordinatorDeps {
    pub store: Arc<dyn Store>,
    pub routes: Arc<dyn RouteClassifier>,
    pub host: Arc<dyn Host>,
    pub clock: Arc<dyn Clock>,
    /// Transport signals in, completion signals out.
    pub bus: EventBus<BusEvent>,
    /// Host network signals.
    pub host_events: EventBus<HostEvent>,
}

impl CoordinatorDeps {
    /// Collaborators with the wall clock.
    pub fn new(
        store: Arc<dyn Store>,
        routes: Arc<dyn RouteClassifier>,
        host: Arc<dyn Host>,
        bus: EventBus<BusEvent>,
        host_events: EventBus<HostEvent>,
    ) -> Self {
        Self {
            store,
            routes,
            host,
            clock: Arc::new(SystemClock),
            bus,
            host_events,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Decides between full reload and incremental resync after reconnects.
pub struct ReconnectCoordinator {
    ctx: Arc<ResyncContext>,
    host_events: EventBus<HostEvent>,
    /// Cancels the listener tasks installed by [`activate`](Self::activate).
    listeners: Mutex<Option<CancellationToken>>,
}

impl ReconnectCoordinator {
    /// Builds a coordinator for the given navigation context and base
    /// filters. Does not subscribe to any signal.
    pub fn new(deps: CoordinatorDeps, route: watch::Receiver<Route>, filters: Filters) -> Self {
        let ctx = ResyncContext {
            store: deps.store,
            routes: deps.routes,
            host: deps.host,
            bus: deps.bus,
            route,
            timer: DisconnectClock::new(deps.clock),
            view: Mutex::new(ViewState {
                filters,
                ..ViewState::default()
            }),
            in_flight: AtomicUsize::new(0),
        };
        Self {
            ctx: Arc::new(ctx),
            host_events: deps.host_events,
            listeners: Mutex::new(None),
        }
    }

    // --- listeners ---

    /// Subscribes to the online, reconnect and disconnect signals.
    ///
    /// Must run inside a Tokio runtime. Calling it while already active
    /// is ignored.
    pub fn activate(&self) {
        let mut listeners = self.listeners_slot();
        if listeners.is_some() {
            warn!("reconnect coordinator already active, ignoring activate");
            return;
        }

        let cancel = CancellationToken::new();
        // Subscribe before spawning so signals sent right after activation
        // are not missed.
        let online_rx = self.host_events.subscribe();
        let transport_rx = self.ctx.bus.subscribe();

        tokio::spawn(online_listener(
            Arc::clone(&self.ctx),
            online_rx,
            cancel.clone(),
        ));
        tokio::spawn(transport_listener(
            Arc::clone(&self.ctx),
            transport_rx,
            cancel.clone(),
        ));

        *listeners = Some(cancel);
        debug!("reconnect listeners installed");
    }

    /// Removes all listeners. Safe to call when never activated.
    pub fn deactivate(&self) {
        if let Some(cancel) = self.listeners_slot().take() {
            cancel.cancel();
            debug!("reconnect listeners removed");
        }
    }

    /// Whether listeners are installed.
    pub fn is_active(&self) -> bool {
        self.listeners_slot().is_some()
    }

    // --- disconnect timing ---

    /// Records the disconnect moment. Last call wins.
    pub fn on_disconnect(&self) {
        self.ctx.on_disconnect();
    }

    /// Whole seconds since the last disconnect, 0 if none. Never negative.
    pub fn seconds_since_disconnect(&self) -> u64 {
        self.ctx.timer.seconds_since()
    }

    pub fn disconnected_at(&self) -> Option<DateTime<Utc>> {
        self.ctx.timer.disconnected_at()
    }

    /// Host network is back: reload after a long outage, otherwise no-op.
    pub fn on_online(&self) -> OnlineDecision {
        self.ctx.on_online()
    }

    // --- resync pipeline ---

    /// Revalidates caches, then refetches the current view.
    pub async fn fetch_on_reconnect(&self) -> ResyncReport {
        self.ctx.fetch_on_reconnect().await
    }

    /// Looks up fresh cache keys and fires the three revalidations.
    pub async fn revalidate_caches(&self) -> Result<CacheKeys, CoordinatorError> {
        self.ctx.revalidate_caches().await
    }

    /// Runs the refetch strategy matching the current route, if any.
    pub async fn handle_route_specific_fetch(&self) -> Option<ViewRefetch> {
        self.ctx.handle_route_specific_fetch().await
    }

    // --- view strategies ---

    pub async fn fetch_conversations(&self) -> ViewRefetch {
        self.ctx.fetch_conversations().await
    }

    pub async fn fetch_conversations_on_reconnect(&self) -> FetchOutcome {
        self.ctx.fetch_conversations_on_reconnect().await
    }

    pub async fn fetch_filtered_or_saved_conversations(&self, query: Option<Value>) -> FetchOutcome {
        self.ctx.fetch_filtered_or_saved_conversations(query).await
    }

    pub async fn fetch_inbox_notifications_on_reconnect(&self) -> FetchOutcome {
        self.ctx.fetch_inbox_notifications_on_reconnect().await
    }

    pub async fn fetch_notifications_on_reconnect(&self) -> FetchOutcome {
        self.ctx.fetch_notifications_on_reconnect().await
    }

    // --- view context ---

    pub fn filters(&self) -> Filters {
        self.ctx.filters()
    }

    /// Replaces the base filter context.
    pub fn set_filters(&self, filters: Filters) {
        self.ctx.view().filters = filters;
    }

    pub fn scope(&self) -> ViewScope {
        self.ctx.scope()
    }

    /// Replaces the filter/folder scope of the conversation list.
    pub fn set_scope(&self, scope: ViewScope) {
        self.ctx.view().scope = scope;
    }

    /// Last pipeline phase reached.
    pub fn phase(&self) -> ResyncPhase {
        self.ctx.view().phase
    }

    fn listeners_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReconnectCoordinator {
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn online_listener(
    ctx: Arc<ResyncContext>,
    mut rx: Subscription<HostEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = rx.recv() => event,
        };
        match event {
            Some(HostEvent::Online) => {
                ctx.on_online();
            }
            None => break,
        }
    }
    debug!("online listener stopped");
}

async fn transport_listener(
    ctx: Arc<ResyncContext>,
    mut rx: Subscription<BusEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = rx.recv() => event,
        };
        match event {
            Some(BusEvent::Disconnect) => ctx.on_disconnect(),
            Some(BusEvent::Reconnect) => {
                // Overlapping reconnects each get their own pipeline.
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    ctx.fetch_on_reconnect().await;
                });
            }
            Some(BusEvent::ReconnectCompleted) => {}
            None => break,
        }
    }
    debug!("transport listener stopped");
}
