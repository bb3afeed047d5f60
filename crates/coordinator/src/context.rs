//! Shared coordinator state handed to listener and pipeline tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use resync_bus::{BusEvent, EventBus};
use tokio::sync::watch;
use tracing::debug;

use crate::host::Host;
use crate::navigation::{Route, RouteClassifier};
use crate::store::Store;
use crate::timing::DisconnectClock;
use crate::types::{Filters, ResyncPhase, ViewScope};

/// Mutable view context owned by the coordinator.
#[derive(Debug, Default)]
pub(crate) struct ViewState {
    pub(crate) filters: Filters,
    pub(crate) scope: ViewScope,
    pub(crate) phase: ResyncPhase,
}

/// Everything a resync run needs. Cloned into spawned tasks behind an `Arc`.
pub(crate) struct ResyncContext {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) routes: Arc<dyn RouteClassifier>,
    pub(crate) host: Arc<dyn Host>,
    pub(crate) bus: EventBus<BusEvent>,
    pub(crate) route: watch::Receiver<Route>,
    pub(crate) timer: DisconnectClock,
    pub(crate) view: Mutex<ViewState>,
    /// Resync pipelines currently running.
    pub(crate) in_flight: AtomicUsize,
}

impl ResyncContext {
    pub(crate) fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_phase(&self, phase: ResyncPhase) {
        self.view().phase = phase;
        debug!(?phase, "resync phase");
    }

    pub(crate) fn filters(&self) -> Filters {
        self.view().filters.clone()
    }

    pub(crate) fn scope(&self) -> ViewScope {
        self.view().scope.clone()
    }

    pub(crate) fn pipelines_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn current_route_name(&self) -> String {
        self.route.borrow().name.clone()
    }

    /// Transport dropped: remember when.
    pub(crate) fn on_disconnect(&self) {
        self.timer.record();
        self.set_phase(ResyncPhase::Disconnected);
        debug!("transport disconnected");
    }
}

/// Counts a resync pipeline as running until dropped.
pub(crate) struct InFlightGuard<'a> {
    count: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn new(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self { count }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Publishes [`BusEvent::ReconnectCompleted`] when dropped.
///
/// Held for the whole body of a terminal fetch strategy so the completion
/// signal fires exactly once on every exit path, including a dropped future.
pub(crate) struct CompletionGuard<'a> {
    bus: &'a EventBus<BusEvent>,
}

impl<'a> CompletionGuard<'a> {
    pub(crate) fn new(bus: &'a EventBus<BusEvent>) -> Self {
        Self { bus }
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        let reached = self.bus.emit(BusEvent::ReconnectCompleted);
        debug!(subscribers = reached, "reconnect completed");
    }
}
