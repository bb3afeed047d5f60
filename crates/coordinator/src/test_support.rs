//! Mocks shared by the unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use resync_bus::{BusEvent, EventBus, HostEvent};
use serde_json::{Value, json};
use tokio::sync::{Notify, watch};

use crate::coordinator::{CoordinatorDeps, ReconnectCoordinator};
use crate::error::DispatchError;
use crate::host::{Clock, Host};
use crate::navigation::{Route, RouteClassifier, RouteTable};
use crate::store::{DispatchFuture, Store};
use crate::types::{Action, Filters};

/// Lets spawned tasks (listeners, revalidations) run to completion.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub(crate) struct ManualClock {
    start: DateTime<Utc>,
    offset_ms: Mutex<i64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            offset_ms: Mutex::new(0),
        }
    }
}

impl ManualClock {
    pub(crate) fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }

    pub(crate) fn advance_millis(&self, ms: i64) {
        *self.offset_ms.lock().unwrap() += ms;
    }

    pub(crate) fn set_offset_secs(&self, secs: i64) {
        *self.offset_ms.lock().unwrap() = secs * 1000;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.start + TimeDelta::milliseconds(*self.offset_ms.lock().unwrap())
    }
}

#[derive(Default)]
pub(crate) struct CountingHost {
    reloads: AtomicUsize,
}

impl CountingHost {
    pub(crate) fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Host for CountingHost {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct MockStore {
    calls: Mutex<Vec<(&'static str, Option<Value>)>>,
    failing: Mutex<HashSet<&'static str>>,
    cache_keys: Mutex<Value>,
    loading: AtomicBool,
    held: Mutex<Option<(&'static str, Arc<Notify>)>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            cache_keys: Mutex::new(json!({ "label": 1, "inbox": 2, "team": 3 })),
            loading: AtomicBool::new(false),
            held: Mutex::new(None),
        }
    }
}

impl MockStore {
    pub(crate) fn calls(&self) -> Vec<(&'static str, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn called(&self, action: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|(n, _)| *n == action)
    }

    pub(crate) fn fail(&self, action: &'static str) {
        self.failing.lock().unwrap().insert(action);
    }

    pub(crate) fn set_cache_keys(&self, keys: Value) {
        *self.cache_keys.lock().unwrap() = keys;
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    /// Keeps dispatches of `action` pending until the returned handle is
    /// notified.
    pub(crate) fn hold(&self, action: &'static str) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.held.lock().unwrap() = Some((action, Arc::clone(&release)));
        release
    }
}

impl Store for MockStore {
    fn dispatch(&self, action: Action) -> DispatchFuture<'_> {
        let name = action.name();
        self.calls
            .lock()
            .unwrap()
            .push((name, action.payload().cloned()));

        let result = if self.failing.lock().unwrap().contains(name) {
            Err(DispatchError::Rejected {
                action: name,
                reason: "mock failure".into(),
            })
        } else if matches!(action, Action::GetCacheKeys) {
            Ok(self.cache_keys.lock().unwrap().clone())
        } else {
            Ok(Value::Null)
        };
        let gate = self
            .held
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(held, _)| *held == name)
            .map(|(_, release)| Arc::clone(release));
        Box::pin(async move {
            if let Some(release) = gate {
                release.notified().await;
            }
            result
        })
    }

    fn chat_list_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct MockRoutes {
    table: Mutex<RouteTable>,
}

impl MockRoutes {
    pub(crate) fn conversation(&self, name: &str) {
        self.table.lock().unwrap().conversation.insert(name.into());
    }

    pub(crate) fn inbox_view(&self, name: &str) {
        self.table.lock().unwrap().inbox_view.insert(name.into());
    }

    pub(crate) fn notification(&self, name: &str) {
        self.table.lock().unwrap().notification.insert(name.into());
    }
}

impl RouteClassifier for MockRoutes {
    fn is_conversation_route(&self, name: &str, strict: bool) -> bool {
        self.table.lock().unwrap().is_conversation_route(name, strict)
    }

    fn is_inbox_view_route(&self, name: &str, strict: bool) -> bool {
        self.table.lock().unwrap().is_inbox_view_route(name, strict)
    }

    fn is_notification_route(&self, name: &str) -> bool {
        self.table.lock().unwrap().is_notification_route(name)
    }
}

/// One set of mocks wired the way the app wires the real collaborators.
pub(crate) struct Fixture {
    pub(crate) store: Arc<MockStore>,
    pub(crate) routes: Arc<MockRoutes>,
    pub(crate) host: Arc<CountingHost>,
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) bus: EventBus<BusEvent>,
    pub(crate) host_events: EventBus<HostEvent>,
    route_tx: watch::Sender<Route>,
}

impl Fixture {
    pub(crate) fn new(route: &str) -> Self {
        let (route_tx, _) = watch::channel(Route::named(route));
        Self {
            store: Arc::new(MockStore::default()),
            routes: Arc::new(MockRoutes::default()),
            host: Arc::new(CountingHost::default()),
            clock: Arc::new(ManualClock::default()),
            bus: EventBus::new(),
            host_events: EventBus::new(),
            route_tx,
        }
    }

    pub(crate) fn deps(&self) -> CoordinatorDeps {
        CoordinatorDeps::new(
            self.store.clone(),
            self.routes.clone(),
            self.host.clone(),
            self.bus.clone(),
            self.host_events.clone(),
        )
        .with_clock(self.clock.clone())
    }

    pub(crate) fn route(&self) -> watch::Receiver<Route> {
        self.route_tx.subscribe()
    }

    pub(crate) fn coordinator(&self, filters: Filters) -> ReconnectCoordinator {
        ReconnectCoordinator::new(self.deps(), self.route(), filters)
    }

    pub(crate) fn navigate(&self, route: &str) {
        self.route_tx.send_replace(Route::named(route));
    }
}
