//! Reconnect pipeline: reload decision, cache revalidation, view dispatch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::{InFlightGuard, ResyncContext};
use crate::error::CoordinatorError;
use crate::timing::exceeds_reload_threshold;
use crate::types::{
    Action, CacheKeys, OnlineDecision, ResyncPhase, ResyncReport, ViewRefetch, ViewStrategy,
};

impl ResyncContext {
    /// Host came back online. Reloads after a long outage; shorter outages
    /// are resynced by the transport reconnect signal instead.
    pub(crate) fn on_online(&self) -> OnlineDecision {
        let seconds = self.timer.seconds_since();
        if !exceeds_reload_threshold(seconds) {
            debug!(seconds, "back online, leaving resync to transport reconnect");
            return OnlineDecision::NoAction;
        }

        info!(seconds, "outage exceeded reload threshold, reloading");
        self.host.reload();
        self.timer.reset();
        // A running pipeline owns the phase until it finishes.
        if self.pipelines_in_flight() == 0 {
            self.set_phase(ResyncPhase::Idle);
        }
        OnlineDecision::Reloaded { seconds }
    }

    /// Runs one resync: revalidate caches, then refetch the current view.
    ///
    /// A failed cache key lookup is logged and does not stop the view
    /// refetch, so UI listeners still get their completion signal.
    pub(crate) async fn fetch_on_reconnect(&self) -> ResyncReport {
        let _running = InFlightGuard::new(&self.in_flight);
        self.set_phase(ResyncPhase::Reconnected);
        info!(
            seconds = self.timer.seconds_since(),
            route = %self.current_route_name(),
            "resyncing after reconnect"
        );

        let cache_keys = match self.revalidate_caches().await {
            Ok(keys) => Some(keys),
            Err(e) => {
                warn!(error = %e, "cache revalidation skipped");
                None
            }
        };
        self.set_phase(ResyncPhase::CachesRevalidated);

        let view = self.handle_route_specific_fetch().await;
        self.set_phase(ResyncPhase::ViewDataRefetched);

        match &view {
            Some(v) => info!(strategy = ?v.strategy, outcome = ?v.outcome, "resync finished"),
            None => debug!("resync finished, no view refetch for route"),
        }
        self.set_phase(ResyncPhase::Idle);

        ResyncReport { cache_keys, view }
    }

    /// Fetches fresh cache keys, then fires the label/inbox/team
    /// revalidations without waiting for them.
    pub(crate) async fn revalidate_caches(&self) -> Result<CacheKeys, CoordinatorError> {
        let raw = self.store.dispatch(Action::GetCacheKeys).await?;
        let keys: CacheKeys = serde_json::from_value(raw)?;

        for action in keys.revalidations() {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                let name = action.name();
                if let Err(e) = store.dispatch(action).await {
                    warn!(action = name, error = %e, "cache revalidation failed");
                }
            });
        }

        Ok(keys)
    }

    /// Picks the refetch strategy for the current route and runs it.
    pub(crate) async fn handle_route_specific_fetch(&self) -> Option<ViewRefetch> {
        let name = self.current_route_name();

        if self.routes.is_conversation_route(&name, true) {
            Some(self.fetch_conversations().await)
        } else if self.routes.is_inbox_view_route(&name, true) {
            let outcome = self.fetch_inbox_notifications_on_reconnect().await;
            Some(ViewRefetch {
                strategy: ViewStrategy::InboxNotifications,
                outcome,
            })
        } else if self.routes.is_notification_route(&name) {
            let outcome = self.fetch_notifications_on_reconnect().await;
            Some(ViewRefetch {
                strategy: ViewStrategy::Notifications,
                outcome,
            })
        } else {
            debug!(route = %name, "no refetch strategy for route");
            None
        }
    }
}
