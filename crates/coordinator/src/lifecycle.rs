//! Coordinator lifecycle: one live instance per slot.
//!
//! The application's composition root owns a [`CoordinatorSlot`] and hands
//! out the shared coordinator from it. Tests create their own slots.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::coordinator::{CoordinatorDeps, ReconnectCoordinator};
use crate::navigation::Route;
use crate::types::Filters;

/// Holds at most one [`ReconnectCoordinator`] built from a fixed set of
/// collaborators.
pub struct CoordinatorSlot {
    deps: CoordinatorDeps,
    instance: Mutex<Option<Arc<ReconnectCoordinator>>>,
}

impl CoordinatorSlot {
    pub fn new(deps: CoordinatorDeps) -> Self {
        Self {
            deps,
            instance: Mutex::new(None),
        }
    }

    /// Returns the live coordinator, creating it from `route` and `filters`
    /// if there is none. Arguments are ignored when an instance exists.
    /// Creating does not activate listeners.
    pub fn get_instance(
        &self,
        route: watch::Receiver<Route>,
        filters: Option<Filters>,
    ) -> Arc<ReconnectCoordinator> {
        let mut slot = self.slot();
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }

        let coordinator = Arc::new(ReconnectCoordinator::new(
            self.deps.clone(),
            route,
            filters.unwrap_or_default(),
        ));
        *slot = Some(Arc::clone(&coordinator));
        debug!("reconnect coordinator created");
        coordinator
    }

    /// The live coordinator, if any.
    pub fn instance(&self) -> Option<Arc<ReconnectCoordinator>> {
        self.slot().clone()
    }

    /// Deactivates and discards the live coordinator. No-op when empty.
    pub fn reset_instance(&self) {
        if let Some(coordinator) = self.slot().take() {
            coordinator.deactivate();
            debug!("reconnect coordinator reset");
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<ReconnectCoordinator>>> {
        self.instance.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, settle};
    use serde_json::json;

    #[test]
    fn get_instance_reuses_existing() {
        let fx = Fixture::new("home");
        let slot = CoordinatorSlot::new(fx.deps());

        let mut filters = Filters::new();
        filters.insert("status".into(), json!("open"));
        let first = slot.get_instance(fx.route(), Some(filters.clone()));
        let second = slot.get_instance(fx.route(), None);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.filters(), filters);
    }

    #[test]
    fn missing_filters_default_to_empty() {
        let fx = Fixture::new("home");
        let slot = CoordinatorSlot::new(fx.deps());
        assert!(slot.get_instance(fx.route(), None).filters().is_empty());
    }

    #[test]
    fn get_instance_does_not_activate() {
        let fx = Fixture::new("home");
        let slot = CoordinatorSlot::new(fx.deps());
        assert!(!slot.get_instance(fx.route(), None).is_active());
    }

    #[tokio::test]
    async fn reset_deactivates_and_discards() {
        let fx = Fixture::new("home");
        let slot = CoordinatorSlot::new(fx.deps());
        let coord = slot.get_instance(fx.route(), None);
        coord.activate();

        slot.reset_instance();
        assert!(!coord.is_active());
        assert!(slot.instance().is_none());

        settle().await;
        assert_eq!(fx.bus.subscriber_count(), 0);
        assert_eq!(fx.host_events.subscriber_count(), 0);

        let fresh = slot.get_instance(fx.route(), None);
        assert!(!Arc::ptr_eq(&coord, &fresh));
    }

    #[test]
    fn reset_twice_is_noop() {
        let fx = Fixture::new("home");
        let slot = CoordinatorSlot::new(fx.deps());
        slot.get_instance(fx.route(), None);

        slot.reset_instance();
        slot.reset_instance();
        assert!(slot.instance().is_none());
    }

    #[test]
    fn reset_on_empty_slot_is_noop() {
        let fx = Fixture::new("home");
        let slot = CoordinatorSlot::new(fx.deps());
        slot.reset_instance();
        assert!(slot.instance().is_none());
    }
}
