//! View-specific refetch strategies.
//!
//! Every terminal strategy makes a single dispatch attempt, never retries,
//! and publishes exactly one completion signal however the attempt ends.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::context::{CompletionGuard, ResyncContext};
use crate::types::{Action, FetchOutcome, ViewRefetch, ViewStrategy};

impl ResyncContext {
    /// Conversation views: active filter beats active folder beats the
    /// default list.
    pub(crate) async fn fetch_conversations(&self) -> ViewRefetch {
        let scope = self.scope();

        if scope.has_active_filter_set {
            let outcome = self
                .fetch_filtered_or_saved_conversations(scope.active_filter_query)
                .await;
            ViewRefetch {
                strategy: ViewStrategy::FilteredConversations,
                outcome,
            }
        } else if scope.has_active_folder {
            let outcome = self
                .fetch_filtered_or_saved_conversations(scope.active_folder_query)
                .await;
            ViewRefetch {
                strategy: ViewStrategy::FolderConversations,
                outcome,
            }
        } else {
            ViewRefetch {
                strategy: ViewStrategy::Conversations,
                outcome: self.fetch_conversations_on_reconnect().await,
            }
        }
    }

    /// Default list: everything updated during the outage, pagination reset.
    /// Skipped while the list is already loading.
    pub(crate) async fn fetch_conversations_on_reconnect(&self) -> FetchOutcome {
        let _done = CompletionGuard::new(&self.bus);

        if self.store.chat_list_loading() {
            debug!("conversation list already loading, skipping refetch");
            return FetchOutcome::Skipped;
        }

        let mut query = self.filters();
        query.insert("page".into(), Value::Null);
        query.insert(
            "updatedWithin".into(),
            Value::from(self.timer.seconds_since()),
        );
        self.attempt(Action::FetchAllConversations(Value::Object(query)))
            .await
    }

    /// Filtered or saved-folder list, first page.
    pub(crate) async fn fetch_filtered_or_saved_conversations(
        &self,
        query: Option<Value>,
    ) -> FetchOutcome {
        let _done = CompletionGuard::new(&self.bus);

        let payload = json!({
            "queryData": query.unwrap_or(Value::Null),
            "page": 1,
        });
        self.attempt(Action::FetchFilteredConversations(payload))
            .await
    }

    /// Inbox view notifications, first page with the base filters.
    pub(crate) async fn fetch_inbox_notifications_on_reconnect(&self) -> FetchOutcome {
        let _done = CompletionGuard::new(&self.bus);

        let mut filter = self.filters();
        filter.insert("page".into(), Value::from(1));
        self.attempt(Action::NotificationsIndex(Value::Object(filter)))
            .await
    }

    /// Notification center, first page. Base filters do not apply here.
    pub(crate) async fn fetch_notifications_on_reconnect(&self) -> FetchOutcome {
        let _done = CompletionGuard::new(&self.bus);

        self.attempt(Action::NotificationsGet(json!({ "page": 1 })))
            .await
    }

    async fn attempt(&self, action: Action) -> FetchOutcome {
        let name = action.name();
        match self.store.dispatch(action).await {
            Ok(_) => {
                debug!(action = name, "refetch dispatched");
                FetchOutcome::Completed
            }
            Err(e) => {
                warn!(action = name, error = %e, "refetch failed, keeping stale data");
                FetchOutcome::Failed(e.to_string())
            }
        }
    }
}
