//! Data types shared by the coordinator and its collaborators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Opaque key/value query context for list refetches.
pub type Filters = Map<String, Value>;

/// A store action understood by the external dispatcher.
///
/// Payloads are opaque JSON; the coordinator only shapes the keys it owns
/// (`page`, `updatedWithin`, `queryData`, `newKey`).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FetchAllConversations(Value),
    FetchFilteredConversations(Value),
    NotificationsIndex(Value),
    NotificationsGet(Value),
    GetCacheKeys,
    RevalidateLabels(Value),
    RevalidateInboxes(Value),
    RevalidateTeams(Value),
}

impl Action {
    /// Store action name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchAllConversations(_) => "fetchAllConversations",
            Self::FetchFilteredConversations(_) => "fetchFilteredConversations",
            Self::NotificationsIndex(_) => "notifications/index",
            Self::NotificationsGet(_) => "notifications/get",
            Self::GetCacheKeys => "accounts/getCacheKeys",
            Self::RevalidateLabels(_) => "labels/revalidate",
            Self::RevalidateInboxes(_) => "inboxes/revalidate",
            Self::RevalidateTeams(_) => "teams/revalidate",
        }
    }

    /// Payload sent along with the action, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::GetCacheKeys => None,
            Self::FetchAllConversations(p)
            | Self::FetchFilteredConversations(p)
            | Self::NotificationsIndex(p)
            | Self::NotificationsGet(p)
            | Self::RevalidateLabels(p)
            | Self::RevalidateInboxes(p)
            | Self::RevalidateTeams(p) => Some(p),
        }
    }
}

/// Fresh cache-validity keys returned by `accounts/getCacheKeys`.
///
/// Keys are opaque; a missing key decodes as `null` and is forwarded as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheKeys {
    #[serde(default)]
    pub label: Value,
    #[serde(default)]
    pub inbox: Value,
    #[serde(default)]
    pub team: Value,
}

impl CacheKeys {
    /// The three revalidation actions carrying these keys.
    pub fn revalidations(&self) -> [Action; 3] {
        [
            Action::RevalidateLabels(json!({ "newKey": self.label })),
            Action::RevalidateInboxes(json!({ "newKey": self.inbox })),
            Action::RevalidateTeams(json!({ "newKey": self.team })),
        ]
    }
}

/// Filter/folder context scoping the conversation list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewScope {
    pub has_active_filter_set: bool,
    pub active_filter_query: Option<Value>,
    pub has_active_folder: bool,
    pub active_folder_query: Option<Value>,
}

impl ViewScope {
    /// Scope with an ad-hoc filter query applied.
    pub fn filtered(query: Value) -> Self {
        Self {
            has_active_filter_set: true,
            active_filter_query: Some(query),
            ..Self::default()
        }
    }

    /// Scope with a saved folder query applied.
    pub fn folder(query: Value) -> Self {
        Self {
            has_active_folder: true,
            active_folder_query: Some(query),
            ..Self::default()
        }
    }
}

/// Phases of one reconnect cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResyncPhase {
    Disconnected,
    Reconnected,
    CachesRevalidated,
    ViewDataRefetched,
    #[default]
    Idle,
}

/// Result of a single refetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The dispatch resolved.
    Completed,
    /// Nothing was dispatched (list already loading).
    Skipped,
    /// The dispatch was rejected; the reason is kept for logging.
    Failed(String),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Refetch strategy picked for the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStrategy {
    /// Default conversation list, delta since the disconnect.
    Conversations,
    /// Conversation list scoped by an ad-hoc filter query.
    FilteredConversations,
    /// Conversation list scoped by a saved folder query.
    FolderConversations,
    /// Notifications shown inside the inbox view.
    InboxNotifications,
    /// Notification center.
    Notifications,
}

/// Which strategy ran and how it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRefetch {
    pub strategy: ViewStrategy,
    pub outcome: FetchOutcome,
}

/// Summary of one `fetch_on_reconnect` run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResyncReport {
    /// Keys used for revalidation; `None` when the lookup failed.
    pub cache_keys: Option<CacheKeys>,
    /// `None` when the current route has no refetch strategy.
    pub view: Option<ViewRefetch>,
}

/// Decision taken when the host comes back online.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineDecision {
    /// The outage was long enough to force a full reload.
    Reloaded { seconds: u64 },
    /// Resync is left to the transport reconnect signal.
    NoAction,
}
