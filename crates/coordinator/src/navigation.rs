//! Navigation context and route classification.
//!
//! The router owns the current [`Route`] and publishes it through a
//! `tokio::sync::watch` channel; the coordinator only reads it. Deciding
//! which view a route name belongs to is delegated to a [`RouteClassifier`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The route currently displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Route {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }
}

/// Classifies route names into the views the coordinator knows how to refetch.
pub trait RouteClassifier: Send + Sync {
    /// Conversation list or conversation detail. `strict` also matches the
    /// base list routes.
    fn is_conversation_route(&self, name: &str, strict: bool) -> bool;

    /// Inbox view. `strict` also matches the base inbox view route.
    fn is_inbox_view_route(&self, name: &str, strict: bool) -> bool;

    /// Notification center.
    fn is_notification_route(&self, name: &str) -> bool;
}

/// Classifier backed by explicit route name lists, usually loaded from config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub conversation: HashSet<String>,
    pub conversation_base: HashSet<String>,
    pub inbox_view: HashSet<String>,
    pub inbox_view_base: HashSet<String>,
    pub notification: HashSet<String>,
}

fn matches(name: &str, names: &HashSet<String>, base: &HashSet<String>, strict: bool) -> bool {
    names.contains(name) || (strict && base.contains(name))
}

impl RouteClassifier for RouteTable {
    fn is_conversation_route(&self, name: &str, strict: bool) -> bool {
        matches(name, &self.conversation, &self.conversation_base, strict)
    }

    fn is_inbox_view_route(&self, name: &str, strict: bool) -> bool {
        matches(name, &self.inbox_view, &self.inbox_view_base, strict)
    }

    fn is_notification_route(&self, name: &str) -> bool {
        self.notification.contains(name)
    }
}
