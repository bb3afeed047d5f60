//! Store capability consumed by the coordinator.
//!
//! The application implements [`Store`] on top of its state container.
//! Keeping it a trait keeps resync logic decoupled from the store and
//! testable with mocks.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::DispatchError;
use crate::types::Action;

/// Future returned by [`Store::dispatch`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send + 'a>>;

/// Asynchronous action dispatcher plus the one getter the coordinator reads.
pub trait Store: Send + Sync {
    /// Dispatches an action and resolves with the store's result.
    fn dispatch(&self, action: Action) -> DispatchFuture<'_>;

    /// Whether the conversation list is currently being loaded.
    fn chat_list_loading(&self) -> bool;
}
