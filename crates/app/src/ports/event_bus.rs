//! Event bus port — publish/subscribe for shadow state changes.

use std::future::Future;

use shadowhome_domain::error::ShadowError;
use shadowhome_domain::event::StateChange;

/// Publishes state changes to interested subscribers.
pub trait EventPublisher {
    /// Publish a change to all current subscribers.
    fn publish(&self, change: StateChange)
    -> impl Future<Output = Result<(), ShadowError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        change: StateChange,
    ) -> impl Future<Output = Result<(), ShadowError>> + Send {
        (**self).publish(change)
    }
}
