//! Transport port — the publish/subscribe link to the cloud side.

use std::future::Future;
use std::time::Duration;

use shadowhome_domain::error::ShadowError;

/// Outbound half of the publish/subscribe transport.
///
/// Implementations must not block the caller while the link is down: a
/// publish that cannot be queued fails with [`ShadowError::Transport`].
pub trait Transport: Send + Sync {
    /// Hand `payload` to the transport for delivery on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ShadowError>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ShadowError>> + Send {
        (**self).publish(topic, payload)
    }
}

/// Inbound half: what the connection driver reports to the engine.
///
/// The driver owns the session; the engine only reacts to these events,
/// delivered through a channel bound to the engine's run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Session (re)established and both inbound topics subscribed.
    Connected,
    /// Session lost; the driver will retry after `retry_in`.
    Disconnected { attempt: u32, retry_in: Duration },
    /// The reconnect policy is exhausted; the driver stopped.
    GaveUp { attempts: u32 },
    /// A message arrived on a subscribed topic.
    Message { topic: String, payload: Vec<u8> },
}
