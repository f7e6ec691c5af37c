//! Shadow publisher — reports the full shadow on the update topic.

use shadowhome_domain::error::ShadowError;
use shadowhome_domain::shadow::Shadow;

use crate::ports::Transport;

/// Serializes the full shadow and hands it to the transport.
///
/// There is no batching: every call produces exactly one publish.
pub struct ShadowPublisher<T> {
    transport: T,
    topic: String,
}

impl<T: Transport> ShadowPublisher<T> {
    #[must_use]
    pub fn new(transport: T, topic: impl Into<String>) -> Self {
        Self {
            transport,
            topic: topic.into(),
        }
    }

    /// Publish the reported-state document built from `shadow`.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowError::Payload`] if encoding fails or
    /// [`ShadowError::Transport`] if the transport rejects the message.
    pub async fn publish(&self, shadow: &Shadow) -> Result<(), ShadowError> {
        let payload = shadow.to_reported().encode()?;
        tracing::debug!(
            topic = %self.topic,
            payload = %String::from_utf8_lossy(&payload),
            "publishing reported shadow"
        );
        self.transport.publish(&self.topic, payload).await
    }

    /// The underlying transport, shared with the access handshake.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
