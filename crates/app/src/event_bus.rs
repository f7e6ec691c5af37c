//! Fan-out of [`StateChange`] records to in-process listeners.

use std::future::Future;

use tokio::sync::broadcast;

use shadowhome_domain::error::ShadowError;
use shadowhome_domain::event::StateChange;

use crate::ports::EventPublisher;

/// Broadcasts every applied change to the current subscribers.
///
/// Slow subscribers lose the oldest records once `capacity` is exceeded
/// (they observe [`broadcast::error::RecvError::Lagged`]); the engine never
/// waits for them.
pub struct InProcessEventBus {
    sender: broadcast::Sender<StateChange>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every change published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(
        &self,
        change: StateChange,
    ) -> impl Future<Output = Result<(), ShadowError>> + Send {
        match self.sender.send(change) {
            Ok(receivers) => tracing::trace!(receivers, "state change broadcast"),
            Err(broadcast::error::SendError(change)) => {
                tracing::trace!(attribute = %change.attribute, "no listener for state change");
            }
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowhome_domain::attribute::{Attribute, ShadowValue};
    use shadowhome_domain::event::ChangeOrigin;
    use shadowhome_domain::time::now;

    fn door(to: ShadowValue) -> StateChange {
        let from = if to == ShadowValue::Open {
            ShadowValue::Closed
        } else {
            ShadowValue::Open
        };
        StateChange::new(Attribute::DoorMain, from, to, ChangeOrigin::Access, now())
    }

    #[tokio::test]
    async fn should_fan_out_to_every_subscriber() {
        let bus = InProcessEventBus::new(8);
        let mut recorder = bus.subscribe();
        let mut audit = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(door(ShadowValue::Open)).await.unwrap();

        assert_eq!(recorder.recv().await.unwrap().to, ShadowValue::Open);
        assert_eq!(
            audit.recv().await.unwrap().origin,
            ChangeOrigin::Access
        );
    }

    #[tokio::test]
    async fn should_accept_changes_without_subscribers() {
        let bus = InProcessEventBus::new(8);
        assert!(bus.publish(door(ShadowValue::Open)).await.is_ok());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn should_preserve_publication_order() {
        let bus = InProcessEventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(door(ShadowValue::Open)).await.unwrap();
        bus.publish(door(ShadowValue::Closed)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().to, ShadowValue::Open);
        assert_eq!(rx.recv().await.unwrap().to, ShadowValue::Closed);
    }

    #[tokio::test]
    async fn should_report_lag_to_slow_subscriber() {
        let bus = InProcessEventBus::new(1);
        let mut rx = bus.subscribe();

        bus.publish(door(ShadowValue::Open)).await.unwrap();
        bus.publish(door(ShadowValue::Closed)).await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().to, ShadowValue::Closed);
    }
}
