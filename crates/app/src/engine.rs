//! Shadow synchronization engine.
//!
//! The engine owns the [`Shadow`] and is the only thing that mutates it.
//! It runs a single cooperative loop that reacts to:
//!
//! - transport events (connection lifecycle, inbound deltas and verdicts),
//! - the entry-door close deadline scheduled by the access handshake,
//! - a periodic poll tick that debounces motion and polls the card reader.
//!
//! Every shadow change is published immediately as a full reported document
//! and forwarded to the [`EventPublisher`] as a [`StateChange`].

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use shadowhome_domain::document::{Delta, Verdict};
use shadowhome_domain::event::StateChange;
use shadowhome_domain::shadow::Shadow;
use shadowhome_domain::topics::Topics;

use crate::access::AccessControl;
use crate::config::EngineConfig;
use crate::motion::debounce_motion;
use crate::ports::{
    Actuators, CredentialReader, EventPublisher, MotionSensor, Transport, TransportEvent,
};
use crate::publisher::ShadowPublisher;
use crate::reconciler::Reconciler;
use crate::reconnect::LinkStatus;

/// Mirrors the cloud shadow onto local actuators and reports observed state.
pub struct ShadowEngine<T, A, E> {
    shadow: Shadow,
    topics: Topics,
    publisher: ShadowPublisher<T>,
    actuators: A,
    events: E,
    reconciler: Reconciler,
    access: AccessControl,
    status: LinkStatus,
    config: EngineConfig,
}

impl<T, A, E> ShadowEngine<T, A, E>
where
    T: Transport,
    A: Actuators,
    E: EventPublisher + Send + Sync,
{
    /// Create an engine with every attribute at its initial value.
    pub fn new(config: EngineConfig, topics: Topics, transport: T, actuators: A, events: E) -> Self {
        Self {
            shadow: Shadow::default(),
            publisher: ShadowPublisher::new(transport, topics.shadow_update.clone()),
            topics,
            actuators,
            events,
            reconciler: Reconciler::new(config.window_steps),
            access: AccessControl::new(config.dwell(), config.card_cooldown()),
            status: LinkStatus::default(),
            config,
        }
    }

    #[must_use]
    pub fn shadow(&self) -> &Shadow {
        &self.shadow
    }

    #[must_use]
    pub fn status(&self) -> LinkStatus {
        self.status
    }

    #[must_use]
    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        self.publisher.transport()
    }

    /// When the entry door is scheduled to close, if a dwell is running.
    #[must_use]
    pub fn door_close_deadline(&self) -> Option<Instant> {
        self.access.close_deadline()
    }

    /// Publish the full shadow. Failures are logged; the transport's
    /// reconnect policy is the recovery path.
    pub async fn publish_shadow(&mut self) {
        report(&self.publisher, &self.shadow, self.status).await;
    }

    /// React to one event from the connection driver.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.on_connected().await,
            TransportEvent::Disconnected { attempt, retry_in } => {
                tracing::warn!(attempt, ?retry_in, "link degraded");
                self.status = LinkStatus::Degraded {
                    attempts: attempt,
                    retry_in,
                };
            }
            TransportEvent::GaveUp { attempts } => {
                tracing::error!(attempts, "reconnect policy exhausted, running offline");
                self.status = LinkStatus::Offline;
            }
            TransportEvent::Message { topic, payload } => {
                self.handle_message(&topic, &payload).await;
            }
        }
    }

    /// Baseline sync after every (re)connection: exactly one full publish,
    /// whether or not anything changed while disconnected.
    pub async fn on_connected(&mut self) {
        tracing::info!("link online, publishing baseline shadow");
        self.status = LinkStatus::Online;
        self.publish_shadow().await;
    }

    /// Route an inbound message by topic. Malformed payloads are dropped.
    pub async fn handle_message(&mut self, topic: &str, payload: &[u8]) {
        tracing::debug!(topic, len = payload.len(), "message received");
        if topic == self.topics.card_check_response {
            match Verdict::from_slice(payload) {
                Ok(verdict) => self.handle_verdict(&verdict).await,
                Err(err) => tracing::debug!(error = %err, "dropping malformed verdict"),
            }
        } else if topic == self.topics.shadow_delta {
            match Delta::from_slice(payload) {
                Ok(delta) => {
                    self.apply_delta(&delta).await;
                }
                Err(err) => tracing::debug!(error = %err, "dropping malformed delta"),
            }
        } else {
            tracing::debug!(topic, "ignoring message on unexpected topic");
        }
    }

    /// Reconcile a delta and publish once if anything changed.
    ///
    /// Returns whether any attribute changed.
    #[tracing::instrument(skip_all, fields(requested = delta.changes().len()))]
    pub async fn apply_delta(&mut self, delta: &Delta) -> bool {
        let changes = self
            .reconciler
            .apply(&mut self.shadow, &mut self.actuators, delta);
        if changes.is_empty() {
            return false;
        }
        report(&self.publisher, &self.shadow, self.status).await;
        record(&self.events, changes).await;
        true
    }

    /// Act on a credential verdict. Only `VALID` has any effect.
    #[tracing::instrument(skip_all, fields(status = %verdict.status))]
    pub async fn handle_verdict(&mut self, verdict: &Verdict) {
        tracing::info!(
            card_uid = verdict.card_uid.as_deref().unwrap_or("-"),
            "card verdict received"
        );
        if !verdict.is_valid() {
            tracing::info!("access denied");
            return;
        }
        if let Some(change) = self
            .access
            .grant(&mut self.shadow, &mut self.actuators, Instant::now())
        {
            self.publish_change(change).await;
        }
    }

    /// Close the entry door if its dwell has elapsed.
    pub async fn close_door_if_due(&mut self) {
        if let Some(change) =
            self.access
                .close_if_due(&mut self.shadow, &mut self.actuators, Instant::now())
        {
            self.publish_change(change).await;
        }
    }

    /// Consume a latched motion edge, publishing on a level change.
    pub async fn poll_motion<M: MotionSensor + ?Sized>(&mut self, sensor: &M) {
        if let Some(change) = debounce_motion(&mut self.shadow, sensor) {
            self.publish_change(change).await;
        }
    }

    /// Poll the card reader and fire a check request for a new card.
    ///
    /// Requests are only sent while the link is online; a card read
    /// otherwise is consumed and dropped.
    pub async fn poll_credentials<R: CredentialReader + ?Sized>(&mut self, reader: &mut R) {
        let Some(request) = self.access.poll_reader(reader, Instant::now()) else {
            return;
        };
        if self.status != LinkStatus::Online {
            tracing::warn!(
                card_uid = %request.card_uid,
                status = ?self.status,
                "card check request dropped, link not online"
            );
            return;
        }
        let payload = match request.encode() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "card check request not encoded");
                return;
            }
        };
        match self
            .publisher
            .transport()
            .publish(&self.topics.card_check_request, payload)
            .await
        {
            Ok(()) => tracing::info!(card_uid = %request.card_uid, "card check requested"),
            Err(err) => tracing::warn!(error = %err, "card check request not published"),
        }
    }

    /// Run the poll loop until `shutdown` resolves.
    ///
    /// Returns the engine so callers can inspect the final state.
    pub async fn run<M, R, S>(
        mut self,
        mut inbound: mpsc::Receiver<TransportEvent>,
        motion: M,
        mut reader: R,
        shutdown: S,
    ) -> Self
    where
        M: MotionSensor,
        R: CredentialReader,
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inbound_open = true;
        tokio::pin!(shutdown);

        tracing::info!(
            poll_interval = ?self.config.poll_interval(),
            dwell = ?self.config.dwell(),
            "shadow engine started"
        );

        loop {
            let close_at = self.access.close_deadline();
            // Timers before inbound: a busy link must not hold the door open.
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                () = sleep_until(close_at) => self.close_door_if_due().await,
                _ = ticker.tick() => {
                    self.poll_motion(&motion).await;
                    self.poll_credentials(&mut reader).await;
                }
                event = inbound.recv(), if inbound_open => match event {
                    Some(event) => self.handle_transport_event(event).await,
                    None => {
                        tracing::warn!("transport driver stopped");
                        inbound_open = false;
                    }
                },
            }
        }

        tracing::info!("shadow engine stopped");
        self
    }

    async fn publish_change(&mut self, change: StateChange) {
        report(&self.publisher, &self.shadow, self.status).await;
        record(&self.events, vec![change]).await;
    }
}

async fn report<T: Transport>(publisher: &ShadowPublisher<T>, shadow: &Shadow, status: LinkStatus) {
    if let Err(err) = publisher.publish(shadow).await {
        tracing::warn!(error = %err, ?status, "reported shadow not published");
    }
}

async fn record<E: EventPublisher>(events: &E, changes: Vec<StateChange>) {
    for change in changes {
        if let Err(err) = events.publish(change).await {
            tracing::debug!(error = %err, "state change not forwarded");
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
