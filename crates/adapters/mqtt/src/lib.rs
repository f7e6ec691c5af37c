//! # shadowhome-adapter-mqtt
//!
//! MQTT adapter — links the shadow engine to the cloud broker.
//!
//! ## Responsibilities
//! - Connect to the broker (plain TCP or mutual TLS)
//! - Subscribe to the delta and verdict topics after every (re)connection
//! - Forward inbound messages and connection lifecycle to the engine as
//!   [`TransportEvent`]s
//! - Publish outbound documents without blocking the engine
//! - Retry lost sessions according to the [`ReconnectPolicy`]
//!
//! Publishes are refused while the session is down, so nothing queued
//! offline is replayed after a reconnection and the request queue always has
//! room for the subscriptions.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `shadowhome-app` and `shadowhome-domain`.

pub mod config;
pub mod error;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::sync::mpsc;

use shadowhome_app::ports::{Transport, TransportEvent};
use shadowhome_app::reconnect::{Backoff, ReconnectPolicy};
use shadowhome_domain::error::ShadowError;
use shadowhome_domain::topics::Topics;

pub use config::{MqttConfig, TlsFiles};
pub use error::MqttError;

const QOS: QoS = QoS::AtLeastOnce;

/// Outbound half: queues publishes on the rumqttc request channel.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
    online: Arc<AtomicBool>,
}

impl Transport for MqttTransport {
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ShadowError>> + Send {
        let result = if self.online.load(Ordering::Acquire) {
            self.client
                .try_publish(topic, QOS, false, payload)
                .map_err(|err| MqttError::from(err).into_domain())
        } else {
            Err(MqttError::NotConnected.into_domain())
        };
        async move { result }
    }
}

/// Inbound half: owns the rumqttc event loop and the reconnect backoff.
pub struct MqttConnection {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: Topics,
    backoff: Backoff,
    online: Arc<AtomicBool>,
    /// Inbound topics not yet queued for the current session.
    unsubscribed: Vec<String>,
}

/// Create the transport and its connection driver.
///
/// Nothing touches the network until [`MqttConnection::run`] is polled.
///
/// # Errors
///
/// Returns [`MqttError::Tls`] if the configured TLS material cannot be read.
pub fn connect(
    config: &MqttConfig,
    policy: ReconnectPolicy,
) -> Result<(MqttTransport, MqttConnection), MqttError> {
    let options = config.mqtt_options()?;
    let (client, eventloop) = AsyncClient::new(options, config.request_capacity);
    tracing::info!(
        broker = %config.broker_host,
        port = config.broker_port,
        client_id = %config.client_id,
        tls = config.tls.is_some(),
        "mqtt client created"
    );
    let online = Arc::new(AtomicBool::new(false));
    let connection = MqttConnection {
        client: client.clone(),
        eventloop,
        topics: Topics::for_thing(&config.thing_name),
        backoff: Backoff::new(policy),
        online: Arc::clone(&online),
        unsubscribed: Vec::new(),
    };
    Ok((MqttTransport { client, online }, connection))
}

impl MqttConnection {
    /// Drive the session until the engine hangs up or the reconnect policy
    /// is exhausted.
    ///
    /// [`TransportEvent::Connected`] is only sent once both inbound
    /// subscriptions are queued for the new session.
    pub async fn run(mut self, events: mpsc::Sender<TransportEvent>) {
        loop {
            let event = match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    tracing::info!(code = ?ack.code, "connected to broker");
                    self.backoff.reset();
                    self.unsubscribed = self
                        .topics
                        .inbound()
                        .into_iter()
                        .map(String::from)
                        .collect();
                    self.finish_subscribing()
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => Some(TransportEvent::Message {
                    topic: String::from_utf8_lossy(publish.topic.as_ref()).into_owned(),
                    payload: publish.payload.to_vec(),
                }),
                Ok(_) => self.finish_subscribing(),
                Err(err) => {
                    self.online.store(false, Ordering::Release);
                    self.unsubscribed.clear();
                    match self.backoff.next_delay() {
                        Some(retry_in) => {
                            let attempt = self.backoff.attempts();
                            tracing::warn!(error = %err, attempt, ?retry_in, "broker connection lost");
                            if events
                                .send(TransportEvent::Disconnected { attempt, retry_in })
                                .await
                                .is_err()
                            {
                                break;
                            }
                            tokio::time::sleep(retry_in).await;
                            continue;
                        }
                        None => {
                            let attempts = self.backoff.attempts();
                            tracing::error!(error = %err, attempts, "giving up on broker connection");
                            let _ = events.send(TransportEvent::GaveUp { attempts }).await;
                            break;
                        }
                    }
                }
            };

            let Some(event) = event else {
                continue;
            };
            if events.send(event).await.is_err() {
                tracing::debug!("engine stopped, closing mqtt driver");
                break;
            }
        }
    }

    /// Queue the outstanding subscriptions. Once all are queued the link is
    /// marked online and `Connected` is returned; a full request queue is
    /// retried after the next event loop step.
    fn finish_subscribing(&mut self) -> Option<TransportEvent> {
        if self.unsubscribed.is_empty() {
            return None;
        }
        self.unsubscribed
            .retain(|topic| match self.client.try_subscribe(topic.as_str(), QOS) {
                Ok(()) => {
                    tracing::debug!(%topic, "subscription requested");
                    false
                }
                Err(err) => {
                    tracing::debug!(%topic, error = %err, "request queue full, subscription deferred");
                    true
                }
            });
        if !self.unsubscribed.is_empty() {
            return None;
        }
        self.online.store(true, Ordering::Release);
        Some(TransportEvent::Connected)
    }
}
