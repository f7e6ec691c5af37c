//! End-to-end tests for the full shadowhomed stack.
//!
//! Each test runs the real engine loop on virtual hardware, with a loopback
//! transport standing in for the broker. Time is paused so dwell and poll
//! timers advance instantly.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use shadowhome_adapter_virtual::{
    Command, VirtualActuators, VirtualCardReader, VirtualMotionSensor,
};
use shadowhome_app::config::EngineConfig;
use shadowhome_app::engine::ShadowEngine;
use shadowhome_app::event_bus::InProcessEventBus;
use shadowhome_app::ports::{CredentialReader, Transport, TransportEvent};
use shadowhome_app::reconnect::LinkStatus;
use shadowhome_domain::attribute::{Attribute, Position};
use shadowhome_domain::error::ShadowError;
use shadowhome_domain::event::StateChange;
use shadowhome_domain::topics::Topics;

const UPDATE: &str = "$aws/things/MiCasa/shadow/update";
const DELTA: &str = "$aws/things/MiCasa/shadow/update/delta";
const REQUEST: &str = "MiCasa/rfid/checkRequest";
const RESPONSE: &str = "MiCasa/rfid/checkResponse";

/// Records publishes instead of sending them to a broker.
#[derive(Debug, Clone, Default)]
struct LoopbackTransport {
    sent: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl LoopbackTransport {
    fn sent_on(&self, topic: &str) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| serde_json::from_slice(payload).unwrap())
            .collect()
    }

    fn reported(&self) -> Vec<Value> {
        self.sent_on(UPDATE)
            .into_iter()
            .map(|doc| doc["state"]["reported"].clone())
            .collect()
    }
}

impl Transport for LoopbackTransport {
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ShadowError>> + Send {
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        async { Ok(()) }
    }
}

type Engine = ShadowEngine<LoopbackTransport, VirtualActuators, Arc<InProcessEventBus>>;

struct Harness {
    inbound: mpsc::Sender<TransportEvent>,
    stop: oneshot::Sender<()>,
    engine: JoinHandle<Engine>,
    changes: tokio::sync::broadcast::Receiver<StateChange>,
    transport: LoopbackTransport,
    actuators: VirtualActuators,
    motion: VirtualMotionSensor,
    reader: VirtualCardReader,
}

impl Harness {
    fn start() -> Self {
        let transport = LoopbackTransport::default();
        let actuators = VirtualActuators::default();
        let motion = VirtualMotionSensor::default();
        let reader = VirtualCardReader::default();
        let bus = Arc::new(InProcessEventBus::new(64));
        let changes = bus.subscribe();

        let engine = ShadowEngine::new(
            EngineConfig::default(),
            Topics::for_thing("MiCasa"),
            transport.clone(),
            actuators.clone(),
            bus,
        );
        let (inbound, inbound_rx) = mpsc::channel(16);
        let (stop, stopped) = oneshot::channel::<()>();
        let engine = tokio::spawn(engine.run(
            inbound_rx,
            motion.clone(),
            reader.clone(),
            async move {
                let _ = stopped.await;
            },
        ));

        Self {
            inbound,
            stop,
            engine,
            changes,
            transport,
            actuators,
            motion,
            reader,
        }
    }

    async fn deliver(&self, topic: &str, payload: &str) {
        self.inbound
            .send(TransportEvent::Message {
                topic: topic.to_string(),
                payload: payload.as_bytes().to_vec(),
            })
            .await
            .unwrap();
        settle().await;
    }

    async fn event(&self, event: TransportEvent) {
        self.inbound.send(event).await.unwrap();
        settle().await;
    }

    async fn shutdown(self) -> Engine {
        self.stop.send(()).unwrap();
        self.engine.await.unwrap()
    }
}

/// Let the engine run a few poll cycles.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

// ---------------------------------------------------------------------------
// Desired-state deltas
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_switch_light_on_and_report_once() {
    let harness = Harness::start();

    harness.deliver(DELTA, r#"{"state":{"luz_sala":"ON"}}"#).await;

    let reported = harness.transport.reported();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].as_object().unwrap().len(), 8);
    assert_eq!(reported[0]["luz_sala"], "ON");
    assert_eq!(reported[0]["luz_habitacion"], "OFF");
    assert_eq!(reported[0]["movimiento_sala"], "NOT_DETECTED");
    assert_eq!(
        harness.actuators.position(Attribute::LightLiving),
        Some(Position::Active)
    );
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_ignore_repeated_delta() {
    let harness = Harness::start();

    harness.deliver(DELTA, r#"{"state":{"luz_cocina":"ON"}}"#).await;
    harness.deliver(DELTA, r#"{"state":{"luz_cocina":"ON"}}"#).await;

    assert_eq!(harness.transport.reported().len(), 1);
    assert_eq!(harness.actuators.commands().len(), 1);
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_step_window_once_per_direction() {
    let harness = Harness::start();

    harness.deliver(DELTA, r#"{"state":{"ventana_sala":"OPEN"}}"#).await;
    harness.deliver(DELTA, r#"{"state":{"ventana_sala":"OPEN"}}"#).await;
    assert_eq!(harness.actuators.window_offset(), 512);

    harness.deliver(DELTA, r#"{"state":{"ventana_sala":"CLOSED"}}"#).await;
    assert_eq!(harness.actuators.window_offset(), 0);
    assert_eq!(
        harness.actuators.commands(),
        vec![
            Command::Step(Attribute::WindowLiving, 512),
            Command::Step(Attribute::WindowLiving, -512),
        ]
    );
    assert_eq!(harness.transport.reported().len(), 2);
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_report_optimistically_when_actuator_fails() {
    let harness = Harness::start();
    harness.actuators.fail(Attribute::DoorKitchen);

    harness
        .deliver(DELTA, r#"{"state":{"puerta_cocina":"OPEN"}}"#)
        .await;

    let reported = harness.transport.reported();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0]["puerta_cocina"], "OPEN");
    assert_eq!(harness.actuators.position(Attribute::DoorKitchen), None);
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_drop_malformed_delta() {
    let harness = Harness::start();

    harness.deliver(DELTA, "{not json").await;
    harness.deliver(DELTA, r#"{"desired":{"luz_sala":"ON"}}"#).await;

    assert!(harness.transport.reported().is_empty());
    assert!(harness.actuators.commands().is_empty());
    harness.shutdown().await;
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_request_check_and_cycle_door_on_valid_verdict() {
    let mut harness = Harness::start();
    harness.event(TransportEvent::Connected).await;

    harness.reader.present([0x04, 0xA1, 0xB2, 0xC3]);
    settle().await;
    assert_eq!(
        harness.transport.sent_on(REQUEST),
        vec![serde_json::json!({"card_uid": "04A1B2C3"})]
    );
    assert_eq!(harness.transport.reported().len(), 1);

    harness
        .deliver(RESPONSE, r#"{"status":"VALID","card_uid":"04A1B2C3"}"#)
        .await;
    let reported = harness.transport.reported();
    assert_eq!(reported.len(), 2);
    assert_eq!(reported[1]["puerta_principal"], "OPEN");

    tokio::time::sleep(Duration::from_secs(5)).await;
    let reported = harness.transport.reported();
    assert_eq!(reported.len(), 3);
    assert_eq!(reported[2]["puerta_principal"], "CLOSED");
    assert_eq!(
        harness.actuators.commands(),
        vec![
            Command::SetPosition(Attribute::DoorMain, Position::Active),
            Command::SetPosition(Attribute::DoorMain, Position::Inactive),
        ]
    );

    let opened = harness.changes.recv().await.unwrap();
    let closed = harness.changes.recv().await.unwrap();
    assert_eq!(opened.actuator_type(), "puerta");
    assert_eq!(opened.location(), "principal");
    assert_eq!(closed.attribute, Attribute::DoorMain);
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_not_replay_card_presented_while_degraded() {
    let mut harness = Harness::start();
    harness.event(TransportEvent::Connected).await;
    harness
        .event(TransportEvent::Disconnected {
            attempt: 1,
            retry_in: Duration::from_secs(5),
        })
        .await;

    harness.reader.present([0x04, 0xA1, 0xB2, 0xC3]);
    settle().await;
    harness.event(TransportEvent::Connected).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(harness.transport.sent_on(REQUEST).is_empty());
    assert!(!harness.reader.is_new_card_present());
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_keep_polling_sensors_while_door_is_open() {
    let harness = Harness::start();

    harness.deliver(RESPONSE, r#"{"status":"VALID"}"#).await;
    harness.motion.set_level(true);
    settle().await;

    let reported = harness.transport.reported();
    assert_eq!(reported.len(), 2);
    assert_eq!(reported[1]["puerta_principal"], "OPEN");
    assert_eq!(reported[1]["movimiento_sala"], "DETECTED");
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn should_leave_door_closed_on_denied_verdict() {
    let harness = Harness::start();

    harness.deliver(RESPONSE, r#"{"status":"DENIED"}"#).await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(harness.transport.sent_on(UPDATE).len(), 0);
    assert!(harness.actuators.commands().is_empty());
    harness.shutdown().await;
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_report_motion_once_per_level_change() {
    let harness = Harness::start();

    harness.motion.set_level(true);
    settle().await;
    harness.motion.glitch();
    settle().await;
    harness.motion.set_level(false);
    settle().await;

    let levels: Vec<_> = harness
        .transport
        .reported()
        .iter()
        .map(|doc| doc["movimiento_sala"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(levels, vec!["DETECTED", "NOT_DETECTED"]);
    harness.shutdown().await;
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_publish_baseline_after_each_connection() {
    let harness = Harness::start();

    harness.event(TransportEvent::Connected).await;
    harness.deliver(DELTA, r#"{"state":{"luz_sala":"ON"}}"#).await;
    harness
        .event(TransportEvent::Disconnected {
            attempt: 1,
            retry_in: Duration::from_secs(5),
        })
        .await;
    harness.event(TransportEvent::Connected).await;

    let reported = harness.transport.reported();
    assert_eq!(reported.len(), 3);
    assert_eq!(reported[0]["luz_sala"], "OFF");
    assert_eq!(reported[2]["luz_sala"], "ON");

    let engine = harness.shutdown().await;
    assert_eq!(engine.status(), LinkStatus::Online);
}

#[tokio::test(start_paused = true)]
async fn should_keep_running_offline_after_driver_gives_up() {
    let harness = Harness::start();

    harness.event(TransportEvent::GaveUp { attempts: 5 }).await;
    harness.deliver(DELTA, r#"{"state":{"luz_habitacion":"ON"}}"#).await;

    assert_eq!(
        harness.actuators.position(Attribute::LightBedroom),
        Some(Position::Active)
    );
    let engine = harness.shutdown().await;
    assert_eq!(engine.status(), LinkStatus::Offline);
}
