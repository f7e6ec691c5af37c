//! # shadowhomed — shadowhome daemon
//!
//! Composition root that wires the shadow engine to the broker and the
//! hardware, then runs it until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Create the MQTT transport and spawn its connection driver
//! - Construct the hardware adapters and the in-process event bus
//! - Record every applied state change to the log
//! - Run the engine and handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

use shadowhome_adapter_virtual::{VirtualActuators, VirtualCardReader, VirtualMotionSensor};
use shadowhome_app::engine::ShadowEngine;
use shadowhome_app::event_bus::InProcessEventBus;
use shadowhome_domain::event::StateChange;
use shadowhome_domain::time::to_rfc3339;
use shadowhome_domain::topics::Topics;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Broker
    let topics = Topics::for_thing(&config.mqtt.thing_name);
    let (transport, connection) =
        shadowhome_adapter_mqtt::connect(&config.mqtt, config.reconnect.clone())?;
    let (inbound_tx, inbound_rx) = mpsc::channel(config.mqtt.request_capacity);
    let driver = tokio::spawn(connection.run(inbound_tx));

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));
    let recorder = tokio::spawn(record_changes(event_bus.subscribe()));

    // Hardware
    tracing::warn!("no board drivers configured, running on virtual hardware");
    let actuators = VirtualActuators::default();
    let motion = VirtualMotionSensor::default();
    let reader = VirtualCardReader::default();

    tracing::info!(
        thing = %config.mqtt.thing_name,
        change_listeners = event_bus.subscriber_count(),
        "shadowhomed starting"
    );
    let engine = ShadowEngine::new(
        config.engine.clone(),
        topics,
        transport,
        actuators,
        Arc::clone(&event_bus),
    );
    let engine = engine
        .run(inbound_rx, motion, reader, shutdown_signal())
        .await;

    tracing::info!(status = ?engine.status(), "shadowhomed stopped");
    driver.abort();
    recorder.abort();
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("interrupt received, shutting down"),
        Err(err) => tracing::error!(error = %err, "cannot listen for interrupt, shutting down"),
    }
}

/// Log each applied change with its actuator type and location.
async fn record_changes(mut changes: broadcast::Receiver<StateChange>) {
    loop {
        match changes.recv().await {
            Ok(change) => tracing::info!(
                actuator_type = change.actuator_type(),
                location = change.location(),
                from = %change.from,
                to = %change.to,
                origin = ?change.origin,
                at = %to_rfc3339(&change.at),
                "state change recorded"
            ),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "change recorder lagging, changes dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
