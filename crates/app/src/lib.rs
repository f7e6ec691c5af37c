//! # shadowhome-app
//!
//! Application layer — the synchronization engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Transport` — publish a payload on a topic
//!   - `Actuators` — two-position mechanisms and the relative-step window
//!   - `MotionSensor` / `CredentialReader` — inputs polled by the engine
//!   - `EventPublisher` — forward applied state changes
//! - Own the **shadow engine**: reconcile deltas, debounce motion, run the
//!   access handshake and report every change through the publisher
//! - Track the **link status** and reconnect backoff shared with the transport driver
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `shadowhome-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod access;
pub mod config;
pub mod engine;
pub mod event_bus;
pub mod motion;
pub mod ports;
pub mod publisher;
pub mod reconciler;
pub mod reconnect;
