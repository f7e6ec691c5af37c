//! # shadowhome-adapter-virtual
//!
//! Simulated hardware for running the shadow engine without a board.
//!
//! ## Provided devices
//!
//! | Device | Port | Behaviour |
//! |--------|------|-----------|
//! | Virtual Actuators | `Actuators` | Remembers positions and the window's net step count; failures can be injected |
//! | Virtual Motion Sensor | `MotionSensor` | Level set from the outside, every change latches an edge |
//! | Virtual Card Reader | `CredentialReader` | Cards queued from the outside are read one at a time |
//!
//! Every device is a cheap handle: clones share state, so a test (or the
//! daemon's demo mode) keeps one clone while the engine owns another.
//!
//! ## Dependency rule
//!
//! Depends on `shadowhome-app` (port traits) and `shadowhome-domain` only.

mod actuators;
mod sensors;

pub use actuators::{Command, VirtualActuators};
pub use sensors::{VirtualCardReader, VirtualMotionSensor};

fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
