//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the synchronization engine and the
//! outside world (broker, actuators, sensors). They are defined here (in
//! `app`) so that both the engine and the adapter layer can depend on them
//! without creating circular dependencies.

pub mod actuator;
pub mod event_bus;
pub mod sensor;
pub mod transport;

pub use actuator::Actuators;
pub use event_bus::EventPublisher;
pub use sensor::{CredentialReader, MotionSensor, MotionSignal};
pub use transport::{Transport, TransportEvent};
