//! State change records — one per shadow mutation.

use serde::Serialize;

use crate::attribute::{Attribute, ShadowValue};
use crate::time::Timestamp;

/// What caused a shadow mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// Applied from a desired-state delta.
    Desired,
    /// Observed on a sensor.
    Sensor,
    /// Driven by the access handshake (entry door open/close).
    Access,
}

/// An immutable record of an attribute changing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub attribute: Attribute,
    pub from: ShadowValue,
    pub to: ShadowValue,
    pub origin: ChangeOrigin,
    pub at: Timestamp,
}

impl StateChange {
    #[must_use]
    pub fn new(
        attribute: Attribute,
        from: ShadowValue,
        to: ShadowValue,
        origin: ChangeOrigin,
        at: Timestamp,
    ) -> Self {
        Self {
            attribute,
            from,
            to,
            origin,
            at,
        }
    }

    /// Actuator family taken from the key prefix (`luz_sala` → `luz`).
    #[must_use]
    pub fn actuator_type(&self) -> &'static str {
        let key = self.attribute.key();
        key.split_once('_').map_or(key, |(kind, _)| kind)
    }

    /// Location taken from the key suffix (`luz_sala` → `sala`).
    #[must_use]
    pub fn location(&self) -> &'static str {
        self.attribute
            .key()
            .split_once('_')
            .map_or("general", |(_, loc)| loc)
    }
}
