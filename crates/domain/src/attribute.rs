//! Attributes — the fixed set of device channels mirrored in the shadow.
//!
//! Each attribute has a wire key (the field name used in shadow documents),
//! a kind that determines its value domain, and an initial value used when
//! the shadow is created at startup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the eight device channels handled by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    LightLiving,
    LightBedroom,
    LightKitchen,
    DoorMain,
    DoorBedroom,
    DoorKitchen,
    WindowLiving,
    MotionLiving,
}

/// The physical family an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Two-position output, `ON`/`OFF`.
    Light,
    /// Two-position mechanism, `OPEN`/`CLOSED`.
    Door,
    /// Relative stepping mechanism, `OPEN`/`CLOSED`, no position feedback.
    Window,
    /// Edge-triggered binary input, `DETECTED`/`NOT_DETECTED`.
    Motion,
}

impl Attribute {
    /// All attributes, in reported-document order.
    pub const ALL: [Self; 8] = [
        Self::LightLiving,
        Self::LightBedroom,
        Self::LightKitchen,
        Self::DoorMain,
        Self::DoorBedroom,
        Self::DoorKitchen,
        Self::WindowLiving,
        Self::MotionLiving,
    ];

    /// Field name used in shadow documents.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::LightLiving => "luz_sala",
            Self::LightBedroom => "luz_habitacion",
            Self::LightKitchen => "luz_cocina",
            Self::DoorMain => "puerta_principal",
            Self::DoorBedroom => "puerta_habitacion",
            Self::DoorKitchen => "puerta_cocina",
            Self::WindowLiving => "ventana_sala",
            Self::MotionLiving => "movimiento_sala",
        }
    }

    /// Dotted channel name used in logs (e.g. `light.living`).
    #[must_use]
    pub fn channel(self) -> &'static str {
        match self {
            Self::LightLiving => "light.living",
            Self::LightBedroom => "light.bedroom",
            Self::LightKitchen => "light.kitchen",
            Self::DoorMain => "door.main",
            Self::DoorBedroom => "door.bedroom",
            Self::DoorKitchen => "door.kitchen",
            Self::WindowLiving => "window.living",
            Self::MotionLiving => "motion.living",
        }
    }

    #[must_use]
    pub fn kind(self) -> AttributeKind {
        match self {
            Self::LightLiving | Self::LightBedroom | Self::LightKitchen => AttributeKind::Light,
            Self::DoorMain | Self::DoorBedroom | Self::DoorKitchen => AttributeKind::Door,
            Self::WindowLiving => AttributeKind::Window,
            Self::MotionLiving => AttributeKind::Motion,
        }
    }

    /// Value held by the shadow before anything is commanded or observed.
    #[must_use]
    pub fn initial_value(self) -> ShadowValue {
        match self.kind() {
            AttributeKind::Light => ShadowValue::Off,
            AttributeKind::Door | AttributeKind::Window => ShadowValue::Closed,
            AttributeKind::Motion => ShadowValue::NotDetected,
        }
    }

    /// Whether the cloud may drive this attribute through a desired-state delta.
    ///
    /// The entry door is driven by the access handshake and the motion
    /// channel is an input, so neither is accepted from a delta.
    #[must_use]
    pub fn is_desired_settable(self) -> bool {
        !matches!(self, Self::DoorMain | Self::MotionLiving)
    }

    /// Whether `value` belongs to this attribute's value domain.
    #[must_use]
    pub fn accepts(self, value: ShadowValue) -> bool {
        match self.kind() {
            AttributeKind::Light => matches!(value, ShadowValue::On | ShadowValue::Off),
            AttributeKind::Door | AttributeKind::Window => {
                matches!(value, ShadowValue::Open | ShadowValue::Closed)
            }
            AttributeKind::Motion => {
                matches!(value, ShadowValue::Detected | ShadowValue::NotDetected)
            }
        }
    }

    /// Look up an attribute by its document key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.key() == key)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Serialize for Attribute {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel())
    }
}

/// Value of a single attribute as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShadowValue {
    On,
    Off,
    Open,
    Closed,
    Detected,
    NotDetected,
}

impl ShadowValue {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Detected => "DETECTED",
            Self::NotDetected => "NOT_DETECTED",
        }
    }

    /// Actuator position this value commands.
    #[must_use]
    pub fn position(self) -> Position {
        match self {
            Self::On | Self::Open | Self::Detected => Position::Active,
            Self::Off | Self::Closed | Self::NotDetected => Position::Inactive,
        }
    }
}

impl fmt::Display for ShadowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            "DETECTED" => Ok(Self::Detected),
            "NOT_DETECTED" => Ok(Self::NotDetected),
            other => Err(ValidationError::UnknownValue(other.to_string())),
        }
    }
}

/// Two-position actuator target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Light lit, door or window driven open.
    Active,
    /// Light dark, door or window at rest.
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_every_attribute_to_a_unique_key() {
        let mut keys: Vec<_> = Attribute::ALL.iter().map(|a| a.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn should_resolve_attribute_from_key() {
        assert_eq!(Attribute::from_key("luz_sala"), Some(Attribute::LightLiving));
        assert_eq!(
            Attribute::from_key("ventana_sala"),
            Some(Attribute::WindowLiving)
        );
        assert_eq!(Attribute::from_key("garaje"), None);
    }

    #[test]
    fn should_start_lights_off_and_mechanisms_closed() {
        assert_eq!(Attribute::LightKitchen.initial_value(), ShadowValue::Off);
        assert_eq!(Attribute::DoorMain.initial_value(), ShadowValue::Closed);
        assert_eq!(Attribute::WindowLiving.initial_value(), ShadowValue::Closed);
        assert_eq!(
            Attribute::MotionLiving.initial_value(),
            ShadowValue::NotDetected
        );
    }

    #[test]
    fn should_reject_entry_door_and_motion_from_deltas() {
        assert!(!Attribute::DoorMain.is_desired_settable());
        assert!(!Attribute::MotionLiving.is_desired_settable());
        let settable = Attribute::ALL
            .iter()
            .filter(|a| a.is_desired_settable())
            .count();
        assert_eq!(settable, 6);
    }

    #[test]
    fn should_check_value_domain_per_kind() {
        assert!(Attribute::LightLiving.accepts(ShadowValue::On));
        assert!(!Attribute::LightLiving.accepts(ShadowValue::Open));
        assert!(Attribute::WindowLiving.accepts(ShadowValue::Closed));
        assert!(!Attribute::DoorKitchen.accepts(ShadowValue::Detected));
    }

    #[test]
    fn should_map_values_to_positions() {
        assert_eq!(ShadowValue::On.position(), Position::Active);
        assert_eq!(ShadowValue::Open.position(), Position::Active);
        assert_eq!(ShadowValue::Off.position(), Position::Inactive);
        assert_eq!(ShadowValue::Closed.position(), Position::Inactive);
    }

    #[test]
    fn should_serialize_values_in_screaming_snake_case() {
        let json = serde_json::to_string(&ShadowValue::NotDetected).unwrap();
        assert_eq!(json, "\"NOT_DETECTED\"");
        assert_eq!("OPEN".parse::<ShadowValue>().unwrap(), ShadowValue::Open);
    }

    #[test]
    fn should_reject_unknown_value_string() {
        let err = "ENCENDIDO".parse::<ShadowValue>().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownValue(v) if v == "ENCENDIDO"));
    }
}
