//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ShadowError`]
//! at port boundaries.

use crate::attribute::{Attribute, ShadowValue};

/// Base error type shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ShadowError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("malformed payload")]
    Payload(#[from] PayloadError),

    #[error("actuator error")]
    Actuator(#[from] ActuatorError),

    /// The publish/subscribe transport failed (not connected, queue full, …).
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A value failed a domain check.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown attribute value {0:?}")]
    UnknownValue(String),

    #[error("{value} is not a valid value for {attribute}")]
    OutOfDomain {
        attribute: Attribute,
        value: ShadowValue,
    },

    #[error("{0} cannot be set from a desired-state delta")]
    NotSettable(Attribute),

    #[error("expected a string value")]
    NotAString,

    /// Card UIDs are 4, 7 or 10 bytes long.
    #[error("card uid must be 4, 7 or 10 bytes, got {0}")]
    CardUidLength(usize),
}

/// An inbound document could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("payload has no {0:?} object")]
    MissingField(&'static str),
}

/// An actuator reported that it could not reach the commanded state.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("{0} actuator is not responding")]
    Unresponsive(Attribute),

    #[error("{0} has no actuator of the requested type")]
    Unsupported(Attribute),
}
