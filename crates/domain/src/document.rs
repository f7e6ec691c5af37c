//! Wire documents exchanged with the cloud side.
//!
//! | Direction | Document | Shape |
//! |-----------|----------|-------|
//! | out | [`ReportedDocument`] | `{"state":{"reported":{…all eight keys…}}}` |
//! | in | [`Delta`] | `{"state":{"luz_sala":"ON", …}}` (partial) |
//! | out | [`CardCheckRequest`] | `{"card_uid":"04A1B2C3"}` |
//! | in | [`Verdict`] | `{"status":"VALID"}` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attribute::{Attribute, ShadowValue};
use crate::credential::CardUid;
use crate::error::{PayloadError, ValidationError};
use crate::shadow::Shadow;

/// Full reported-state document published after every shadow change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedDocument {
    pub state: ReportedState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedState {
    pub reported: Reported,
}

/// The eight reported fields. Always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reported {
    pub luz_sala: ShadowValue,
    pub luz_habitacion: ShadowValue,
    pub luz_cocina: ShadowValue,
    pub puerta_principal: ShadowValue,
    pub puerta_habitacion: ShadowValue,
    pub puerta_cocina: ShadowValue,
    pub ventana_sala: ShadowValue,
    pub movimiento_sala: ShadowValue,
}

impl ReportedDocument {
    #[must_use]
    pub fn from_shadow(shadow: &Shadow) -> Self {
        Self {
            state: ReportedState {
                reported: Reported {
                    luz_sala: shadow.get(Attribute::LightLiving),
                    luz_habitacion: shadow.get(Attribute::LightBedroom),
                    luz_cocina: shadow.get(Attribute::LightKitchen),
                    puerta_principal: shadow.get(Attribute::DoorMain),
                    puerta_habitacion: shadow.get(Attribute::DoorBedroom),
                    puerta_cocina: shadow.get(Attribute::DoorKitchen),
                    ventana_sala: shadow.get(Attribute::WindowLiving),
                    movimiento_sala: shadow.get(Attribute::MotionLiving),
                },
            },
        }
    }

    /// Serialize to the JSON payload handed to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// A partial desired-state document: only the attributes to change.
///
/// Fields that name a known attribute but cannot be applied (entry door,
/// motion, non-string or out-of-domain values) are collected in
/// [`rejected`](Self::rejected) and never reach [`changes`](Self::changes).
/// Unknown keys are ignored.
#[derive(Debug, Default)]
pub struct Delta {
    changes: Vec<(Attribute, ShadowValue)>,
    rejected: Vec<(Attribute, ValidationError)>,
}

impl Delta {
    /// Parse a delta from a raw payload.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] if the payload is not JSON or has no
    /// top-level `state` object. Callers drop such messages.
    pub fn from_slice(payload: &[u8]) -> Result<Self, PayloadError> {
        let doc: Value = serde_json::from_slice(payload)?;
        let state = doc
            .get("state")
            .and_then(Value::as_object)
            .ok_or(PayloadError::MissingField("state"))?;
        Ok(Self::from_state(state))
    }

    /// Interpret the content of a `state` container.
    #[must_use]
    pub fn from_state(state: &Map<String, Value>) -> Self {
        let mut delta = Self::default();
        for (key, value) in state {
            let Some(attribute) = Attribute::from_key(key) else {
                continue;
            };
            match parse_field(attribute, value) {
                Ok(requested) => delta.changes.push((attribute, requested)),
                Err(err) => delta.rejected.push((attribute, err)),
            }
        }
        delta.changes.sort_by_key(|(attr, _)| *attr);
        delta
    }

    /// Requested values, ordered by attribute.
    #[must_use]
    pub fn changes(&self) -> &[(Attribute, ShadowValue)] {
        &self.changes
    }

    #[must_use]
    pub fn rejected(&self) -> &[(Attribute, ValidationError)] {
        &self.rejected
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl FromIterator<(Attribute, ShadowValue)> for Delta {
    fn from_iter<I: IntoIterator<Item = (Attribute, ShadowValue)>>(iter: I) -> Self {
        let mut changes: Vec<_> = iter.into_iter().collect();
        changes.sort_by_key(|(attr, _)| *attr);
        Self {
            changes,
            rejected: Vec::new(),
        }
    }
}

fn parse_field(attribute: Attribute, value: &Value) -> Result<ShadowValue, ValidationError> {
    if !attribute.is_desired_settable() {
        return Err(ValidationError::NotSettable(attribute));
    }
    let raw = value.as_str().ok_or(ValidationError::NotAString)?;
    let requested: ShadowValue = raw.parse()?;
    if !attribute.accepts(requested) {
        return Err(ValidationError::OutOfDomain {
            attribute,
            value: requested,
        });
    }
    Ok(requested)
}

/// Credential check request published when a card is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardCheckRequest {
    pub card_uid: CardUid,
}

impl CardCheckRequest {
    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Asynchronous result of a credential check.
///
/// Carries no correlation id: it is assumed to answer the most recent
/// request. The validator may echo `card_uid` back; it is informational.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    pub status: String,
    #[serde(default)]
    pub card_uid: Option<String>,
}

impl Verdict {
    pub const VALID: &'static str = "VALID";

    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] if the payload is not JSON or has no
    /// string `status` field.
    pub fn from_slice(payload: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Only the exact literal `VALID` grants access.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == Self::VALID
    }
}
