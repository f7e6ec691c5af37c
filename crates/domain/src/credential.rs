//! Contactless card identifiers.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// UID read from a contactless card, kept as an uppercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardUid(String);

impl CardUid {
    /// Single, double and triple size UIDs.
    pub const VALID_LENGTHS: [usize; 3] = [4, 7, 10];

    /// Encode raw UID bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CardUidLength`] for anything but a 4, 7 or
    /// 10 byte UID.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if !Self::VALID_LENGTHS.contains(&bytes.len()) {
            return Err(ValidationError::CardUidLength(bytes.len()));
        }
        Ok(Self(hex::encode_upper(bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CardUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
