//! Shadow — the locally held record of every attribute's current value.
//!
//! The shadow always holds the last commanded or observed value. There is
//! no pending/desired cache: a value is written here the moment it is
//! applied. The store itself performs no domain validation.

use crate::attribute::{Attribute, ShadowValue};
use crate::document::ReportedDocument;

/// In-memory shadow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadow {
    values: [ShadowValue; Attribute::ALL.len()],
    /// The window stepper has no absolute position feedback; this tracks
    /// whether it has been driven open.
    window_open: bool,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            values: Attribute::ALL.map(Attribute::initial_value),
            window_open: false,
        }
    }
}

impl Shadow {
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> ShadowValue {
        self.values[attribute.index()]
    }

    /// Overwrite the value of `attribute`, returning the previous value.
    pub fn set(&mut self, attribute: Attribute, value: ShadowValue) -> ShadowValue {
        std::mem::replace(&mut self.values[attribute.index()], value)
    }

    /// Whether the window mechanism has been driven open.
    #[must_use]
    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    pub fn set_window_open(&mut self, open: bool) {
        self.window_open = open;
    }

    /// Build the full reported-state document from the current values.
    #[must_use]
    pub fn to_reported(&self) -> ReportedDocument {
        ReportedDocument::from_shadow(self)
    }
}
