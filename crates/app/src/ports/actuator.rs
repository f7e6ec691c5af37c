//! Actuator port — drives lights, doors and the window.

use shadowhome_domain::attribute::{Attribute, Position};
use shadowhome_domain::error::ActuatorError;

/// Output hardware for every controllable attribute.
///
/// Two-position mechanisms (lights, doors) are set to a [`Position`]; the
/// window is a stepper without absolute feedback and is moved by a relative
/// number of steps (positive opens, negative closes).
pub trait Actuators: Send {
    /// Set a two-position mechanism.
    ///
    /// # Errors
    ///
    /// Returns an [`ActuatorError`] if the mechanism could not be driven.
    fn set_position(&mut self, attribute: Attribute, position: Position)
    -> Result<(), ActuatorError>;

    /// Move a stepping mechanism by `steps`.
    ///
    /// # Errors
    ///
    /// Returns an [`ActuatorError`] if the mechanism could not be driven.
    fn step(&mut self, attribute: Attribute, steps: i32) -> Result<(), ActuatorError>;
}
