//! Virtual actuator bank — lights, doors and the window stepper.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use shadowhome_app::ports::Actuators;
use shadowhome_domain::attribute::{Attribute, AttributeKind, Position};
use shadowhome_domain::error::ActuatorError;

use crate::lock;

/// One call received by the bank, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetPosition(Attribute, Position),
    Step(Attribute, i32),
}

#[derive(Debug, Default)]
struct Bank {
    positions: HashMap<Attribute, Position>,
    window_offset: i32,
    failing: HashSet<Attribute>,
    log: Vec<Command>,
}

/// Simulated actuators for every controllable attribute.
#[derive(Debug, Clone, Default)]
pub struct VirtualActuators {
    bank: Arc<Mutex<Bank>>,
}

impl VirtualActuators {
    /// Last position a two-position mechanism actually reached.
    #[must_use]
    pub fn position(&self, attribute: Attribute) -> Option<Position> {
        lock(&self.bank).positions.get(&attribute).copied()
    }

    /// Net steps the window has moved since start (positive is open).
    #[must_use]
    pub fn window_offset(&self) -> i32 {
        lock(&self.bank).window_offset
    }

    /// Every command received, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<Command> {
        lock(&self.bank).log.clone()
    }

    /// Make `attribute` stop responding until [`recover`](Self::recover).
    pub fn fail(&self, attribute: Attribute) {
        lock(&self.bank).failing.insert(attribute);
    }

    pub fn recover(&self, attribute: Attribute) {
        lock(&self.bank).failing.remove(&attribute);
    }
}

impl Actuators for VirtualActuators {
    fn set_position(
        &mut self,
        attribute: Attribute,
        position: Position,
    ) -> Result<(), ActuatorError> {
        let mut bank = lock(&self.bank);
        bank.log.push(Command::SetPosition(attribute, position));
        if !matches!(attribute.kind(), AttributeKind::Light | AttributeKind::Door) {
            return Err(ActuatorError::Unsupported(attribute));
        }
        if bank.failing.contains(&attribute) {
            return Err(ActuatorError::Unresponsive(attribute));
        }
        bank.positions.insert(attribute, position);
        tracing::debug!(%attribute, ?position, "virtual actuator moved");
        Ok(())
    }

    fn step(&mut self, attribute: Attribute, steps: i32) -> Result<(), ActuatorError> {
        let mut bank = lock(&self.bank);
        bank.log.push(Command::Step(attribute, steps));
        if attribute.kind() != AttributeKind::Window {
            return Err(ActuatorError::Unsupported(attribute));
        }
        if bank.failing.contains(&attribute) {
            return Err(ActuatorError::Unresponsive(attribute));
        }
        bank.window_offset += steps;
        tracing::debug!(%attribute, steps, offset = bank.window_offset, "virtual stepper moved");
        Ok(())
    }
}
