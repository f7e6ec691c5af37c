//! Virtual motion sensor and card reader.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use shadowhome_app::ports::{CredentialReader, MotionSensor, MotionSignal};

use crate::lock;

/// Motion input whose level is driven from the outside.
#[derive(Debug, Clone, Default)]
pub struct VirtualMotionSensor {
    signal: MotionSignal,
    level: Arc<AtomicBool>,
}

impl VirtualMotionSensor {
    /// Set the input level. A change of level latches an edge, like a
    /// `CHANGE` interrupt would.
    pub fn set_level(&self, high: bool) {
        if self.level.swap(high, Ordering::AcqRel) != high {
            self.signal.raise();
        }
    }

    /// Latch an edge without changing the level (a glitch on the line).
    pub fn glitch(&self) {
        self.signal.raise();
    }
}

impl MotionSensor for VirtualMotionSensor {
    fn signal(&self) -> &MotionSignal {
        &self.signal
    }

    fn is_high(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }
}

/// Card reader fed from a queue of UIDs.
#[derive(Debug, Clone, Default)]
pub struct VirtualCardReader {
    field: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl VirtualCardReader {
    /// Bring a card into the field.
    pub fn present(&self, uid: impl Into<Vec<u8>>) {
        lock(&self.field).push_back(uid.into());
    }
}

impl CredentialReader for VirtualCardReader {
    fn is_new_card_present(&mut self) -> bool {
        !lock(&self.field).is_empty()
    }

    fn read_uid(&mut self) -> Option<Vec<u8>> {
        lock(&self.field).front().cloned()
    }

    fn halt(&mut self) {
        lock(&self.field).pop_front();
    }
}
