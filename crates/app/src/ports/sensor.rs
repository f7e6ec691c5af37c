//! Sensor ports — the motion input and the contactless card reader.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-bit edge latch shared between an interrupt source and the poll loop.
///
/// The interrupt side only ever calls [`raise`](Self::raise); the poll loop
/// only ever calls [`take_and_clear`](Self::take_and_clear). Clones share
/// the same bit.
#[derive(Debug, Clone, Default)]
pub struct MotionSignal(Arc<AtomicBool>);

impl MotionSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch an edge. Safe to call from an interrupt context.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return whether an edge was latched since the last call, clearing it.
    #[must_use]
    pub fn take_and_clear(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Edge-triggered binary motion sensor.
pub trait MotionSensor: Send + Sync {
    /// Edge latch raised on every level change.
    fn signal(&self) -> &MotionSignal;

    /// Current level of the input (`true` = motion detected).
    fn is_high(&self) -> bool;
}

/// Polling-style contactless card reader.
pub trait CredentialReader: Send {
    /// Whether a card that has not been read yet is in the field.
    fn is_new_card_present(&mut self) -> bool;

    /// Read the UID of the card currently in the field.
    fn read_uid(&mut self) -> Option<Vec<u8>>;

    /// Put the current card to sleep so it is not reported again.
    fn halt(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_cleared() {
        let signal = MotionSignal::new();
        assert!(!signal.take_and_clear());
    }

    #[test]
    fn should_clear_after_take() {
        let signal = MotionSignal::new();
        signal.raise();
        assert!(signal.take_and_clear());
        assert!(!signal.take_and_clear());
    }

    #[test]
    fn should_coalesce_repeated_raises() {
        let signal = MotionSignal::new();
        signal.raise();
        signal.raise();
        assert!(signal.take_and_clear());
        assert!(!signal.take_and_clear());
    }

    #[test]
    fn should_share_bit_between_clones() {
        let isr_side = MotionSignal::new();
        let poll_side = isr_side.clone();
        isr_side.raise();
        assert!(poll_side.take_and_clear());
    }
}
