//! Access control handshake for the entry door.
//!
//! Two independent flows:
//!
//! 1. **Request** — a card presented at the reader becomes a
//!    [`CardCheckRequest`]. Nothing is awaited; the request is forgotten once
//!    published.
//! 2. **Verdict** — a `VALID` verdict opens `door.main` and schedules the
//!    close step after the dwell. The run loop waits on
//!    [`close_deadline`](AccessControl::close_deadline) instead of blocking.
//!
//! Verdicts carry no correlation id: any verdict is treated as the answer
//! to the most recent request.

use std::time::Duration;

use tokio::time::Instant;

use shadowhome_domain::attribute::{Attribute, Position, ShadowValue};
use shadowhome_domain::credential::CardUid;
use shadowhome_domain::document::CardCheckRequest;
use shadowhome_domain::event::{ChangeOrigin, StateChange};
use shadowhome_domain::shadow::Shadow;
use shadowhome_domain::time::now;

use crate::ports::{Actuators, CredentialReader};

const ENTRY_DOOR: Attribute = Attribute::DoorMain;

/// Timers and scheduling state of the handshake.
#[derive(Debug, Clone)]
pub struct AccessControl {
    dwell: Duration,
    card_cooldown: Duration,
    close_at: Option<Instant>,
    reader_idle_until: Option<Instant>,
}

impl AccessControl {
    #[must_use]
    pub fn new(dwell: Duration, card_cooldown: Duration) -> Self {
        Self {
            dwell,
            card_cooldown,
            close_at: None,
            reader_idle_until: None,
        }
    }

    /// When the entry door is due to close, if it was opened by a verdict.
    #[must_use]
    pub fn close_deadline(&self) -> Option<Instant> {
        self.close_at
    }

    /// Poll the reader for a freshly presented card.
    ///
    /// The reader is left alone for the cooldown after every read so a card
    /// held in the field is not reported twice.
    pub fn poll_reader<R: CredentialReader + ?Sized>(
        &mut self,
        reader: &mut R,
        at: Instant,
    ) -> Option<CardCheckRequest> {
        if self.reader_idle_until.is_some_and(|until| at < until) {
            return None;
        }
        self.reader_idle_until = None;

        if !reader.is_new_card_present() {
            return None;
        }
        let bytes = reader.read_uid()?;
        reader.halt();
        self.reader_idle_until = Some(at + self.card_cooldown);

        match CardUid::from_bytes(&bytes) {
            Ok(card_uid) => {
                tracing::info!(%card_uid, "card presented");
                Some(CardCheckRequest { card_uid })
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable card");
                None
            }
        }
    }

    /// Open the entry door for a `VALID` verdict and (re)arm the close timer.
    ///
    /// Returns the `CLOSED → OPEN` change, or `None` when the door was
    /// already open (the dwell is extended without a new report).
    pub fn grant<A: Actuators + ?Sized>(
        &mut self,
        shadow: &mut Shadow,
        actuators: &mut A,
        at: Instant,
    ) -> Option<StateChange> {
        self.close_at = Some(at + self.dwell);

        let current = shadow.get(ENTRY_DOOR);
        if current == ShadowValue::Open {
            tracing::info!(dwell = ?self.dwell, "entry door already open, dwell extended");
            return None;
        }

        if let Err(err) = actuators.set_position(ENTRY_DOOR, Position::Active) {
            tracing::warn!(error = %err, "entry door did not confirm opening");
        }
        shadow.set(ENTRY_DOOR, ShadowValue::Open);
        tracing::info!(dwell = ?self.dwell, "access granted, entry door open");
        Some(StateChange::new(
            ENTRY_DOOR,
            current,
            ShadowValue::Open,
            ChangeOrigin::Access,
            now(),
        ))
    }

    /// Close the entry door once the dwell has elapsed.
    ///
    /// Returns `None` while no close is scheduled or the deadline is still
    /// in the future.
    pub fn close_if_due<A: Actuators + ?Sized>(
        &mut self,
        shadow: &mut Shadow,
        actuators: &mut A,
        at: Instant,
    ) -> Option<StateChange> {
        let deadline = self.close_at?;
        if at < deadline {
            return None;
        }
        self.close_at = None;

        if let Err(err) = actuators.set_position(ENTRY_DOOR, Position::Inactive) {
            tracing::warn!(error = %err, "entry door did not confirm closing");
        }
        let previous = shadow.set(ENTRY_DOOR, ShadowValue::Closed);
        tracing::info!("dwell elapsed, entry door closed");
        Some(StateChange::new(
            ENTRY_DOOR,
            previous,
            ShadowValue::Closed,
            ChangeOrigin::Access,
            now(),
        ))
    }
}
