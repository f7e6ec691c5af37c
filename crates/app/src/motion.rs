//! Motion debouncing — turns latched edges into shadow transitions.

use shadowhome_domain::attribute::{Attribute, ShadowValue};
use shadowhome_domain::event::{ChangeOrigin, StateChange};
use shadowhome_domain::shadow::Shadow;
use shadowhome_domain::time::now;

use crate::ports::MotionSensor;

/// Consume a latched edge, if any, and update `motion.living`.
///
/// Returns `None` when no edge was latched or when the sensor level maps to
/// the value already held by the shadow (re-triggered edge at the same level).
pub fn debounce_motion<M: MotionSensor + ?Sized>(
    shadow: &mut Shadow,
    sensor: &M,
) -> Option<StateChange> {
    if !sensor.signal().take_and_clear() {
        return None;
    }

    let observed = if sensor.is_high() {
        ShadowValue::Detected
    } else {
        ShadowValue::NotDetected
    };
    let current = shadow.get(Attribute::MotionLiving);
    if observed == current {
        tracing::trace!(value = %observed, "motion edge without level change");
        return None;
    }

    shadow.set(Attribute::MotionLiving, observed);
    tracing::info!(from = %current, to = %observed, "motion.living changed");
    Some(StateChange::new(
        Attribute::MotionLiving,
        current,
        observed,
        ChangeOrigin::Sensor,
        now(),
    ))
}
