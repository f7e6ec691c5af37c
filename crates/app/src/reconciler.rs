//! Delta reconciler — applies a desired-state delta against the shadow.
//!
//! Only attributes whose requested value differs from the shadow reach an
//! actuator. The shadow is updated optimistically: an actuator failure is
//! logged, never propagated.

use shadowhome_domain::attribute::{Attribute, AttributeKind, ShadowValue};
use shadowhome_domain::document::Delta;
use shadowhome_domain::event::{ChangeOrigin, StateChange};
use shadowhome_domain::shadow::Shadow;
use shadowhome_domain::time::now;

use crate::ports::Actuators;

/// Applies deltas to the shadow, driving actuators for real differences.
#[derive(Debug, Clone)]
pub struct Reconciler {
    window_steps: i32,
}

impl Reconciler {
    /// `window_steps` is the relative displacement between closed and open.
    #[must_use]
    pub fn new(window_steps: u16) -> Self {
        Self {
            window_steps: i32::from(window_steps),
        }
    }

    /// Apply `delta`, returning one [`StateChange`] per attribute that
    /// actually changed. An empty result means nothing needs publishing.
    pub fn apply<A: Actuators>(
        &self,
        shadow: &mut Shadow,
        actuators: &mut A,
        delta: &Delta,
    ) -> Vec<StateChange> {
        for (attribute, err) in delta.rejected() {
            tracing::warn!(%attribute, error = %err, "ignoring delta field");
        }

        let mut changes = Vec::new();
        for &(attribute, requested) in delta.changes() {
            let current = shadow.get(attribute);
            if current == requested {
                tracing::trace!(%attribute, value = %requested, "already in requested state");
                continue;
            }

            self.drive(shadow, actuators, attribute, requested);
            shadow.set(attribute, requested);
            tracing::info!(%attribute, from = %current, to = %requested, "attribute reconciled");
            changes.push(StateChange::new(
                attribute,
                current,
                requested,
                ChangeOrigin::Desired,
                now(),
            ));
        }
        changes
    }

    fn drive<A: Actuators>(
        &self,
        shadow: &mut Shadow,
        actuators: &mut A,
        attribute: Attribute,
        requested: ShadowValue,
    ) {
        let result = match attribute.kind() {
            AttributeKind::Light | AttributeKind::Door => {
                actuators.set_position(attribute, requested.position())
            }
            AttributeKind::Window => {
                let open = requested == ShadowValue::Open;
                if shadow.is_window_open() == open {
                    tracing::debug!(%attribute, open, "window already in position, not stepping");
                    return;
                }
                let steps = if open {
                    self.window_steps
                } else {
                    -self.window_steps
                };
                shadow.set_window_open(open);
                actuators.step(attribute, steps)
            }
            AttributeKind::Motion => return,
        };

        if let Err(err) = result {
            tracing::warn!(
                %attribute,
                error = %err,
                "actuator did not confirm, shadow updated regardless"
            );
        }
    }
}
