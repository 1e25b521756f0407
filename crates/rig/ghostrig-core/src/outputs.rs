//! Per-frame outputs: events and the frame record returned by `Character::step`.

use serde::{Deserialize, Serialize};

use crate::diagnostics::RigSnapshot;
use crate::expression::ExpressionKey;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RigEvent {
    AttackStarted {
        duration: f32,
    },
    AttackFinished,
    /// Attack intent observed while an attack was already running.
    AttackIgnored,
    /// The mirror forwarded a one-shot trigger to the visual rig.
    TriggerForwarded {
        trigger: String,
    },
    ExpressionChanged {
        expression: ExpressionKey,
    },
    BlinkStarted,
    BlinkFinished,
    Footstep {
        clip_weight: f32,
    },
    Land {
        clip_weight: f32,
    },
    /// A component lost a required reference and stopped for good.
    ComponentDisabled {
        component: String,
        reason: String,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RigFrame {
    pub epoch: u64,
    pub dt: f32,
    /// Events in phase order.
    pub events: Vec<RigEvent>,
    /// `None` when diagnostics are disabled.
    pub snapshot: Option<RigSnapshot>,
}

impl RigFrame {
    pub fn has_event(&self, pred: impl Fn(&RigEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}
