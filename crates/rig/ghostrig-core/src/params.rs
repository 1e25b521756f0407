//! Parameter vocabulary shared by the control and visual rigs.

use serde::{Deserialize, Serialize};

use crate::error::RigResult;
use crate::machine::AnimationStateMachine;

pub const SPEED: &str = "Speed";
pub const MOTION_SPEED: &str = "MotionSpeed";
pub const GROUNDED: &str = "Grounded";
pub const JUMP: &str = "Jump";
pub const FREE_FALL: &str = "FreeFall";

/// One-shot trigger that starts the attack action.
pub const ATTACK: &str = "Attack";
/// State both rigs occupy while the attack clip plays.
pub const ATTACK_STATE: &str = "Attack";

pub const FLOAT_PARAMS: [&str; 2] = [SPEED, MOTION_SPEED];
pub const BOOL_PARAMS: [&str; 3] = [GROUNDED, JUMP, FREE_FALL];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Float,
    Bool,
    Trigger,
}

/// Snapshot of the continuous locomotion parameters mirrored every tick.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct LocomotionParams {
    pub speed: f32,
    pub motion_speed: f32,
    pub grounded: bool,
    pub jump: bool,
    pub free_fall: bool,
}

impl LocomotionParams {
    /// Read all five values. Fails on the first parameter that cannot be read.
    pub fn read(machine: &dyn AnimationStateMachine) -> RigResult<Self> {
        Ok(Self {
            speed: machine.get_float(SPEED)?,
            motion_speed: machine.get_float(MOTION_SPEED)?,
            grounded: machine.get_bool(GROUNDED)?,
            jump: machine.get_bool(JUMP)?,
            free_fall: machine.get_bool(FREE_FALL)?,
        })
    }

    /// Write all five values. Every write is attempted; the first failure is
    /// returned after the rest have been applied.
    pub fn write(&self, machine: &mut dyn AnimationStateMachine) -> RigResult<()> {
        let results = [
            machine.set_float(SPEED, self.speed),
            machine.set_float(MOTION_SPEED, self.motion_speed),
            machine.set_bool(GROUNDED, self.grounded),
            machine.set_bool(JUMP, self.jump),
            machine.set_bool(FREE_FALL, self.free_fall),
        ];
        results.into_iter().collect::<RigResult<Vec<()>>>().map(|_| ())
    }
}
