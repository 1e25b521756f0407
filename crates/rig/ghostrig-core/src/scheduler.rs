use serde::{Deserialize, Serialize};

use crate::character::{machine_mut, Character, FrameInput};
use crate::clip_events::filter_clip_events;
use crate::intent::IntentSource;
use crate::outputs::{RigEvent, RigFrame};

/// Per-frame phases. Parameters must be on the control rig before it
/// advances, and the mirror must see the control rig's post-advance state
/// before the visual rig advances.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Locomotion,
    ControlAdvance,
    Attack,
    Mirror,
    VisualAdvance,
    Expression,
}

pub const PHASE_ORDER: [Phase; 6] = [
    Phase::Locomotion,
    Phase::ControlAdvance,
    Phase::Attack,
    Phase::Mirror,
    Phase::VisualAdvance,
    Phase::Expression,
];

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Locomotion => "locomotion",
            Phase::ControlAdvance => "control_advance",
            Phase::Attack => "attack",
            Phase::Mirror => "mirror",
            Phase::VisualAdvance => "visual_advance",
            Phase::Expression => "expression",
        }
    }
}

/// Run one frame: every phase in `PHASE_ORDER`, then the snapshot.
pub fn run_frame(
    character: &mut Character,
    dt: f32,
    intent: &mut dyn IntentSource,
    input: &FrameInput,
) -> RigFrame {
    let mut events: Vec<RigEvent> = std::mem::take(&mut character.pending_events);
    for phase in PHASE_ORDER {
        run_phase(character, phase, dt, intent, input, &mut events);
    }

    RigFrame {
        epoch: character.epoch,
        dt,
        events,
        snapshot: character.snapshot(),
    }
}

pub fn run_phase(
    ch: &mut Character,
    phase: Phase,
    dt: f32,
    intent: &mut dyn IntentSource,
    input: &FrameInput,
    events: &mut Vec<RigEvent>,
) {
    match phase {
        Phase::Locomotion => {
            let multiplier = ch.attack.move_speed_multiplier();
            if let Some(control) = ch.control.as_deref_mut() {
                ch.locomotion
                    .tick(dt, &*intent, input.ground, multiplier, control);
            }
        }
        Phase::ControlAdvance => {
            if let Some(control) = ch.control.as_deref_mut() {
                control.advance(dt);
            }
        }
        Phase::Attack => {
            let fallback = ch
                .legacy_input
                .poll(input.attack_key_down, input.attack_click_down);
            ch.attack.tick(
                dt,
                intent,
                fallback,
                machine_mut(&mut ch.visual),
                machine_mut(&mut ch.control),
                events,
            );
        }
        Phase::Mirror => {
            if let (Some(source), Some(target)) =
                (ch.control.as_deref(), ch.visual.as_deref_mut())
            {
                ch.mirror.tick(source, target, events);
            }
        }
        Phase::VisualAdvance => {
            if let Some(visual) = ch.visual.as_deref_mut() {
                visual.advance(dt);
            }
            filter_clip_events(&input.clip_events, events);
        }
        Phase::Expression => {
            if let Some(face) = ch.face.as_mut() {
                if let Some(key) = input.expression {
                    face.expression.select(key, events);
                }
                if input.blink {
                    face.blink.trigger();
                }
                face.expression.tick(dt, &mut *face.sink);
                face.blink.tick(dt, &mut *face.sink, events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_rig_advances_before_mirror_and_visual_after() {
        let pos = |p: Phase| PHASE_ORDER.iter().position(|q| *q == p).unwrap();
        assert!(pos(Phase::Locomotion) < pos(Phase::ControlAdvance));
        assert!(pos(Phase::ControlAdvance) < pos(Phase::Mirror));
        assert!(pos(Phase::Attack) < pos(Phase::Mirror));
        assert!(pos(Phase::Mirror) < pos(Phase::VisualAdvance));
        assert_eq!(PHASE_ORDER.last(), Some(&Phase::Expression));
    }
}
