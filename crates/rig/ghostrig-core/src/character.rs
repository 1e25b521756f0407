//! A character with a control rig and a visual rig, stepped once per frame.

use crate::attack::AttackController;
use crate::blink::AutoBlink;
use crate::clip_events::ClipEvent;
use crate::config::RigConfig;
use crate::diagnostics::RigSnapshot;
use crate::expression::{ExpressionController, ExpressionKey, ExpressionSink};
use crate::intent::{IntentSource, LegacyAttackInput};
use crate::locomotion::{GroundState, LocomotionDriver};
use crate::machine::AnimationStateMachine;
use crate::mirror::LocomotionMirror;
use crate::outputs::{RigEvent, RigFrame};
use crate::params::LocomotionParams;

/// Host-supplied facts for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub ground: GroundState,
    /// Attack key held this frame.
    pub attack_key_down: bool,
    /// Primary pointer button held this frame.
    pub attack_click_down: bool,
    /// Animation events raised by the visual rig's clips since the last frame.
    pub clip_events: Vec<ClipEvent>,
    /// Expression selected this frame, if any.
    pub expression: Option<ExpressionKey>,
    /// Request a manual blink.
    pub blink: bool,
}

pub(crate) struct Face {
    pub(crate) sink: Box<dyn ExpressionSink>,
    pub(crate) expression: ExpressionController,
    pub(crate) blink: AutoBlink,
}

pub struct Character {
    pub(crate) cfg: RigConfig,
    pub(crate) epoch: u64,
    pub(crate) control: Option<Box<dyn AnimationStateMachine>>,
    pub(crate) visual: Option<Box<dyn AnimationStateMachine>>,
    pub(crate) attack: AttackController,
    pub(crate) mirror: LocomotionMirror,
    pub(crate) locomotion: LocomotionDriver,
    pub(crate) legacy_input: LegacyAttackInput,
    pub(crate) face: Option<Face>,
    /// Events raised during wiring, reported with the first frame.
    pub(crate) pending_events: Vec<RigEvent>,
}

pub(crate) fn machine_ref(
    slot: &Option<Box<dyn AnimationStateMachine>>,
) -> Option<&dyn AnimationStateMachine> {
    match slot {
        Some(m) => Some(&**m),
        None => None,
    }
}

pub(crate) fn machine_mut(
    slot: &mut Option<Box<dyn AnimationStateMachine>>,
) -> Option<&mut dyn AnimationStateMachine> {
    match slot {
        Some(m) => Some(&mut **m),
        None => None,
    }
}

impl Character {
    /// Wire a character. Either rig may be absent; the components that need it
    /// degrade permanently instead of failing.
    pub fn new(
        cfg: RigConfig,
        control: Option<Box<dyn AnimationStateMachine>>,
        visual: Option<Box<dyn AnimationStateMachine>>,
    ) -> Self {
        let mut pending_events = Vec::new();

        let mirror = LocomotionMirror::new(machine_ref(&control), machine_ref(&visual), &cfg.mirror)
            .with_value_logging(cfg.diagnostics.log_mirror);
        if !mirror.is_enabled() {
            pending_events.push(RigEvent::ComponentDisabled {
                component: "mirror".into(),
                reason: if control.is_none() {
                    "control rig state machine not found".into()
                } else {
                    "visual rig state machine not found".into()
                },
            });
        }

        let attack = AttackController::new(cfg.attack.clone(), control.is_some())
            .with_tick_logging(cfg.diagnostics.log_attack);
        let locomotion = LocomotionDriver::new(cfg.locomotion.clone());

        Self {
            cfg,
            epoch: 0,
            control,
            visual,
            attack,
            mirror,
            locomotion,
            legacy_input: LegacyAttackInput::default(),
            face: None,
            pending_events,
        }
    }

    /// Attach an expression sink with an entropy-seeded auto blink.
    pub fn with_face(self, sink: Box<dyn ExpressionSink>) -> Self {
        let cfg = self.cfg.blink.clone();
        self.attach_face(sink, |s| AutoBlink::new(cfg, s))
    }

    /// Attach an expression sink with a deterministic auto blink.
    pub fn with_seeded_face(self, sink: Box<dyn ExpressionSink>, seed: u64) -> Self {
        let cfg = self.cfg.blink.clone();
        self.attach_face(sink, |s| AutoBlink::seeded(cfg, s, seed))
    }

    fn attach_face(
        mut self,
        sink: Box<dyn ExpressionSink>,
        make_blink: impl FnOnce(&dyn ExpressionSink) -> AutoBlink,
    ) -> Self {
        let expression = ExpressionController::new(&self.cfg.expression, &*sink);
        let blink = make_blink(&*sink);
        if !blink.is_available() {
            self.pending_events.push(RigEvent::ComponentDisabled {
                component: "blink".into(),
                reason: "no Blink channel".into(),
            });
        }
        self.face = Some(Face {
            sink,
            expression,
            blink,
        });
        self
    }

    /// Advance one frame by `dt` seconds.
    pub fn step(&mut self, dt: f32, intent: &mut dyn IntentSource, input: &FrameInput) -> RigFrame {
        self.epoch = self.epoch.wrapping_add(1);
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        crate::scheduler::run_frame(self, dt, intent, input)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &RigConfig {
        &self.cfg
    }

    pub fn control(&self) -> Option<&dyn AnimationStateMachine> {
        machine_ref(&self.control)
    }

    pub fn visual(&self) -> Option<&dyn AnimationStateMachine> {
        machine_ref(&self.visual)
    }

    pub fn control_mut(&mut self) -> Option<&mut dyn AnimationStateMachine> {
        machine_mut(&mut self.control)
    }

    pub fn visual_mut(&mut self) -> Option<&mut dyn AnimationStateMachine> {
        machine_mut(&mut self.visual)
    }

    pub fn attack(&self) -> &AttackController {
        &self.attack
    }

    pub fn mirror(&self) -> &LocomotionMirror {
        &self.mirror
    }

    pub fn locomotion(&self) -> &LocomotionDriver {
        &self.locomotion
    }

    pub fn expression(&self) -> Option<&ExpressionController> {
        self.face.as_ref().map(|f| &f.expression)
    }

    pub fn blink(&self) -> Option<&AutoBlink> {
        self.face.as_ref().map(|f| &f.blink)
    }

    pub fn expression_sink(&self) -> Option<&dyn ExpressionSink> {
        match &self.face {
            Some(f) => Some(&*f.sink),
            None => None,
        }
    }

    /// Select an expression outside of a frame. `false` without a face or for
    /// an unsupported channel.
    pub fn set_expression(&mut self, key: ExpressionKey) -> bool {
        match self.face.as_mut() {
            Some(f) => f.expression.set_expression(key),
            None => false,
        }
    }

    pub fn trigger_blink(&mut self) -> bool {
        match self.face.as_mut() {
            Some(f) => f.blink.trigger(),
            None => false,
        }
    }

    /// `None` when diagnostics are disabled.
    pub fn snapshot(&self) -> Option<RigSnapshot> {
        if !self.cfg.diagnostics.enabled {
            return None;
        }
        let control = self.control();
        Some(RigSnapshot {
            control_state: control.and_then(|m| m.current_state_name().map(str::to_string)),
            visual_state: self
                .visual()
                .and_then(|m| m.current_state_name().map(str::to_string)),
            params: control.and_then(|m| LocomotionParams::read(m).ok()),
            attacking: self.attack.is_attacking(),
            attack_remaining: self.attack.remaining(),
            move_speed_multiplier: self.attack.move_speed_multiplier(),
            mirror_enabled: self.mirror.is_enabled(),
            expression: self.expression().map(|e| e.current()),
            expression_weight: self.expression().map_or(0.0, |e| e.current_weight()),
            blink_weight: self.blink().map_or(0.0, |b| b.weight()),
        })
    }
}
