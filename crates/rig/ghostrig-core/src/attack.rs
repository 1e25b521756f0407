//! Bounded-duration attack action layered over locomotion.
//!
//! `Idle -> Attacking` on an attack intent edge while idle; `Attacking -> Idle`
//! once the duration has elapsed. There is no cancel path. The start tick does
//! not count toward the duration; later ticks decrement before intent is
//! evaluated, so an attack may end and a new one start on the same tick.

use serde::{Deserialize, Serialize};

use crate::intent::IntentSource;
use crate::machine::AnimationStateMachine;
use crate::outputs::RigEvent;
use crate::params::ATTACK;

/// Absorbs float drift when summing frame deltas against the duration.
const EPSILON: f32 = 1e-5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Seconds an attack blocks further attacks and slows movement.
    pub attack_duration: f32,
    /// Locomotion speed factor while attacking, in [0, 1].
    pub move_speed_multiplier: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            attack_duration: 0.8,
            move_speed_multiplier: 0.1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttackPhase {
    Idle,
    Attacking { remaining: f32 },
}

#[derive(Clone, Debug)]
pub struct AttackController {
    cfg: AttackConfig,
    phase: AttackPhase,
    control_present: bool,
    attacks_started: u64,
    log_ticks: bool,
}

impl AttackController {
    /// `control_present` is resolved once; without a control rig triggers are
    /// only applied to the local rig.
    pub fn new(cfg: AttackConfig, control_present: bool) -> Self {
        if !control_present {
            log::warn!("[attack] no control rig state machine; attack triggers apply locally only");
        }
        Self {
            cfg,
            phase: AttackPhase::Idle,
            control_present,
            attacks_started: 0,
            log_ticks: false,
        }
    }

    pub fn with_tick_logging(mut self, on: bool) -> Self {
        self.log_ticks = on;
        self
    }

    pub fn config(&self) -> &AttackConfig {
        &self.cfg
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.phase, AttackPhase::Attacking { .. })
    }

    /// Seconds left in the current attack, 0 when idle.
    pub fn remaining(&self) -> f32 {
        match self.phase {
            AttackPhase::Attacking { remaining } => remaining.max(0.0),
            AttackPhase::Idle => 0.0,
        }
    }

    pub fn move_speed_multiplier(&self) -> f32 {
        if self.is_attacking() {
            self.cfg.move_speed_multiplier
        } else {
            1.0
        }
    }

    pub fn controls_remote_rig(&self) -> bool {
        self.control_present
    }

    pub fn attacks_started(&self) -> u64 {
        self.attacks_started
    }

    /// One tick: count down, then consume intent.
    ///
    /// `fallback_pressed` is the local key/click edge for this tick. It and the
    /// structured intent flag coalesce into a single request. The structured
    /// flag is cleared whenever it is seen set.
    pub fn tick(
        &mut self,
        dt: f32,
        intent: &mut dyn IntentSource,
        fallback_pressed: bool,
        local: Option<&mut dyn AnimationStateMachine>,
        control: Option<&mut dyn AnimationStateMachine>,
        events: &mut Vec<RigEvent>,
    ) {
        if let AttackPhase::Attacking { remaining } = &mut self.phase {
            *remaining -= dt.max(0.0);
            if self.log_ticks {
                log::debug!("[attack] remaining {:.3}", *remaining);
            }
            if *remaining <= EPSILON {
                self.phase = AttackPhase::Idle;
                events.push(RigEvent::AttackFinished);
                log::debug!("[attack] finished");
            }
        }

        let structured = intent.attack_requested();
        if structured {
            intent.clear_attack();
        }
        if !(structured || fallback_pressed) {
            return;
        }

        if self.is_attacking() {
            events.push(RigEvent::AttackIgnored);
            return;
        }

        self.phase = AttackPhase::Attacking {
            remaining: self.cfg.attack_duration,
        };
        self.attacks_started += 1;
        events.push(RigEvent::AttackStarted {
            duration: self.cfg.attack_duration,
        });
        log::info!(
            "[attack] started ({}s, speed x{})",
            self.cfg.attack_duration,
            self.cfg.move_speed_multiplier
        );

        fire(local, "local");
        if self.control_present {
            fire(control, "control");
        }
    }
}

fn fire(machine: Option<&mut dyn AnimationStateMachine>, role: &str) {
    if let Some(m) = machine {
        if let Err(e) = m.set_trigger(ATTACK) {
            log::warn!("[attack] {role} rig did not take {ATTACK}: {e}");
        }
    }
}
