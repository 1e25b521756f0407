//! Mirrors the control rig's locomotion parameters onto the visual rig each
//! tick and forwards the attack state as a one-shot trigger edge.
//!
//! The visual rig is a pure follower: nothing here reads it for gameplay. The
//! only target read is `current_state_is_named`, used to avoid re-triggering a
//! target that already entered the attack state on its own.

use serde::{Deserialize, Serialize};

use crate::machine::AnimationStateMachine;
use crate::outputs::RigEvent;
use crate::params::{LocomotionParams, ATTACK, ATTACK_STATE};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Forward the source's attack state to the target as a trigger.
    pub forward_attack: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            forward_attack: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MirrorOutcome {
    Disabled,
    /// Source values could not be read; the target kept its previous values.
    Skipped,
    Synced {
        params: LocomotionParams,
        forwarded_attack: bool,
    },
}

#[derive(Clone, Debug)]
pub struct LocomotionMirror {
    enabled: bool,
    has_attack_param: bool,
    forward_attack: bool,
    /// Set once a trigger went out (or was unnecessary) for the current source
    /// residency in the attack state.
    latched: bool,
    forwarded: u64,
    read_failure_reported: bool,
    write_failure_reported: bool,
    log_values: bool,
}

impl LocomotionMirror {
    /// Resolve both rigs once. A missing rig disables the mirror for good.
    pub fn new(
        source: Option<&dyn AnimationStateMachine>,
        target: Option<&dyn AnimationStateMachine>,
        cfg: &MirrorConfig,
    ) -> Self {
        let mut mirror = Self {
            enabled: true,
            has_attack_param: false,
            forward_attack: cfg.forward_attack,
            latched: false,
            forwarded: 0,
            read_failure_reported: false,
            write_failure_reported: false,
            log_values: false,
        };
        match (source, target) {
            (Some(src), Some(_)) => {
                mirror.has_attack_param = src.has_parameter(ATTACK);
                log::info!(
                    "[mirror] linked (attack forwarding: {})",
                    mirror.has_attack_param && mirror.forward_attack
                );
            }
            (None, _) => mirror.disable("control rig state machine not found"),
            (_, None) => mirror.disable("visual rig state machine not found"),
        }
        mirror
    }

    pub fn with_value_logging(mut self, on: bool) -> Self {
        self.log_values = on;
        self
    }

    fn disable(&mut self, reason: &str) {
        log::error!("[mirror] disabled: {reason}");
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_attack_param(&self) -> bool {
        self.has_attack_param
    }

    /// Triggers forwarded since construction.
    pub fn forwarded_triggers(&self) -> u64 {
        self.forwarded
    }

    pub fn tick(
        &mut self,
        source: &dyn AnimationStateMachine,
        target: &mut dyn AnimationStateMachine,
        events: &mut Vec<RigEvent>,
    ) -> MirrorOutcome {
        if !self.enabled {
            return MirrorOutcome::Disabled;
        }

        let params = match LocomotionParams::read(source) {
            Ok(p) => {
                self.read_failure_reported = false;
                p
            }
            Err(e) => {
                if !self.read_failure_reported {
                    log::warn!("[mirror] source read failed, keeping previous values: {e}");
                    self.read_failure_reported = true;
                }
                return MirrorOutcome::Skipped;
            }
        };

        match params.write(target) {
            Ok(()) => self.write_failure_reported = false,
            Err(e) => {
                if !self.write_failure_reported {
                    log::warn!("[mirror] target write failed: {e}");
                    self.write_failure_reported = true;
                }
            }
        }
        if self.log_values {
            log::debug!("[mirror] {params:?}");
        }

        let forwarded_attack = self.forward_attack_edge(source, target, events);
        MirrorOutcome::Synced {
            params,
            forwarded_attack,
        }
    }

    fn forward_attack_edge(
        &mut self,
        source: &dyn AnimationStateMachine,
        target: &mut dyn AnimationStateMachine,
        events: &mut Vec<RigEvent>,
    ) -> bool {
        if !(self.has_attack_param && self.forward_attack) {
            return false;
        }
        if !source.current_state_is_named(ATTACK_STATE) {
            self.latched = false;
            return false;
        }
        if self.latched {
            return false;
        }
        self.latched = true;
        if target.current_state_is_named(ATTACK_STATE) {
            return false;
        }
        match target.set_trigger(ATTACK) {
            Ok(()) => {
                self.forwarded += 1;
                events.push(RigEvent::TriggerForwarded {
                    trigger: ATTACK.to_string(),
                });
                log::debug!("[mirror] forwarded {ATTACK}");
                true
            }
            Err(e) => {
                log::warn!("[mirror] target did not take {ATTACK}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{GROUNDED, SPEED};
    use crate::testing::ScriptedMachine;

    fn pair(with_attack: bool) -> (ScriptedMachine, ScriptedMachine, LocomotionMirror) {
        let src = ScriptedMachine::locomotion(with_attack);
        let dst = ScriptedMachine::locomotion(true);
        let mirror = LocomotionMirror::new(Some(&src), Some(&dst), &MirrorConfig::default());
        (src, dst, mirror)
    }

    #[test]
    fn missing_rig_disables_permanently() {
        let dst = ScriptedMachine::locomotion(true);
        let mut m = LocomotionMirror::new(None, Some(&dst), &MirrorConfig::default());
        assert!(!m.is_enabled());

        let src = ScriptedMachine::locomotion(true).with_float(SPEED, 1.0);
        let mut dst = dst;
        let mut events = Vec::new();
        assert_eq!(m.tick(&src, &mut dst, &mut events), MirrorOutcome::Disabled);
        assert_eq!(dst.get_float(SPEED).unwrap(), 0.0);
    }

    #[test]
    fn read_failure_keeps_previous_target_values() {
        let (mut src, mut dst, mut m) = pair(true);
        let mut events = Vec::new();
        src.set_float(SPEED, 0.4).unwrap();
        m.tick(&src, &mut dst, &mut events);

        src.set_float(SPEED, 0.9).unwrap();
        src.set_bool(GROUNDED, true).unwrap();
        src.fail_reads_of(GROUNDED);
        assert_eq!(m.tick(&src, &mut dst, &mut events), MirrorOutcome::Skipped);
        // nothing was written, not even the readable Speed
        assert_eq!(dst.get_float(SPEED).unwrap(), 0.4);
        assert!(!dst.get_bool(GROUNDED).unwrap());
    }

    #[test]
    fn attack_probe_is_cached() {
        let (_, _, m) = pair(false);
        assert!(!m.has_attack_param());
        let (_, _, m) = pair(true);
        assert!(m.has_attack_param());
    }

    #[test]
    fn no_forwarding_without_attack_param() {
        let (mut src, mut dst, mut m) = pair(false);
        src.set_state(ATTACK_STATE);
        let mut events = Vec::new();
        m.tick(&src, &mut dst, &mut events);
        assert_eq!(dst.trigger_count(ATTACK), 0);
    }

    #[test]
    fn already_attacking_target_is_not_retriggered() {
        let (mut src, mut dst, mut m) = pair(true);
        src.set_state(ATTACK_STATE);
        dst.set_state(ATTACK_STATE);
        let mut events = Vec::new();
        for _ in 0..5 {
            m.tick(&src, &mut dst, &mut events);
        }
        // target left early; still the same source residency
        dst.set_state("Idle");
        m.tick(&src, &mut dst, &mut events);
        assert_eq!(dst.trigger_count(ATTACK), 0);
    }

    #[test]
    fn latch_resets_when_source_leaves_attack() {
        let (mut src, mut dst, mut m) = pair(true);
        let mut events = Vec::new();
        for _ in 0..2 {
            src.set_state(ATTACK_STATE);
            m.tick(&src, &mut dst, &mut events);
            m.tick(&src, &mut dst, &mut events);
            src.set_state("Idle");
            m.tick(&src, &mut dst, &mut events);
        }
        assert_eq!(dst.trigger_count(ATTACK), 2);
        assert_eq!(m.forwarded_triggers(), 2);
    }
}
