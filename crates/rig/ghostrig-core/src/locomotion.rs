//! Locomotion driver: turns move intent and ground state into control-rig
//! parameters, slowed by the attack multiplier.

use serde::{Deserialize, Serialize};

use crate::intent::IntentSource;
use crate::interp::WeightInterpolator;
use crate::machine::AnimationStateMachine;
use crate::params::LocomotionParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Metres per second.
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub speed_change_rate: f32,
    /// Scale by stick magnitude instead of treating any input as full speed.
    pub analog_movement: bool,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            sprint_speed: 5.335,
            speed_change_rate: 10.0,
            analog_movement: false,
        }
    }
}

/// Ground contact as reported by the host's character physics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundState {
    pub grounded: bool,
    pub jump: bool,
    pub free_fall: bool,
}

impl GroundState {
    pub fn on_ground() -> Self {
        Self {
            grounded: true,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct LocomotionDriver {
    cfg: LocomotionConfig,
    speed: WeightInterpolator,
    heading: [f32; 2],
    last: LocomotionParams,
    write_failure_reported: bool,
}

impl LocomotionDriver {
    pub fn new(cfg: LocomotionConfig) -> Self {
        let speed = WeightInterpolator::new(cfg.speed_change_rate);
        Self {
            cfg,
            speed,
            heading: [0.0, 0.0],
            last: LocomotionParams::default(),
            write_failure_reported: false,
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.cfg
    }

    /// Current smoothed speed in metres per second.
    pub fn speed(&self) -> f32 {
        self.speed.current
    }

    /// Parameters written on the last tick.
    pub fn last_params(&self) -> LocomotionParams {
        self.last
    }

    /// Horizontal velocity (x, z) along the last non-zero move direction.
    pub fn planar_velocity(&self) -> [f32; 2] {
        [
            self.heading[0] * self.speed.current,
            self.heading[1] * self.speed.current,
        ]
    }

    /// Compute this tick's parameters without touching a machine.
    pub fn update(
        &mut self,
        dt: f32,
        intent: &dyn IntentSource,
        ground: GroundState,
        speed_multiplier: f32,
    ) -> LocomotionParams {
        let [x, z] = intent.move_vector();
        let magnitude = (x * x + z * z).sqrt();
        let moving = magnitude > f32::EPSILON;
        if moving {
            self.heading = [x / magnitude, z / magnitude];
        }

        let input_scale = if self.cfg.analog_movement {
            magnitude.min(1.0)
        } else {
            1.0
        };
        let base = if intent.sprint() {
            self.cfg.sprint_speed
        } else {
            self.cfg.walk_speed
        };
        let target = if moving {
            base * input_scale * speed_multiplier
        } else {
            0.0
        };
        self.speed.retarget(target);
        let speed = self.speed.tick(dt);

        let normalized = if self.cfg.sprint_speed > 0.0 {
            (speed / self.cfg.sprint_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let motion_speed = if moving { magnitude.min(1.0) } else { 1.0 };

        self.last = LocomotionParams {
            speed: normalized,
            motion_speed,
            grounded: ground.grounded,
            jump: ground.jump || (ground.grounded && intent.jump_requested()),
            free_fall: ground.free_fall,
        };
        self.last
    }

    pub fn tick(
        &mut self,
        dt: f32,
        intent: &dyn IntentSource,
        ground: GroundState,
        speed_multiplier: f32,
        control: &mut dyn AnimationStateMachine,
    ) -> LocomotionParams {
        let params = self.update(dt, intent, ground, speed_multiplier);
        match params.write(control) {
            Ok(()) => self.write_failure_reported = false,
            Err(e) => {
                if !self.write_failure_reported {
                    log::warn!("[locomotion] control rig write failed: {e}");
                    self.write_failure_reported = true;
                }
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::InputIntent;
    use crate::params::{MOTION_SPEED, SPEED};
    use crate::testing::ScriptedMachine;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn walking() -> InputIntent {
        InputIntent {
            movement: [0.0, 1.0],
            ..Default::default()
        }
    }

    fn settle(driver: &mut LocomotionDriver, intent: &InputIntent, multiplier: f32) {
        for _ in 0..300 {
            driver.update(1.0 / 60.0, intent, GroundState::on_ground(), multiplier);
        }
    }

    #[test]
    fn settles_at_walk_speed() {
        let mut d = LocomotionDriver::new(LocomotionConfig::default());
        settle(&mut d, &walking(), 1.0);
        assert!(approx(d.speed(), 2.0, 1e-3), "speed {}", d.speed());
        let v = d.planar_velocity();
        assert!(approx(v[0], 0.0, 1e-6) && approx(v[1], 2.0, 1e-3));
    }

    #[test]
    fn attack_multiplier_scales_speed() {
        let mut d = LocomotionDriver::new(LocomotionConfig::default());
        settle(&mut d, &walking(), 0.1);
        assert!(approx(d.speed(), 0.2, 1e-3), "speed {}", d.speed());
    }

    #[test]
    fn sprint_and_idle_targets() {
        let mut d = LocomotionDriver::new(LocomotionConfig::default());
        let sprint = InputIntent {
            sprint: true,
            ..walking()
        };
        settle(&mut d, &sprint, 1.0);
        assert!(approx(d.last_params().speed, 1.0, 1e-3));

        settle(&mut d, &InputIntent::default(), 1.0);
        assert!(d.speed() < 1e-3);
        assert_eq!(d.last_params().motion_speed, 1.0);
    }

    #[test]
    fn analog_input_scales_target_and_motion_speed() {
        let cfg = LocomotionConfig {
            analog_movement: true,
            ..Default::default()
        };
        let mut d = LocomotionDriver::new(cfg);
        let half = InputIntent {
            movement: [0.5, 0.0],
            ..Default::default()
        };
        settle(&mut d, &half, 1.0);
        assert!(approx(d.speed(), 1.0, 1e-3));
        assert_eq!(d.last_params().motion_speed, 0.5);
    }

    #[test]
    fn writes_parameters_to_control_rig() {
        let mut d = LocomotionDriver::new(LocomotionConfig::default());
        let mut rig = ScriptedMachine::locomotion(true);
        let jump = InputIntent {
            jump: true,
            ..walking()
        };
        let p = d.tick(0.05, &jump, GroundState::on_ground(), 1.0, &mut rig);
        assert_eq!(rig.get_float(SPEED).unwrap(), p.speed);
        assert_eq!(rig.get_float(MOTION_SPEED).unwrap(), 1.0);
        assert!(p.grounded && p.jump && !p.free_fall);
    }
}
