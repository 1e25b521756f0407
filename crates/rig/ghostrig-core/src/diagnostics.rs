use serde::{Deserialize, Serialize};

use crate::expression::ExpressionKey;
use crate::params::LocomotionParams;

/// Diagnostics switches. `log_*` flags gate per-tick `debug!` traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
    pub log_mirror: bool,
    pub log_attack: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg {
            enabled: true,
            log_mirror: false,
            log_attack: false,
        }
    }
}

/// Serializable view of a character after a frame, for overlays and tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigSnapshot {
    pub control_state: Option<String>,
    pub visual_state: Option<String>,
    pub params: Option<LocomotionParams>,
    pub attacking: bool,
    pub attack_remaining: f32,
    pub move_speed_multiplier: f32,
    pub mirror_enabled: bool,
    pub expression: Option<ExpressionKey>,
    pub expression_weight: f32,
    pub blink_weight: f32,
}

impl RigSnapshot {
    /// Human-readable lines for an on-screen debug overlay.
    pub fn overlay_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(format!(
            "control: {}  visual: {}",
            self.control_state.as_deref().unwrap_or("-"),
            self.visual_state.as_deref().unwrap_or("-")
        ));
        if let Some(p) = &self.params {
            lines.push(format!(
                "speed {:.2}  motion {:.2}  grounded {}  jump {}  fall {}",
                p.speed, p.motion_speed, p.grounded, p.jump, p.free_fall
            ));
        }
        if self.attacking {
            lines.push(format!(
                "attack {:.2}s left (x{:.2})",
                self.attack_remaining, self.move_speed_multiplier
            ));
        }
        if let Some(e) = self.expression {
            lines.push(format!(
                "expression {} {:.2}  blink {:.2}",
                e.name(),
                self.expression_weight,
                self.blink_weight
            ));
            lines.push("1 happy  2 angry  3 sad  4 surprised  5 relaxed  0 neutral".into());
        }
        if !self.mirror_enabled {
            lines.push("mirror disabled".into());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_reports_attack_and_disabled_mirror() {
        let snap = RigSnapshot {
            control_state: Some("Attack".into()),
            attacking: true,
            attack_remaining: 0.4,
            move_speed_multiplier: 0.1,
            ..Default::default()
        };
        let lines = snap.overlay_lines();
        assert!(lines[0].contains("control: Attack"));
        assert!(lines.iter().any(|l| l.starts_with("attack 0.40s")));
        assert_eq!(lines.last().map(String::as_str), Some("mirror disabled"));
    }
}
