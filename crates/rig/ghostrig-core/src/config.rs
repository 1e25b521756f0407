//! Rig configuration. Every section defaults independently, so a JSON document
//! only needs the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::attack::AttackConfig;
use crate::blink::BlinkConfig;
use crate::diagnostics::DiagnosticsCfg;
use crate::error::{RigError, RigResult};
use crate::expression::ExpressionConfig;
use crate::locomotion::LocomotionConfig;
use crate::mirror::MirrorConfig;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub attack: AttackConfig,
    pub mirror: MirrorConfig,
    pub expression: ExpressionConfig,
    pub blink: BlinkConfig,
    pub locomotion: LocomotionConfig,
    pub diagnostics: DiagnosticsCfg,
}

impl RigConfig {
    pub fn from_json_str(s: &str) -> RigResult<Self> {
        let cfg: RigConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> RigResult<()> {
        non_negative("attack.attack_duration", self.attack.attack_duration)?;
        let m = self.attack.move_speed_multiplier;
        if !(0.0..=1.0).contains(&m) {
            return Err(RigError::Config(format!(
                "attack.move_speed_multiplier must be within [0, 1], got {m}"
            )));
        }
        non_negative("expression.expression_speed", self.expression.expression_speed)?;
        non_negative("blink.min_interval", self.blink.min_interval)?;
        non_negative("blink.max_interval", self.blink.max_interval)?;
        non_negative("blink.blink_speed", self.blink.blink_speed)?;
        non_negative("locomotion.walk_speed", self.locomotion.walk_speed)?;
        non_negative("locomotion.sprint_speed", self.locomotion.sprint_speed)?;
        non_negative("locomotion.speed_change_rate", self.locomotion.speed_change_rate)?;
        Ok(())
    }
}

fn non_negative(field: &str, value: f32) -> RigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RigError::Config(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = RigConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, RigConfig::default());
        assert_eq!(cfg.attack.attack_duration, 0.8);
        assert_eq!(cfg.attack.move_speed_multiplier, 0.1);
        assert_eq!(cfg.expression.expression_speed, 5.0);
        assert_eq!(cfg.blink.max_interval, 6.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = RigConfig::from_json_str(r#"{ "attack": { "attack_duration": 1.2 } }"#).unwrap();
        assert_eq!(cfg.attack.attack_duration, 1.2);
        assert_eq!(cfg.attack.move_speed_multiplier, 0.1);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(RigConfig::from_json_str(r#"{ "attack": { "attack_duration": -1 } }"#).is_err());
        assert!(
            RigConfig::from_json_str(r#"{ "attack": { "move_speed_multiplier": 1.5 } }"#).is_err()
        );
        assert!(RigConfig::from_json_str(r#"{ "blink": { "blink_speed": -0.1 } }"#).is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            RigConfig::from_json_str("{ nope"),
            Err(RigError::Config(_))
        ));
    }
}
