//! Facial expression blending over a fixed preset catalog.
//!
//! Exactly one expression is active. Switching resets the blend weight to zero
//! before fading the new one in, and every tick writes zero to all other
//! supported presets, so two non-neutral expressions are never visible at once.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{RigError, RigResult};
use crate::interp::WeightInterpolator;
use crate::outputs::RigEvent;

/// Expression channels. The presets follow the VRM 1.0 names; `Blink` is
/// driven separately by the auto blink.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionKey {
    Neutral,
    Happy,
    Angry,
    Sad,
    Relaxed,
    Surprised,
    Blink,
}

impl ExpressionKey {
    pub const PRESETS: [ExpressionKey; 6] = [
        ExpressionKey::Neutral,
        ExpressionKey::Happy,
        ExpressionKey::Angry,
        ExpressionKey::Sad,
        ExpressionKey::Relaxed,
        ExpressionKey::Surprised,
    ];

    pub const ALL: [ExpressionKey; 7] = [
        ExpressionKey::Neutral,
        ExpressionKey::Happy,
        ExpressionKey::Angry,
        ExpressionKey::Sad,
        ExpressionKey::Relaxed,
        ExpressionKey::Surprised,
        ExpressionKey::Blink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExpressionKey::Neutral => "Neutral",
            ExpressionKey::Happy => "Happy",
            ExpressionKey::Angry => "Angry",
            ExpressionKey::Sad => "Sad",
            ExpressionKey::Relaxed => "Relaxed",
            ExpressionKey::Surprised => "Surprised",
            ExpressionKey::Blink => "Blink",
        }
    }

    pub fn is_preset(&self) -> bool {
        !matches!(self, ExpressionKey::Blink)
    }

    /// Digit hotkeys: 1 happy, 2 angry, 3 sad, 4 surprised, 5 relaxed, 0 neutral.
    pub fn from_hotkey(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(ExpressionKey::Neutral),
            1 => Some(ExpressionKey::Happy),
            2 => Some(ExpressionKey::Angry),
            3 => Some(ExpressionKey::Sad),
            4 => Some(ExpressionKey::Surprised),
            5 => Some(ExpressionKey::Relaxed),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExpressionKey {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpressionKey::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RigError::UnsupportedChannel {
                name: s.to_string(),
            })
    }
}

/// Where expression weights go (a blend-shape proxy, a weights table, ...).
pub trait ExpressionSink {
    fn supports(&self, key: ExpressionKey) -> bool;
    fn set_weight(&mut self, key: ExpressionKey, weight: f32) -> RigResult<()>;
    /// Last written weight, when the sink can report it.
    fn weight(&self, _key: ExpressionKey) -> Option<f32> {
        None
    }
}

/// Weight table sink for hosts that read the weights back each frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionWeights {
    channels: Vec<ExpressionKey>,
    weights: HashMap<ExpressionKey, f32>,
    #[serde(skip)]
    writes: u64,
}

impl ExpressionWeights {
    pub fn with_channels(channels: &[ExpressionKey]) -> Self {
        Self {
            channels: channels.to_vec(),
            weights: HashMap::new(),
            writes: 0,
        }
    }

    /// Every preset plus `Blink`.
    pub fn full() -> Self {
        Self::with_channels(&ExpressionKey::ALL)
    }

    /// Last written weight, 0 for channels never written.
    pub fn get(&self, key: ExpressionKey) -> f32 {
        self.weights.get(&key).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExpressionKey, f32)> + '_ {
        self.weights.iter().map(|(k, w)| (*k, *w))
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Default for ExpressionWeights {
    fn default() -> Self {
        Self::full()
    }
}

impl ExpressionSink for ExpressionWeights {
    fn supports(&self, key: ExpressionKey) -> bool {
        self.channels.contains(&key)
    }

    fn set_weight(&mut self, key: ExpressionKey, weight: f32) -> RigResult<()> {
        if !self.supports(key) {
            return Err(RigError::UnsupportedChannel {
                name: key.name().to_string(),
            });
        }
        self.weights.insert(key, weight.clamp(0.0, 1.0));
        self.writes += 1;
        Ok(())
    }

    fn weight(&self, key: ExpressionKey) -> Option<f32> {
        self.weights.get(&key).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Interpolation rate per second toward the target weight.
    pub expression_speed: f32,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            expression_speed: 5.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExpressionController {
    channels: Vec<ExpressionKey>,
    current: ExpressionKey,
    weight: WeightInterpolator,
    sink_failure_reported: bool,
}

impl ExpressionController {
    /// Probe the sink once for the preset channels it carries.
    pub fn new(cfg: &ExpressionConfig, sink: &dyn ExpressionSink) -> Self {
        let channels: Vec<ExpressionKey> = ExpressionKey::PRESETS
            .into_iter()
            .filter(|k| sink.supports(*k))
            .collect();
        if channels.is_empty() {
            log::warn!("[expression] sink exposes no expression presets");
        } else {
            log::info!("[expression] {} presets available", channels.len());
        }
        Self {
            channels,
            current: ExpressionKey::Neutral,
            weight: WeightInterpolator::new(cfg.expression_speed),
            sink_failure_reported: false,
        }
    }

    pub fn channels(&self) -> &[ExpressionKey] {
        &self.channels
    }

    pub fn current(&self) -> ExpressionKey {
        self.current
    }

    pub fn current_weight(&self) -> f32 {
        self.weight.current
    }

    pub fn target_weight(&self) -> f32 {
        self.weight.target
    }

    pub fn supports(&self, key: ExpressionKey) -> bool {
        self.channels.contains(&key)
    }

    /// Select `key`. Returns `false` and changes nothing for channels the sink
    /// does not carry. Neutral is always accepted, with or without a channel.
    pub fn set_expression(&mut self, key: ExpressionKey) -> bool {
        if key != ExpressionKey::Neutral && !self.supports(key) {
            return false;
        }
        if key != self.current {
            self.weight.reset(0.0);
            self.current = key;
            log::debug!("[expression] -> {key}");
        }
        self.weight
            .retarget(if key == ExpressionKey::Neutral { 0.0 } else { 1.0 });
        true
    }

    pub fn set_expression_named(&mut self, name: &str) -> bool {
        match name.parse::<ExpressionKey>() {
            Ok(key) => self.set_expression(key),
            Err(_) => false,
        }
    }

    /// Same as [`Self::set_expression`] but reports the change as an event.
    pub fn select(&mut self, key: ExpressionKey, events: &mut Vec<RigEvent>) -> bool {
        let changed = key != self.current;
        let accepted = self.set_expression(key);
        if accepted && changed {
            events.push(RigEvent::ExpressionChanged { expression: key });
        }
        accepted
    }

    pub fn tick(&mut self, dt: f32, sink: &mut dyn ExpressionSink) {
        let w = self.weight.tick(dt);
        for &key in &self.channels {
            let value = if key == self.current { w } else { 0.0 };
            if let Err(e) = sink.set_weight(key, value) {
                if !self.sink_failure_reported {
                    log::warn!("[expression] sink rejected {key}: {e}");
                    self.sink_failure_reported = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn non_neutral_visible(sink: &ExpressionWeights) -> usize {
        ExpressionKey::PRESETS
            .into_iter()
            .filter(|k| *k != ExpressionKey::Neutral)
            .filter(|k| sink.weight(*k).unwrap_or(0.0) > 0.0)
            .count()
    }

    #[test]
    fn fades_toward_target() {
        let mut sink = ExpressionWeights::full();
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        assert!(ctl.set_expression(ExpressionKey::Happy));
        ctl.tick(0.1, &mut sink);
        // rate 5 * dt 0.1 covers half the distance
        assert!(approx(sink.weight(ExpressionKey::Happy).unwrap(), 0.5, 1e-6));
        for _ in 0..60 {
            ctl.tick(0.1, &mut sink);
        }
        assert!(approx(ctl.current_weight(), 1.0, 1e-4));
    }

    #[test]
    fn switching_mid_fade_never_shows_two_expressions() {
        let mut sink = ExpressionWeights::full();
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        ctl.set_expression(ExpressionKey::Happy);
        for _ in 0..3 {
            ctl.tick(0.016, &mut sink);
            assert!(non_neutral_visible(&sink) <= 1);
        }
        ctl.set_expression(ExpressionKey::Sad);
        assert_eq!(ctl.current_weight(), 0.0);
        for _ in 0..30 {
            ctl.tick(0.016, &mut sink);
            assert!(non_neutral_visible(&sink) <= 1);
            assert_eq!(sink.weight(ExpressionKey::Happy), Some(0.0));
        }
        assert!(sink.weight(ExpressionKey::Sad).unwrap() > 0.0);
    }

    #[test]
    fn reselecting_current_keeps_weight() {
        let mut sink = ExpressionWeights::full();
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        ctl.set_expression(ExpressionKey::Angry);
        ctl.tick(0.1, &mut sink);
        let before = ctl.current_weight();
        ctl.set_expression(ExpressionKey::Angry);
        assert_eq!(ctl.current_weight(), before);
    }

    #[test]
    fn neutral_targets_zero() {
        let mut sink = ExpressionWeights::full();
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        ctl.set_expression(ExpressionKey::Happy);
        ctl.tick(0.1, &mut sink);
        ctl.set_expression(ExpressionKey::Neutral);
        assert_eq!(ctl.target_weight(), 0.0);
        ctl.tick(0.1, &mut sink);
        assert_eq!(non_neutral_visible(&sink), 0);
    }

    #[test]
    fn unsupported_and_unknown_names_are_ignored() {
        let sink =
            ExpressionWeights::with_channels(&[ExpressionKey::Neutral, ExpressionKey::Happy]);
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        assert!(!ctl.set_expression(ExpressionKey::Sad));
        assert!(!ctl.set_expression_named("Smirk"));
        assert!(!ctl.set_expression(ExpressionKey::Blink));
        assert!(ctl.set_expression_named("happy"));
        assert_eq!(ctl.current(), ExpressionKey::Happy);
    }

    #[test]
    fn neutral_is_accepted_without_a_neutral_channel() {
        let mut sink =
            ExpressionWeights::with_channels(&[ExpressionKey::Happy, ExpressionKey::Sad]);
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        assert!(ctl.set_expression(ExpressionKey::Happy));
        for _ in 0..30 {
            ctl.tick(0.1, &mut sink);
        }
        assert!(sink.weight(ExpressionKey::Happy).unwrap() > 0.99);

        // it should release the face even though no Neutral channel exists
        assert!(ctl.set_expression(ExpressionKey::Neutral));
        assert_eq!(ctl.current(), ExpressionKey::Neutral);
        ctl.tick(0.1, &mut sink);
        assert_eq!(sink.weight(ExpressionKey::Happy), Some(0.0));
        assert_eq!(sink.weight(ExpressionKey::Sad), Some(0.0));
        assert_eq!(sink.weight(ExpressionKey::Neutral), None);
    }

    #[test]
    fn hotkeys_map_to_presets() {
        assert_eq!(ExpressionKey::from_hotkey(4), Some(ExpressionKey::Surprised));
        assert_eq!(ExpressionKey::from_hotkey(5), Some(ExpressionKey::Relaxed));
        assert_eq!(ExpressionKey::from_hotkey(0), Some(ExpressionKey::Neutral));
        assert_eq!(ExpressionKey::from_hotkey(9), None);
    }

    #[test]
    fn select_reports_changes_only() {
        let sink = ExpressionWeights::full();
        let mut ctl = ExpressionController::new(&ExpressionConfig::default(), &sink);
        let mut events = Vec::new();
        ctl.select(ExpressionKey::Relaxed, &mut events);
        ctl.select(ExpressionKey::Relaxed, &mut events);
        assert_eq!(
            events,
            vec![RigEvent::ExpressionChanged {
                expression: ExpressionKey::Relaxed
            }]
        );
    }
}
