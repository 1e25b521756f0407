//! Randomized automatic blinking on the `Blink` channel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::expression::{ExpressionKey, ExpressionSink};
use crate::outputs::RigEvent;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub enabled: bool,
    pub min_interval: f32,
    pub max_interval: f32,
    /// Seconds to close the eyes; opening takes as long again.
    pub blink_speed: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: 2.0,
            max_interval: 6.0,
            blink_speed: 0.1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BlinkPhase {
    /// Seconds left before the next scheduled blink.
    Waiting { remaining: f32 },
    Closing,
    Opening,
}

#[derive(Clone, Debug)]
pub struct AutoBlink {
    cfg: BlinkConfig,
    phase: BlinkPhase,
    weight: f32,
    /// A manual blink began and `BlinkStarted` is not reported yet.
    announce_start: bool,
    rng: StdRng,
    available: bool,
    sink_failure_reported: bool,
}

impl AutoBlink {
    pub fn new(cfg: BlinkConfig, sink: &dyn ExpressionSink) -> Self {
        Self::with_rng(cfg, sink, StdRng::from_os_rng())
    }

    pub fn seeded(cfg: BlinkConfig, sink: &dyn ExpressionSink, seed: u64) -> Self {
        Self::with_rng(cfg, sink, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(cfg: BlinkConfig, sink: &dyn ExpressionSink, rng: StdRng) -> Self {
        let available = sink.supports(ExpressionKey::Blink);
        if !available {
            log::warn!("[blink] sink has no Blink channel; auto blink disabled");
        }
        let mut blink = Self {
            cfg,
            phase: BlinkPhase::Waiting { remaining: 0.0 },
            weight: 0.0,
            announce_start: false,
            rng,
            available,
            sink_failure_reported: false,
        };
        blink.schedule();
        blink
    }

    fn next_interval(&mut self) -> f32 {
        let (min, max) = (self.cfg.min_interval, self.cfg.max_interval);
        if max > min {
            self.rng.random_range(min..max)
        } else {
            min
        }
    }

    fn schedule(&mut self) {
        let remaining = self.next_interval();
        self.phase = BlinkPhase::Waiting { remaining };
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_blinking(&self) -> bool {
        !matches!(self.phase, BlinkPhase::Waiting { .. })
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Seconds until the next scheduled blink, `None` while blinking.
    pub fn time_to_next(&self) -> Option<f32> {
        match self.phase {
            BlinkPhase::Waiting { remaining } => Some(remaining.max(0.0)),
            _ => None,
        }
    }

    /// Suppress scheduled blinks. A blink in progress still completes.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.cfg.enabled = enabled;
    }

    /// Start a blink now. Ignored while one is running.
    pub fn trigger(&mut self) -> bool {
        if !self.available || self.is_blinking() {
            return false;
        }
        self.phase = BlinkPhase::Closing;
        self.announce_start = true;
        true
    }

    pub fn tick(&mut self, dt: f32, sink: &mut dyn ExpressionSink, events: &mut Vec<RigEvent>) {
        if !self.available {
            return;
        }
        let dt = dt.max(0.0);
        if std::mem::take(&mut self.announce_start) {
            events.push(RigEvent::BlinkStarted);
        }
        let step = if self.cfg.blink_speed > 0.0 {
            dt / self.cfg.blink_speed
        } else {
            1.0
        };

        match self.phase {
            BlinkPhase::Waiting { remaining } => {
                let remaining = (remaining - dt).max(0.0);
                self.phase = if self.cfg.enabled && remaining <= 0.0 {
                    events.push(RigEvent::BlinkStarted);
                    BlinkPhase::Closing
                } else {
                    BlinkPhase::Waiting { remaining }
                };
                return;
            }
            BlinkPhase::Closing => {
                self.weight += step;
                if self.weight >= 1.0 - 1e-5 {
                    self.weight = 1.0;
                    self.phase = BlinkPhase::Opening;
                }
            }
            BlinkPhase::Opening => {
                self.weight -= step;
                if self.weight <= 1e-5 {
                    self.weight = 0.0;
                    self.schedule();
                    events.push(RigEvent::BlinkFinished);
                }
            }
        }

        if let Err(e) = sink.set_weight(ExpressionKey::Blink, self.weight) {
            if !self.sink_failure_reported {
                log::warn!("[blink] sink rejected weight: {e}");
                self.sink_failure_reported = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionWeights;

    #[test]
    fn intervals_stay_in_range() {
        let sink = ExpressionWeights::full();
        let mut b = AutoBlink::seeded(BlinkConfig::default(), &sink, 7);
        for _ in 0..100 {
            let i = b.next_interval();
            assert!((2.0..6.0).contains(&i), "interval {i}");
        }
    }

    #[test]
    fn degenerate_range_uses_min() {
        let cfg = BlinkConfig {
            min_interval: 3.0,
            max_interval: 3.0,
            ..Default::default()
        };
        let sink = ExpressionWeights::full();
        let b = AutoBlink::seeded(cfg, &sink, 1);
        assert_eq!(b.time_to_next(), Some(3.0));
    }

    #[test]
    fn manual_blink_ramps_up_then_down() {
        let mut sink = ExpressionWeights::full();
        let mut b = AutoBlink::seeded(BlinkConfig::default(), &sink, 3);
        let mut events = Vec::new();
        assert!(b.trigger());
        assert!(!b.trigger(), "already blinking");

        for _ in 0..4 {
            b.tick(0.025, &mut sink, &mut events);
        }
        assert_eq!(sink.weight(ExpressionKey::Blink), Some(1.0));
        for _ in 0..4 {
            b.tick(0.025, &mut sink, &mut events);
        }
        assert_eq!(sink.weight(ExpressionKey::Blink), Some(0.0));
        assert!(!b.is_blinking());
        // it should pair the manual blink's start and finish
        assert_eq!(events, vec![RigEvent::BlinkStarted, RigEvent::BlinkFinished]);
    }

    #[test]
    fn disabled_blink_does_not_schedule() {
        let cfg = BlinkConfig {
            enabled: false,
            ..Default::default()
        };
        let mut sink = ExpressionWeights::full();
        let mut b = AutoBlink::seeded(cfg, &sink, 5);
        let mut events = Vec::new();
        for _ in 0..100 {
            b.tick(0.1, &mut sink, &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(sink.writes(), 0);
    }

    #[test]
    fn scheduled_blink_fires_within_max_interval() {
        let mut sink = ExpressionWeights::full();
        let mut b = AutoBlink::seeded(BlinkConfig::default(), &sink, 11);
        let mut events = Vec::new();
        for _ in 0..62 {
            b.tick(0.1, &mut sink, &mut events);
        }
        assert!(events.contains(&RigEvent::BlinkStarted));
    }

    #[test]
    fn keeps_blinking_after_days_of_uptime() {
        let mut sink = ExpressionWeights::full();
        let mut b = AutoBlink::seeded(BlinkConfig::default(), &sink, 7);
        let mut events = Vec::new();
        for _ in 0..530_000 {
            b.tick(1.0, &mut sink, &mut events);
        }
        events.clear();
        for _ in 0..3_600 {
            b.tick(1.0 / 60.0, &mut sink, &mut events);
        }
        // it should still blink at the configured rate, at least once per six seconds
        let started = events.iter().filter(|e| **e == RigEvent::BlinkStarted).count();
        assert!(started >= 9, "blinks in 60s: {started}");
    }

    #[test]
    fn waiting_countdown_tracks_elapsed_time() {
        let cfg = BlinkConfig {
            min_interval: 4.0,
            max_interval: 4.0,
            ..Default::default()
        };
        let mut sink = ExpressionWeights::full();
        let mut b = AutoBlink::seeded(cfg, &sink, 1);
        let mut events = Vec::new();
        b.tick(1.5, &mut sink, &mut events);
        assert_eq!(b.time_to_next(), Some(2.5));
        b.tick(2.5, &mut sink, &mut events);
        assert_eq!(events, vec![RigEvent::BlinkStarted]);
        assert!(b.is_blinking());
    }

    #[test]
    fn sink_without_blink_channel_disables() {
        let mut sink = ExpressionWeights::with_channels(&[ExpressionKey::Happy]);
        let mut b = AutoBlink::seeded(BlinkConfig::default(), &sink, 2);
        assert!(!b.is_available());
        assert!(!b.trigger());
        let mut events = Vec::new();
        b.tick(10.0, &mut sink, &mut events);
        assert!(events.is_empty());
    }
}
