//! Footstep and landing events raised by animation clips.
//!
//! Blended clips all fire their events, so only events from a clip carrying at
//! least half of the blend weight are kept.

use serde::{Deserialize, Serialize};

use crate::outputs::RigEvent;

pub const MIN_CLIP_WEIGHT: f32 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipEventKind {
    Footstep,
    Land,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipEvent {
    pub kind: ClipEventKind,
    pub clip_weight: f32,
}

impl ClipEvent {
    pub fn footstep(clip_weight: f32) -> Self {
        Self {
            kind: ClipEventKind::Footstep,
            clip_weight,
        }
    }

    pub fn land(clip_weight: f32) -> Self {
        Self {
            kind: ClipEventKind::Land,
            clip_weight,
        }
    }

    pub fn accept(&self) -> Option<RigEvent> {
        if self.clip_weight < MIN_CLIP_WEIGHT {
            return None;
        }
        Some(match self.kind {
            ClipEventKind::Footstep => RigEvent::Footstep {
                clip_weight: self.clip_weight,
            },
            ClipEventKind::Land => RigEvent::Land {
                clip_weight: self.clip_weight,
            },
        })
    }
}

/// Append the accepted events in order.
pub fn filter_clip_events(raw: &[ClipEvent], out: &mut Vec<RigEvent>) {
    out.extend(raw.iter().filter_map(ClipEvent::accept));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_low_weight_clips() {
        let mut out = Vec::new();
        filter_clip_events(
            &[
                ClipEvent::footstep(0.3),
                ClipEvent::footstep(0.5),
                ClipEvent::land(0.49),
                ClipEvent::land(1.0),
            ],
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                RigEvent::Footstep { clip_weight: 0.5 },
                RigEvent::Land { clip_weight: 1.0 }
            ]
        );
    }
}
