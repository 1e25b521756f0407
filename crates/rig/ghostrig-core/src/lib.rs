//! ghostrig
//!
//! Keeps a character's two animation rigs in lockstep: the control rig that
//! gameplay drives, and the visual rig the player sees. Each frame the
//! locomotion parameters are pushed onto the control rig, mirrored onto the
//! visual rig, and the attack action is layered on top as a one-shot trigger.
//! Expression blending and auto blink run last.
//!
//! Engine-agnostic: rigs are reached through [`AnimationStateMachine`] and
//! faces through [`ExpressionSink`]. [`animator::Animator`] is a data-driven
//! implementation for hosts without their own animation graph.

pub mod animator;
pub mod attack;
pub mod blink;
pub mod character;
pub mod clip_events;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod intent;
pub mod interp;
pub mod locomotion;
pub mod machine;
pub mod mirror;
pub mod outputs;
pub mod params;
pub mod scheduler;
pub mod testing;

pub use crate::animator::{Animator, AnimatorDefinition};
pub use crate::attack::{AttackConfig, AttackController, AttackPhase};
pub use crate::blink::{AutoBlink, BlinkConfig};
pub use crate::character::{Character, FrameInput};
pub use crate::clip_events::{ClipEvent, ClipEventKind};
pub use crate::config::RigConfig;
pub use crate::diagnostics::{DiagnosticsCfg, RigSnapshot};
pub use crate::error::{RigError, RigResult};
pub use crate::expression::{
    ExpressionConfig, ExpressionController, ExpressionKey, ExpressionSink, ExpressionWeights,
};
pub use crate::intent::{InputIntent, IntentSource};
pub use crate::interp::{approach, WeightInterpolator};
pub use crate::locomotion::{GroundState, LocomotionConfig, LocomotionDriver};
pub use crate::machine::AnimationStateMachine;
pub use crate::mirror::{LocomotionMirror, MirrorConfig, MirrorOutcome};
pub use crate::outputs::{RigEvent, RigFrame};
pub use crate::params::LocomotionParams;
pub use crate::scheduler::{Phase, PHASE_ORDER};
