//! Data-driven animator controller implementing [`AnimationStateMachine`].
//!
//! Definitions are plain serde data (parameters, states, transitions) so rigs can
//! be authored as JSON. Evaluation follows the usual controller rules:
//! - any-state transitions are checked before the current state's own ones,
//!   each group in declaration order;
//! - at most one transition fires per `advance`;
//! - a trigger stays armed until a firing transition consumes it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{RigError, RigResult};
use crate::machine::AnimationStateMachine;
use crate::params::ParamKind;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Float(f32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

fn default_length() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    pub name: String,
    /// Clip length in seconds.
    #[serde(default = "default_length")]
    pub length: f32,
    #[serde(default)]
    pub looping: bool,
    /// Float parameter multiplying playback rate (e.g. `MotionSpeed`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_param: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum Condition {
    If { param: String },
    IfNot { param: String },
    Greater { param: String, threshold: f32 },
    Less { param: String, threshold: f32 },
}

impl Condition {
    pub fn param(&self) -> &str {
        match self {
            Condition::If { param }
            | Condition::IfNot { param }
            | Condition::Greater { param, .. }
            | Condition::Less { param, .. } => param,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    /// Source state. `None` means any state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Normalized time the source state must reach before this can fire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<f32>,
    #[serde(default)]
    pub can_transition_to_self: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
    pub states: Vec<StateDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
    pub default_state: String,
}

impl AnimatorDefinition {
    pub fn from_json_str(s: &str) -> RigResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Slot {
    Float(f32),
    Bool(bool),
    Trigger(bool),
}

impl Slot {
    fn kind(&self) -> ParamKind {
        match self {
            Slot::Float(_) => ParamKind::Float,
            Slot::Bool(_) => ParamKind::Bool,
            Slot::Trigger(_) => ParamKind::Trigger,
        }
    }

    fn from_def(def: &ParameterDef) -> RigResult<Self> {
        match (def.kind, def.default) {
            (ParamKind::Float, None) => Ok(Slot::Float(0.0)),
            (ParamKind::Float, Some(ParamValue::Float(v))) => Ok(Slot::Float(v)),
            (ParamKind::Bool, None) => Ok(Slot::Bool(false)),
            (ParamKind::Bool, Some(ParamValue::Bool(b))) => Ok(Slot::Bool(b)),
            (ParamKind::Trigger, None) => Ok(Slot::Trigger(false)),
            (kind, Some(v)) => Err(RigError::Config(format!(
                "parameter {} of kind {:?} has incompatible default {:?}",
                def.name, kind, v
            ))),
        }
    }
}

#[derive(Clone, Debug)]
struct Transition {
    from: Option<usize>,
    to: usize,
    conditions: Vec<Condition>,
    exit_time: Option<f32>,
    can_transition_to_self: bool,
}

#[derive(Clone, Debug)]
pub struct Animator {
    name: String,
    states: Vec<StateDef>,
    /// Any-state transitions first, then state transitions, each in authored order.
    transitions: Vec<Transition>,
    params: HashMap<String, Slot>,
    defaults: HashMap<String, Slot>,
    default_state: usize,
    current: usize,
    state_time: f32,
    entered_state: Option<usize>,
}

impl Animator {
    pub fn new(def: AnimatorDefinition) -> RigResult<Self> {
        let mut params: HashMap<String, Slot> = HashMap::new();
        for p in &def.parameters {
            if params.insert(p.name.clone(), Slot::from_def(p)?).is_some() {
                return Err(RigError::Config(format!("duplicate parameter {}", p.name)));
            }
        }

        for (i, s) in def.states.iter().enumerate() {
            if def.states[..i].iter().any(|o| o.name == s.name) {
                return Err(RigError::Config(format!("duplicate state {}", s.name)));
            }
            if s.length < 0.0 {
                return Err(RigError::Config(format!(
                    "state {} has negative length {}",
                    s.name, s.length
                )));
            }
            if let Some(sp) = &s.speed_param {
                match params.get(sp) {
                    Some(Slot::Float(_)) => {}
                    Some(other) => return Err(RigError::kind(sp, ParamKind::Float, other.kind())),
                    None => return Err(RigError::missing(sp)),
                }
            }
        }

        let index_of = |name: &str| -> RigResult<usize> {
            def.states
                .iter()
                .position(|s| s.name == name)
                .ok_or_else(|| RigError::UnknownState {
                    name: name.to_string(),
                })
        };

        let default_state = index_of(&def.default_state)?;

        let mut any_state = Vec::new();
        let mut from_state = Vec::new();
        for t in &def.transitions {
            if t.conditions.is_empty() && t.exit_time.is_none() {
                return Err(RigError::Config(format!(
                    "transition to {} has neither conditions nor exit time",
                    t.to
                )));
            }
            for c in &t.conditions {
                let slot = params
                    .get(c.param())
                    .ok_or_else(|| RigError::missing(c.param()))?;
                let ok = match c {
                    Condition::If { .. } | Condition::IfNot { .. } => {
                        matches!(slot, Slot::Bool(_) | Slot::Trigger(_))
                    }
                    Condition::Greater { .. } | Condition::Less { .. } => {
                        matches!(slot, Slot::Float(_))
                    }
                };
                if !ok {
                    return Err(RigError::Config(format!(
                        "condition {:?} does not apply to {:?} parameter",
                        c,
                        slot.kind()
                    )));
                }
            }
            let compiled = Transition {
                from: t.from.as_deref().map(index_of).transpose()?,
                to: index_of(&t.to)?,
                conditions: t.conditions.clone(),
                exit_time: t.exit_time,
                can_transition_to_self: t.can_transition_to_self,
            };
            if compiled.from.is_none() {
                any_state.push(compiled);
            } else {
                from_state.push(compiled);
            }
        }
        any_state.extend(from_state);

        Ok(Self {
            name: def.name,
            states: def.states,
            transitions: any_state,
            defaults: params.clone(),
            params,
            default_state,
            current: default_state,
            state_time: 0.0,
            entered_state: None,
        })
    }

    pub fn from_json_str(s: &str) -> RigResult<Self> {
        Self::new(AnimatorDefinition::from_json_str(s)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> &str {
        &self.states[self.current].name
    }

    /// Seconds of playback in the current state, scaled by its speed parameter.
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn normalized_time(&self) -> f32 {
        let len = self.states[self.current].length;
        if len > 0.0 {
            self.state_time / len
        } else {
            1.0
        }
    }

    /// State entered during the last `advance`, if any.
    pub fn entered_state(&self) -> Option<&str> {
        self.entered_state.map(|i| self.states[i].name.as_str())
    }

    pub fn is_trigger_set(&self, name: &str) -> bool {
        matches!(self.params.get(name), Some(Slot::Trigger(true)))
    }

    pub fn reset_trigger(&mut self, name: &str) -> RigResult<()> {
        match self.params.get_mut(name) {
            Some(Slot::Trigger(armed)) => {
                *armed = false;
                Ok(())
            }
            Some(other) => Err(RigError::kind(name, ParamKind::Trigger, other.kind())),
            None => Err(RigError::missing(name)),
        }
    }

    /// Return to the default state with every parameter at its default.
    pub fn reset(&mut self) {
        self.params = self.defaults.clone();
        self.current = self.default_state;
        self.state_time = 0.0;
        self.entered_state = None;
    }

    fn playback_speed(&self) -> f32 {
        match &self.states[self.current].speed_param {
            Some(p) => match self.params.get(p) {
                Some(Slot::Float(v)) => v.max(0.0),
                _ => 1.0,
            },
            None => 1.0,
        }
    }

    fn condition_met(&self, c: &Condition) -> bool {
        match (c, self.params.get(c.param())) {
            (Condition::If { .. }, Some(Slot::Bool(b) | Slot::Trigger(b))) => *b,
            (Condition::IfNot { .. }, Some(Slot::Bool(b) | Slot::Trigger(b))) => !*b,
            (Condition::Greater { threshold, .. }, Some(Slot::Float(v))) => v > threshold,
            (Condition::Less { threshold, .. }, Some(Slot::Float(v))) => v < threshold,
            _ => false,
        }
    }

    fn pick_transition(&self) -> Option<usize> {
        let normalized = self.normalized_time();
        self.transitions.iter().position(|t| {
            match t.from {
                Some(from) if from != self.current => return false,
                None if t.to == self.current && !t.can_transition_to_self => return false,
                _ => {}
            }
            if let Some(exit) = t.exit_time {
                if normalized < exit {
                    return false;
                }
            }
            t.conditions.iter().all(|c| self.condition_met(c))
        })
    }
}

impl AnimationStateMachine for Animator {
    fn get_float(&self, name: &str) -> RigResult<f32> {
        match self.params.get(name) {
            Some(Slot::Float(v)) => Ok(*v),
            Some(other) => Err(RigError::kind(name, ParamKind::Float, other.kind())),
            None => Err(RigError::missing(name)),
        }
    }

    fn set_float(&mut self, name: &str, value: f32) -> RigResult<()> {
        match self.params.get_mut(name) {
            Some(Slot::Float(v)) => {
                *v = value;
                Ok(())
            }
            Some(other) => Err(RigError::kind(name, ParamKind::Float, other.kind())),
            None => Err(RigError::missing(name)),
        }
    }

    fn get_bool(&self, name: &str) -> RigResult<bool> {
        match self.params.get(name) {
            Some(Slot::Bool(b)) => Ok(*b),
            Some(other) => Err(RigError::kind(name, ParamKind::Bool, other.kind())),
            None => Err(RigError::missing(name)),
        }
    }

    fn set_bool(&mut self, name: &str, value: bool) -> RigResult<()> {
        match self.params.get_mut(name) {
            Some(Slot::Bool(b)) => {
                *b = value;
                Ok(())
            }
            Some(other) => Err(RigError::kind(name, ParamKind::Bool, other.kind())),
            None => Err(RigError::missing(name)),
        }
    }

    fn set_trigger(&mut self, name: &str) -> RigResult<()> {
        match self.params.get_mut(name) {
            Some(Slot::Trigger(armed)) => {
                *armed = true;
                Ok(())
            }
            Some(other) => Err(RigError::kind(name, ParamKind::Trigger, other.kind())),
            None => Err(RigError::missing(name)),
        }
    }

    fn current_state_is_named(&self, name: &str) -> bool {
        self.states[self.current].name == name
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    fn current_state_name(&self) -> Option<&str> {
        Some(self.current_state())
    }

    fn advance(&mut self, dt: f32) {
        self.entered_state = None;
        self.state_time += dt.max(0.0) * self.playback_speed();

        let Some(i) = self.pick_transition() else {
            return;
        };
        for c in &self.transitions[i].conditions {
            if let Condition::If { param } = c {
                if let Some(Slot::Trigger(armed)) = self.params.get_mut(param) {
                    *armed = false;
                }
            }
        }
        let to = self.transitions[i].to;
        log::debug!(
            "[animator:{}] {} -> {}",
            self.name,
            self.states[self.current].name,
            self.states[to].name
        );
        self.current = to;
        self.state_time = 0.0;
        self.entered_state = Some(to);
    }
}
