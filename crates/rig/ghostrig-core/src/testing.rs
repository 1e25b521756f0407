//! Hand-driven machine for tests and host integrations whose
//! animation graph lives elsewhere: the state is set directly and every
//! trigger call is counted.

use hashbrown::HashMap;

use crate::error::{RigError, RigResult};
use crate::machine::AnimationStateMachine;
use crate::params::{ParamKind, ATTACK, BOOL_PARAMS, FLOAT_PARAMS};

#[derive(Clone, Debug, Default)]
pub struct ScriptedMachine {
    floats: HashMap<String, f32>,
    bools: HashMap<String, bool>,
    triggers: HashMap<String, usize>,
    state: String,
    /// Parameters whose reads fail, to simulate a broken binding.
    failing_reads: Vec<String>,
}

impl ScriptedMachine {
    pub fn new(state: &str) -> Self {
        Self {
            state: state.to_string(),
            ..Default::default()
        }
    }

    /// Machine with the full locomotion vocabulary, optionally with the `Attack` trigger.
    pub fn locomotion(with_attack: bool) -> Self {
        let mut m = Self::new("Idle");
        for f in FLOAT_PARAMS {
            m.floats.insert(f.to_string(), 0.0);
        }
        for b in BOOL_PARAMS {
            m.bools.insert(b.to_string(), false);
        }
        if with_attack {
            m.triggers.insert(ATTACK.to_string(), 0);
        }
        m
    }

    pub fn with_float(mut self, name: &str, value: f32) -> Self {
        self.floats.insert(name.to_string(), value);
        self
    }

    pub fn with_bool(mut self, name: &str, value: bool) -> Self {
        self.bools.insert(name.to_string(), value);
        self
    }

    pub fn with_trigger(mut self, name: &str) -> Self {
        self.triggers.insert(name.to_string(), 0);
        self
    }

    pub fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }

    pub fn fail_reads_of(&mut self, name: &str) {
        self.failing_reads.push(name.to_string());
    }

    pub fn trigger_count(&self, name: &str) -> usize {
        self.triggers.get(name).copied().unwrap_or(0)
    }

    fn kind_of(&self, name: &str) -> Option<ParamKind> {
        if self.floats.contains_key(name) {
            Some(ParamKind::Float)
        } else if self.bools.contains_key(name) {
            Some(ParamKind::Bool)
        } else if self.triggers.contains_key(name) {
            Some(ParamKind::Trigger)
        } else {
            None
        }
    }

    fn lookup_err(&self, name: &str, expected: ParamKind) -> RigError {
        match self.kind_of(name) {
            Some(actual) => RigError::kind(name, expected, actual),
            None => RigError::missing(name),
        }
    }

    fn check_read(&self, name: &str) -> RigResult<()> {
        if self.failing_reads.iter().any(|f| f == name) {
            return Err(RigError::unresolved(name));
        }
        Ok(())
    }
}

impl AnimationStateMachine for ScriptedMachine {
    fn get_float(&self, name: &str) -> RigResult<f32> {
        self.check_read(name)?;
        self.floats
            .get(name)
            .copied()
            .ok_or_else(|| self.lookup_err(name, ParamKind::Float))
    }

    fn set_float(&mut self, name: &str, value: f32) -> RigResult<()> {
        match self.floats.get_mut(name) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(self.lookup_err(name, ParamKind::Float)),
        }
    }

    fn get_bool(&self, name: &str) -> RigResult<bool> {
        self.check_read(name)?;
        self.bools
            .get(name)
            .copied()
            .ok_or_else(|| self.lookup_err(name, ParamKind::Bool))
    }

    fn set_bool(&mut self, name: &str, value: bool) -> RigResult<()> {
        match self.bools.get_mut(name) {
            Some(b) => {
                *b = value;
                Ok(())
            }
            None => Err(self.lookup_err(name, ParamKind::Bool)),
        }
    }

    fn set_trigger(&mut self, name: &str) -> RigResult<()> {
        match self.triggers.get_mut(name) {
            Some(n) => {
                *n += 1;
                Ok(())
            }
            None => Err(self.lookup_err(name, ParamKind::Trigger)),
        }
    }

    fn current_state_is_named(&self, name: &str) -> bool {
        self.state == name
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    fn current_state_name(&self) -> Option<&str> {
        Some(&self.state)
    }
}
