//! The animation state machine contract both rigs are driven through.
//!
//! A machine exposes named parameters of three kinds (float, bool, one-shot
//! trigger) and a single active state. Triggers are write-only: whether an
//! action "is happening" is observed through [`AnimationStateMachine::current_state_is_named`].

use crate::error::RigResult;

pub trait AnimationStateMachine {
    fn get_float(&self, name: &str) -> RigResult<f32>;
    fn set_float(&mut self, name: &str, value: f32) -> RigResult<()>;

    fn get_bool(&self, name: &str) -> RigResult<bool>;
    fn set_bool(&mut self, name: &str, value: bool) -> RigResult<()>;

    /// Arm a one-shot trigger. It stays armed until a transition consumes it.
    fn set_trigger(&mut self, name: &str) -> RigResult<()>;

    fn current_state_is_named(&self, name: &str) -> bool;

    fn has_parameter(&self, name: &str) -> bool;

    /// Name of the active state, for diagnostics. Machines owned by an external
    /// engine may not know it.
    fn current_state_name(&self) -> Option<&str> {
        None
    }

    /// Advance the machine by `dt` seconds. Machines advanced by their host
    /// engine keep the default no-op.
    fn advance(&mut self, _dt: f32) {}
}
