//! Error types for rig wiring, parameter access and configuration.

use thiserror::Error;

use crate::params::ParamKind;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum RigError {
    /// A rig, or the state machine on it, could not be resolved.
    #[error("Unresolved reference: {role}")]
    UnresolvedReference { role: String },

    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Parameter {name} is a {actual:?}, expected {expected:?}")]
    ParameterKind {
        name: String,
        expected: ParamKind,
        actual: ParamKind,
    },

    #[error("Unknown state: {name}")]
    UnknownState { name: String },

    #[error("Unsupported expression channel: {name}")]
    UnsupportedChannel { name: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl RigError {
    pub fn missing(name: &str) -> Self {
        RigError::MissingParameter {
            name: name.to_string(),
        }
    }

    pub fn unresolved(role: &str) -> Self {
        RigError::UnresolvedReference {
            role: role.to_string(),
        }
    }

    pub fn kind(name: &str, expected: ParamKind, actual: ParamKind) -> Self {
        RigError::ParameterKind {
            name: name.to_string(),
            expected,
            actual,
        }
    }

    /// True for errors caused by a parameter that does not exist on the machine.
    pub fn is_missing(&self) -> bool {
        matches!(self, RigError::MissingParameter { .. })
    }
}

impl From<serde_json::Error> for RigError {
    fn from(e: serde_json::Error) -> Self {
        RigError::Config(e.to_string())
    }
}

pub type RigResult<T> = Result<T, RigError>;
