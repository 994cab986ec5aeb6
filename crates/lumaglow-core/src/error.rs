//! Error types for Lumaglow.

use thiserror::Error;

use crate::ids::{PortDirection, StageId};
use crate::param::ParamKind;

/// Main error type for graph composition operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unknown stage kind: {0}")]
    UnknownStageKind(String),

    #[error("Stage {stage} has no {direction} port named {port:?}")]
    DanglingPort {
        stage: String,
        port: String,
        direction: PortDirection,
    },

    #[error("Invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Input port {port:?} of stage {stage} is already connected")]
    AmbiguousReplacement { stage: StageId, port: String },

    #[error("Connecting {from} to {to} would create a cycle")]
    Cycle { from: StageId, to: StageId },

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Stage label {0:?} is already taken")]
    DuplicateStage(String),

    #[error("Stage {stage} has no parameter named {param:?}")]
    UnknownParameter { stage: String, param: String },

    #[error("Unknown meta parameter: {0}")]
    UnknownMetaParameter(String),

    #[error("Parameter {name:?} expects {expected}, got {got}")]
    ParamType {
        name: String,
        expected: ParamKind,
        got: ParamKind,
    },

    #[error("Parameter {name:?} cannot hold {value}")]
    OutOfRange { name: String, value: String },

    #[error("Required input {port:?} of stage {stage} is not connected")]
    UnconnectedInput { stage: String, port: String },

    #[error("Invalid binding: {0}")]
    InvalidBinding(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Lumaglow operations.
pub type Result<T> = std::result::Result<T, GraphError>;
