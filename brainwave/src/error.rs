use std::fmt;

use engine::EngineError;
use thiserror::Error;

/// Malformed samples, rejected before they reach the circuit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("sample arrays are empty")]
    Empty,

    #[error("got {powers} powers but {frequencies} frequencies")]
    LengthMismatch { powers: usize, frequencies: usize },

    #[error("value {value} is outside [0, 100)")]
    OutOfRange { value: f64 },

    #[error("sample value is not finite")]
    NotFinite,
}

/// Steps of one classification, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Compile,
    KeyGen,
    Encrypt,
    Evaluate,
    Decrypt,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Compile => "compile",
            Stage::KeyGen => "keygen",
            Stage::Encrypt => "encrypt",
            Stage::Evaluate => "evaluate",
            Stage::Decrypt => "decrypt",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("{stage} stage failed: {source}")]
    Engine { stage: Stage, source: EngineError },

    /// The decrypted result is not a band ordinal.
    #[error("decrypted ordinal {ordinal} is not a band")]
    Inconsistent { ordinal: i64 },
}

impl PipelineError {
    pub(crate) fn at(stage: Stage) -> impl FnOnce(EngineError) -> PipelineError {
        move |source| PipelineError::Engine { stage, source }
    }

    /// The engine stage that failed, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Engine { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
