use thiserror::Error;

/// Reasons a circuit cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    #[error("representative input set is empty")]
    EmptyInputset,

    #[error("sample {sample} has {got} arguments, circuit takes {expected}")]
    ArgumentCount {
        sample: usize,
        expected: usize,
        got: usize,
    },

    #[error("sample {sample}: argument `{param}` has length {got}, expected {expected}")]
    InconsistentShape {
        sample: usize,
        param: String,
        expected: usize,
        got: usize,
    },

    #[error("argument `{0}` is an empty array")]
    EmptyArgument(String),

    #[error("parameter `{0}` has no encryption status")]
    MissingStatus(String),

    #[error("encryption status given for unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("circuit needs {required}-bit integers, at most {max} are supported")]
    WidthExceeded { required: u32, max: u32 },

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Errors raised by the engine, tagged by the lifecycle step that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),

    #[error("key generation failed: {0}")]
    KeyGen(String),

    #[error("no key material, keygen must run first")]
    MissingKeys,

    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("argument `{param}` has length {got}, circuit was compiled for {expected}")]
    ShapeMismatch {
        param: String,
        expected: usize,
        got: usize,
    },

    #[error("value {value} of argument `{param}` does not fit the compiled {width}-bit domain")]
    ValueOutOfRange { param: String, value: i64, width: u32 },

    #[error("evaluation failed: {0}")]
    Evaluation(String),

    #[error("decryption failed: {0}")]
    Decryption(String),
}

impl EngineError {
    /// True for argument count and array length disagreements.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            EngineError::ArgumentCount { .. } | EngineError::ShapeMismatch { .. }
        )
    }
}
