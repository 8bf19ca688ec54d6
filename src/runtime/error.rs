use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cannot parse: {message}")]
    Parse { message: String },
    #[error("evaluate depth exceeded")]
    DepthExceeded,
    #[error("cannot find identifier `{name}`")]
    UnknownName { name: String },
    #[error("reassigning `{name}`")]
    Reassignment { name: String },
    #[error("unknown type identifier `{name}`")]
    UnknownType { name: String },
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },
    #[error("unsupported type: {message}")]
    UnsupportedType { message: String },
    #[error("operation `{op}` not supported")]
    UnsupportedOperator { op: String },
    #[error("arity mismatch: expected {expected} values but received {received}")]
    ArityMismatch { expected: usize, received: usize },
    #[error("not enough arguments to function: expected {expected}, received {received}")]
    TooFewArgs { expected: usize, received: usize },
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: i64, len: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("{clause} evaluated to a non-boolean")]
    BadCondition { clause: String },
    #[error("index is not an integer")]
    BadIndex,
    #[error("cannot take the element type of a non-array type")]
    NotAnArray,
    #[error("break or continue outside loop")]
    StrayBranch,
    #[error("{prefix}: {source}")]
    Context {
        prefix: String,
        #[source]
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    /// Wrap with a short context prefix while keeping the kind inspectable
    /// through [`RuntimeError::root`].
    pub fn context(self, prefix: impl Into<String>) -> Self {
        RuntimeError::Context {
            prefix: prefix.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping any context layers.
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

pub(crate) trait ResultExt<T> {
    fn prefix(self, prefix: &str) -> RuntimeResult<T>;
}

impl<T> ResultExt<T> for RuntimeResult<T> {
    fn prefix(self, prefix: &str) -> RuntimeResult<T> {
        self.map_err(|err| err.context(prefix))
    }
}
