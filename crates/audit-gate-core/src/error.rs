//! Error taxonomy for audit stream scanning.

/// Errors that abort a scan.
///
/// Lines that are not JSON objects, or whose `type` is not an advisory, are
/// never errors. Only advisory records missing the fields the gate needs,
/// and I/O failures, end up here.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("line {line}: advisory record is missing required field `{field}`")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: advisory field `{field}` is not an object")]
    NotAnObject { line: usize, field: &'static str },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateError {
    /// Line number (1-based) of the offending record, if the error came from one.
    pub fn line(&self) -> Option<usize> {
        match self {
            GateError::MissingField { line, .. } | GateError::NotAnObject { line, .. } => {
                Some(*line)
            }
            GateError::Io(_) => None,
        }
    }

    /// Whether this error describes a malformed advisory record rather than
    /// a failure of the surrounding I/O.
    pub fn is_malformed_record(&self) -> bool {
        self.line().is_some()
    }
}

/// Result type for audit-gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
