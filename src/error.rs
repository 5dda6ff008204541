use thiserror::Error;

/// The errors raised by the scheduling library.
///
/// Unsatisfiability is not an error: it is one of the outcomes returned by the solvers.
/// [`SchedError::Unknown`] is only raised when the caller asked for all-or-nothing enumerations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// The problem is malformed (unknown label, slot absent from an assignment, arity mismatch, ...).
    #[error("schema error: {0}")]
    Schema(String),

    /// The SAT backend faulted (crash, protocol violation).
    #[error("backend failure: {0}")]
    BackendFailure(String),

    /// The SAT backend could not decide within its resource bound.
    #[error("the backend could not decide the problem within its resource bound")]
    Unknown,

    /// The caller cancelled the operation.
    #[error("the operation was cancelled")]
    Cancelled,
}

impl SchedError {
    pub(crate) fn schema<S: Into<String>>(message: S) -> Self {
        SchedError::Schema(message.into())
    }

    pub(crate) fn backend<S: Into<String>>(message: S) -> Self {
        SchedError::BackendFailure(message.into())
    }
}

/// The result type used by the library.
pub type Result<T> = std::result::Result<T, SchedError>;
