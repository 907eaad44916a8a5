use std::fmt;

/// Broad classification of a failed operation.
///
/// Every failure aborts the whole operation. The kind tells the caller
/// whether retrying can ever help: precondition and authorisation failures
/// need a different call, state conflicts may resolve with time, external
/// call failures depend on the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input.
    PreconditionViolation,
    /// Wrong caller for a role-gated operation.
    AuthorizationFailure,
    /// The operation is not allowed in the current state.
    StateConflict,
    /// Overflow on accumulation.
    ArithmeticFailure,
    /// A token or native transfer failed.
    ExternalCallFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreconditionViolation => f.write_str("precondition violation"),
            Self::AuthorizationFailure => f.write_str("authorization failure"),
            Self::StateConflict => f.write_str("state conflict"),
            Self::ArithmeticFailure => f.write_str("arithmetic failure"),
            Self::ExternalCallFailure => f.write_str("external call failure"),
        }
    }
}
