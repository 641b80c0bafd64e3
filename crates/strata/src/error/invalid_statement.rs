use super::Error;

/// Error when a statement fails its structural preconditions.
///
/// This occurs when:
/// - An insert omits its own identifier field
/// - A setting targets a field of a foreign entity
/// - A connection condition names a non-foreign-key field
/// - Two conditions are supplied for the same field
///
/// These errors are raised at statement construction; an invalid statement
/// must never reach the planner.
#[derive(Debug)]
pub(super) struct InvalidStatement {
    message: Box<str>,
}

impl core::fmt::Display for InvalidStatement {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid statement: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid statement error.
    pub fn invalid_statement(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidStatement(InvalidStatement {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid statement error.
    pub fn is_invalid_statement(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidStatement(_))
    }
}
