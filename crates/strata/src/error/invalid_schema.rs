use super::Error;

/// Error when a model definition is invalid.
///
/// This occurs when:
/// - An entity or field name is duplicated
/// - An entity declares no identifier field, or more than one
/// - A foreign key references an entity that was never declared
/// - An index path or field set does not fit the model
///
/// These errors are caught while the schema builder runs, before any
/// statement is planned.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}
