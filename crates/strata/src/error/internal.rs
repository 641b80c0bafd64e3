use super::Error;

/// Internal consistency fault.
///
/// Raised when a planning invariant is violated, e.g. a pruned graph no
/// longer reaches the owner of a field the derived query must select, or a
/// longest path is requested of an empty graph. These cannot occur when
/// callers gate derivation on `modifies_index`; when they do occur the
/// computation fails loudly rather than recovering.
#[derive(Debug)]
pub(super) struct Internal {
    message: Box<str>,
}

impl core::fmt::Display for Internal {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "internal consistency fault: {}", self.message)
    }
}

impl Error {
    /// Creates an internal consistency error.
    pub fn internal(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Internal(Internal {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an internal consistency error.
    pub fn is_internal(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Internal(_))
    }
}
