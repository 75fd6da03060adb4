use thiserror::Error;

use crate::AccessKind;

// -----------------------------------------------------------------------------
// AccessError

/// Failure of an [`Accessor`](crate::Accessor) operation.
///
/// [`Unsupported`](AccessError::Unsupported) means the value has the wrong
/// shape for the operation, which callers usually treat as "no data here".
/// Every other variant is a real failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("unsupported access: `{operation}` on a {kind} value")]
    Unsupported {
        operation: &'static str,
        kind: AccessKind,
    },

    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("cannot modify an immutable {0} value")]
    Immutable(AccessKind),

    #[error("property `{0}` is not writable")]
    ReadOnly(String),

    #[error("no accessor provider supports a {0} value")]
    NoProvider(&'static str),

    #[error("illegal argument: {0}")]
    IllegalArgument(String),
}

impl AccessError {
    #[inline]
    pub(crate) const fn unsupported(operation: &'static str, kind: AccessKind) -> Self {
        Self::Unsupported { operation, kind }
    }

    /// Returns `true` for [`AccessError::Unsupported`].
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
