use thiserror::Error;

use crate::ClassId;

// -----------------------------------------------------------------------------
// Error

/// Structural misuse of the type system.
///
/// Unresolvable types are never errors, they resolve to `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TypeError {
    #[error("class `{0}` is already registered")]
    DuplicateClass(String),

    #[error("class id {0} is not registered")]
    UnknownClass(ClassId),

    #[error("no class is registered under the name `{0}`")]
    UnknownName(String),

    #[error("illegal argument: `{class}` declares {expected} type parameter(s), found {actual}")]
    ArityMismatch {
        class: String,
        expected: usize,
        actual: usize,
    },

    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("invalid type expression `{input}` at offset {offset}: {message}")]
    Syntax {
        input: String,
        offset: usize,
        message: String,
    },
}
