use thiserror::Error;
use vc_access::AccessError;

// -----------------------------------------------------------------------------
// ConversionError

/// Failure of a [`ConversionService`](crate::ConversionService).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("cannot convert a {from} value to `{to}`")]
    Unsupported { from: &'static str, to: String },

    #[error("cannot convert `{value}` to `{to}`")]
    Invalid { value: String, to: String },

    #[error("`{value}` is out of range for `{to}`")]
    OutOfRange { value: String, to: String },

    #[error("`{value}` is not a variant of `{to}`")]
    UnknownVariant { value: String, to: String },

    #[error("`{0}` is not a registered class")]
    UnknownClass(String),
}

// -----------------------------------------------------------------------------
// BindError

/// Failure of a bind operation.
///
/// Missing data is never an error, it is an empty
/// [`BindResult`](crate::BindResult). Errors raised while binding one path
/// reach the caller wrapped in [`BindError::Failure`] naming that path, see
/// [`root_cause`](Self::root_cause).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("no binder supports the target type `{target}`")]
    NoBinderFound { target: String },

    #[error("recursive binding detected at `{path}`")]
    RecursiveBinding { path: String },

    #[error("required property `{property}` has no value at `{path}`")]
    RequiredPropertyMissing { path: String, property: String },

    #[error("failed to bind `{path}` to `{target}`: {source}")]
    Failure {
        path: String,
        target: String,
        source: Box<BindError>,
    },

    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("circular placeholder reference `{0}`")]
    CircularPlaceholder(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[cfg(feature = "serde")]
    #[error("cannot deserialize the bound value: {0}")]
    Deserialize(#[from] vc_access::serde::ValueError),
}

impl BindError {
    /// The innermost error, below every [`Failure`](Self::Failure) wrapper.
    pub fn root_cause(&self) -> &BindError {
        let mut current = self;
        while let Self::Failure { source, .. } = current {
            current = source;
        }
        current
    }

    /// The error already names a path and needs no further wrapping.
    #[inline]
    pub(crate) fn is_binding_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

// -----------------------------------------------------------------------------
// Tests
