use core::fmt;

use crate::ScalarKind;

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a resolved type, as seen by the binder.
///
/// Computed once per [`TypeExpression`] by [`TypeFactory::kind`] and matched
/// exhaustively, instead of asking a chain of `is_xxx` questions in a
/// particular order.
///
/// [`TypeExpression`]: crate::TypeExpression
/// [`TypeFactory::kind`]: crate::TypeFactory::kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar(ScalarKind),
    Enum,
    Array,
    Sequence(SequenceKind),
    Map,
    Struct(StructKind),
    /// `Object`, unresolved variables and classes with no known shape.
    Unknown,
}

/// Which collection contract a [`TypeKind::Sequence`] follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Any `Collection` that is not a `Set`.
    List,
    Set,
}

/// Which construction protocol a [`TypeKind::Struct`] follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// Created empty, then filled through setters.
    Bean,
    /// Created once from every component.
    Record,
}

impl TypeKind {
    #[inline]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Returns `true` for arrays and sequences.
    #[inline]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::Array | Self::Sequence(_))
    }

    #[inline]
    pub const fn is_map(self) -> bool {
        matches!(self, Self::Map)
    }

    #[inline]
    pub const fn is_struct(self) -> bool {
        matches!(self, Self::Struct(_))
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "Scalar({kind})"),
            Self::Enum => f.pad("Enum"),
            Self::Array => f.pad("Array"),
            Self::Sequence(SequenceKind::List) => f.pad("List"),
            Self::Sequence(SequenceKind::Set) => f.pad("Set"),
            Self::Map => f.pad("Map"),
            Self::Struct(StructKind::Bean) => f.pad("Bean"),
            Self::Struct(StructKind::Record) => f.pad("Record"),
            Self::Unknown => f.pad("Unknown"),
        }
    }
}
