//! Uniform read/write access over one [`Value`].
//!
//! Every shape of data gets its own [`Accessor`] variant. Callers do not
//! pick the variant themselves: an [`AccessorProviders`] table picks it from
//! the value, see [`AccessorProviders::accessor`].
//!
//! Operations a shape does not support fail with
//! [`AccessError::Unsupported`], never with a generic error, so "wrong
//! shape" can be told apart from "wrong value".
//!
//! [`AccessorProviders`]: crate::AccessorProviders
//! [`AccessorProviders::accessor`]: crate::AccessorProviders::accessor

use core::fmt;

use vc_path::Entries;

use crate::{AccessError, AccessorProviders, Value};

mod map;
mod scalar;
mod sequence;
mod structured;

pub use map::{MapAccessor, PropertyAccessor};
pub use scalar::{NullAccessor, ScalarAccessor};
pub use sequence::{ArrayAccessor, SequenceAccessor};
pub use structured::{BeanAccessor, PropertyDescriptor, RecordAccessor};
pub use structured::{bean_properties, record_components};

// -----------------------------------------------------------------------------
// AccessKind

/// The accessor variants, one per data shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Null,
    Scalar,
    Array,
    /// Lists and sets.
    Sequence,
    Map,
    Bean,
    Record,
    /// A view over a [`PropertySource`](crate::PropertySource).
    Properties,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Null => "null",
            Self::Scalar => "scalar",
            Self::Array => "array",
            Self::Sequence => "sequence",
            Self::Map => "map",
            Self::Bean => "bean",
            Self::Record => "record",
            Self::Properties => "properties",
        })
    }
}

// -----------------------------------------------------------------------------
// Accessor

/// A read/write facade over one value.
///
/// Every operation has a default that fails with
/// [`AccessError::Unsupported`]; variants override what their shape allows.
/// A successful lookup that finds nothing is `Ok(None)`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::{AccessKind, AccessorProviders, Value};
/// use vc_types::{TypeFactory, TypeRegistry};
///
/// let providers = AccessorProviders::new(Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new()))));
///
/// let mut list = providers.accessor(Value::list(["a", "b"])).unwrap();
/// assert_eq!(list.kind(), AccessKind::Sequence);
/// assert_eq!(list.key_set().unwrap(), ["[0]", "[1]"]);
///
/// list.set_index(2, Value::from("c")).unwrap();
/// assert_eq!(list.get_index(2).unwrap(), Some(Value::from("c")));
///
/// let scalar = providers.accessor(Value::from(1)).unwrap();
/// assert!(scalar.get("x").unwrap_err().is_unsupported());
/// ```
pub trait Accessor {
    fn kind(&self) -> AccessKind;

    /// The wrapped value, including every change made through `set`.
    fn value(&self) -> &Value;

    fn into_value(self: Box<Self>) -> Value;

    /// Looks up a named member or key.
    fn get(&self, name: &str) -> Result<Option<Value>, AccessError> {
        let _ = name;
        Err(AccessError::unsupported("get", self.kind()))
    }

    /// Looks up a position.
    fn get_index(&self, index: usize) -> Result<Option<Value>, AccessError> {
        let _ = index;
        Err(AccessError::unsupported("get_index", self.kind()))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        let _ = (name, value);
        Err(AccessError::unsupported("set", self.kind()))
    }

    fn set_index(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        let _ = (index, value);
        Err(AccessError::unsupported("set_index", self.kind()))
    }

    /// Map keys, member names, or synthetic `[i]` keys for sequences.
    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Err(AccessError::unsupported("key_set", self.kind()))
    }

    /// Declared members of a bean or a record.
    fn properties(&self) -> Result<Vec<PropertyDescriptor>, AccessError> {
        Err(AccessError::unsupported("properties", self.kind()))
    }

    /// Walks `path` from this value, see [`AccessorProviders::navigate`].
    fn navigate(
        &self,
        providers: &AccessorProviders,
        path: &Entries,
    ) -> Result<Option<Value>, AccessError> {
        providers.navigate(self.value(), path)
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.kind() == AccessKind::Null
    }

    #[inline]
    fn is_scalar(&self) -> bool {
        self.kind() == AccessKind::Scalar
    }

    #[inline]
    fn is_map(&self) -> bool {
        matches!(self.kind(), AccessKind::Map | AccessKind::Properties)
    }

    #[inline]
    fn is_collection(&self) -> bool {
        matches!(self.kind(), AccessKind::Array | AccessKind::Sequence)
    }

    #[inline]
    fn is_bean(&self) -> bool {
        self.kind() == AccessKind::Bean
    }

    #[inline]
    fn is_record(&self) -> bool {
        self.kind() == AccessKind::Record
    }
}

/// Parses a member name as a position: `3` or `[3]`.
pub(crate) fn parse_index(name: &str) -> Option<usize> {
    let trimmed = name
        .strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
        .unwrap_or(name);
    trimmed.parse().ok()
}

/// The synthetic key of position `index`.
#[inline]
pub(crate) fn index_key(index: usize) -> String {
    format!("[{index}]")
}
