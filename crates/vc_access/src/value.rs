use alloc::borrow::Cow;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use vc_types::hash::fixed_hash;
use vc_types::{ClassId, ScalarKind, SequenceKind, StructKind, TypeExpression, TypeFactory};
use vc_types::{TypeKind, TypeRegistry, builtin};

use crate::{Object, PropertiesView, Record};

// -----------------------------------------------------------------------------
// EnumValue

/// A variant of a registered enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    class: ClassId,
    variant: Arc<str>,
}

impl EnumValue {
    #[inline]
    pub fn new(class: ClassId, variant: impl Into<Arc<str>>) -> Self {
        Self {
            class,
            variant: variant.into(),
        }
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value: the data a binder reads and the objects it
/// produces.
///
/// Containers are shared, cloning a `Value` never deep-copies. Mutation
/// through an [`Accessor`](crate::Accessor) copies the container only if
/// it is shared.
///
/// Equality and hashing are total. Floats compare by bit pattern, so `NaN`
/// equals itself and `0.0` differs from `-0.0`. Maps and sets compare
/// regardless of order.
///
/// # Examples
///
/// ```
/// use vc_access::Value;
///
/// let value = Value::map([
///     ("name", Value::from("Ann")),
///     ("tags", Value::list(["a", "b"])),
/// ]);
///
/// assert!(value.is_map());
/// assert_eq!(value.get("name"), Some(&Value::from("Ann")));
/// assert_eq!(value.to_string(), r#"{name: Ann, tags: [a, b]}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Only used for integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Enum(EnumValue),
    /// A class literal.
    Class(ClassId),
    Array(Arc<[Value]>),
    List(Arc<Vec<Value>>),
    Set(Arc<IndexSet<Value>>),
    Map(Arc<IndexMap<Value, Value>>),
    /// A bean instance.
    Object(Object),
    /// A value object.
    Record(Record),
    /// A lazy view over an external property source.
    Properties(PropertiesView),
}

impl Value {
    /// A `List` of the given items.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// A `Set` of the given items, duplicates are dropped.
    pub fn set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Set(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// An `Array` of the given items.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// A `Map` of the given entries, in order.
    pub fn map<K: Into<Value>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// An enum variant.
    #[inline]
    pub fn enumeration(class: ClassId, variant: &str) -> Self {
        Self::Enum(EnumValue::new(class, variant))
    }

    // -------------------------------------------------------------------------
    // Predicates

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Leaf values: everything that is neither null nor a container.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_)
                | Self::Int(_)
                | Self::UInt(_)
                | Self::Float(_)
                | Self::Char(_)
                | Self::Str(_)
                | Self::Enum(_)
                | Self::Class(_)
        )
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_) | Self::Properties(_))
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Array(_) | Self::List(_) | Self::Set(_))
    }

    /// A short name of the variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Enum(_) => "enum",
            Self::Class(_) => "class",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Record(_) => "record",
            Self::Properties(_) => "properties",
        }
    }

    // -------------------------------------------------------------------------
    // Views

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer that fits an `i64`.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Any integer, widened.
    #[inline]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(i) => Some(*i as i128),
            Self::UInt(u) => Some(*u as i128),
            _ => None,
        }
    }

    /// Floats and integers as `f64`.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// The elements of an array, list or set, in order.
    pub fn elements(&self) -> Option<Vec<&Value>> {
        match self {
            Self::Array(items) => Some(items.iter().collect()),
            Self::List(items) => Some(items.iter().collect()),
            Self::Set(items) => Some(items.iter().collect()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Shortcut for a string-keyed lookup in a `Map`, an `Object` or a `Record`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(&Value::Str(name.into())),
            Self::Object(object) => object.get(name),
            Self::Record(record) => record.get(name),
            _ => None,
        }
    }

    /// The textual form of a scalar, `None` for anything else.
    ///
    /// This is the form a conversion service parses from.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Str(s) => Some(Cow::Borrowed(s)),
            Self::Enum(e) => Some(Cow::Borrowed(e.variant())),
            _ if self.is_scalar() => Some(Cow::Owned(self.to_string())),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Types

    /// The class of this value, if it has one.
    ///
    /// Containers report the builtin implementation they behave like:
    /// `ArrayList`, `LinkedHashSet` and `LinkedHashMap`. Arrays and null have
    /// no class.
    pub fn runtime_class(&self, registry: &TypeRegistry) -> Option<ClassId> {
        match self {
            Self::Enum(e) => return Some(e.class()),
            Self::Object(o) => return Some(o.class()),
            Self::Record(r) => return Some(r.class()),
            _ => {}
        }
        if !registry.has_builtins() {
            return None;
        }
        match self {
            Self::Bool(_) => Some(builtin::BOOL),
            Self::Int(_) => Some(builtin::I64),
            Self::UInt(_) => Some(builtin::U64),
            Self::Float(_) => Some(builtin::F64),
            Self::Char(_) => Some(builtin::CHAR),
            Self::Str(_) => Some(builtin::STRING),
            Self::Class(_) => Some(builtin::CLASS),
            Self::List(_) => Some(builtin::ARRAY_LIST),
            Self::Set(_) => Some(builtin::LINKED_HASH_SET),
            Self::Map(_) | Self::Properties(_) => Some(builtin::LINKED_HASH_MAP),
            _ => None,
        }
    }

    /// Whether this value can be stored where `ty` is expected.
    ///
    /// Null fits every type, and so does every value for a type that does
    /// not resolve.
    pub fn is_instance_of(&self, factory: &TypeFactory, ty: &TypeExpression) -> bool {
        if self.is_null() {
            return true;
        }
        let Some(raw) = factory.raw_class(ty) else {
            return true;
        };
        match factory.kind(ty) {
            TypeKind::Scalar(kind) => self.fits_scalar(kind),
            TypeKind::Enum => matches!(self, Self::Enum(e) if e.class() == raw),
            TypeKind::Array => matches!(self, Self::Array(_)),
            TypeKind::Sequence(SequenceKind::Set) => matches!(self, Self::Set(_)),
            TypeKind::Sequence(SequenceKind::List) => match self {
                Self::List(_) => true,
                Self::Set(_) => raw == builtin::COLLECTION,
                _ => false,
            },
            TypeKind::Map => self.is_map(),
            TypeKind::Struct(StructKind::Bean) => match self {
                Self::Object(o) => factory.is_assignable_to(&factory.of_class(o.class()), raw),
                _ => false,
            },
            TypeKind::Struct(StructKind::Record) => {
                matches!(self, Self::Record(r) if r.class() == raw)
            }
            TypeKind::Unknown => match self.runtime_class(factory.registry()) {
                Some(class) => factory.is_assignable_to(&factory.of_class(class), raw),
                None => factory.registry().root_class() == Some(raw),
            },
        }
    }

    /// Whether this scalar can be stored in a `kind` slot as is.
    pub fn fits_scalar(&self, kind: ScalarKind) -> bool {
        match (self, kind) {
            (Self::Bool(_), ScalarKind::Bool)
            | (Self::Char(_), ScalarKind::Char)
            | (Self::Str(_), ScalarKind::String)
            | (Self::Class(_), ScalarKind::Class) => true,
            (Self::Float(_) | Self::Int(_) | Self::UInt(_), k) if k.is_float() => true,
            (_, k) => match (self.as_i128(), k.integer_range()) {
                (Some(value), Some((min, max))) => (min..=max).contains(&value),
                _ => false,
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Equality

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Properties(a), Self::Properties(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Order independent hash of a map or set.
fn unordered_hash<T: Hash>(items: impl Iterator<Item = T>) -> u64 {
    items.fold(0u64, |acc, item| acc.wrapping_add(fixed_hash(&item)))
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::UInt(u) => u.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Char(c) => c.hash(state),
            Self::Str(s) => s.hash(state),
            Self::Enum(e) => e.hash(state),
            Self::Class(c) => c.hash(state),
            Self::Array(items) => items.hash(state),
            Self::List(items) => items.hash(state),
            Self::Set(items) => {
                state.write_usize(items.len());
                state.write_u64(unordered_hash(items.iter()));
            }
            Self::Map(map) => {
                state.write_usize(map.len());
                state.write_u64(unordered_hash(map.iter()));
            }
            Self::Object(o) => o.hash(state),
            Self::Record(r) => r.hash(state),
            Self::Properties(p) => p.hash(state),
        }
    }
}

// -----------------------------------------------------------------------------
// Display

fn join<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (index, item) in items.enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(item, f)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Str(s) => f.write_str(s),
            Self::Enum(e) => f.write_str(e.variant()),
            Self::Class(id) => write!(f, "{id}"),
            Self::Array(items) => {
                f.write_str("[")?;
                join(f, items.iter())?;
                f.write_str("]")
            }
            Self::List(items) => {
                f.write_str("[")?;
                join(f, items.iter())?;
                f.write_str("]")
            }
            Self::Set(items) => {
                f.write_str("[")?;
                join(f, items.iter())?;
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (index, (k, v)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Object(o) => fmt::Display::fmt(o, f),
            Self::Record(r) => fmt::Display::fmt(r, f),
            Self::Properties(p) => fmt::Display::fmt(p, f),
        }
    }
}

// -----------------------------------------------------------------------------
// From

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::Int(value as i64)
            }
        }
    )*};
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::from(value as u64)
            }
        }
    )*};
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32);

impl From<u64> for Value {
    #[inline]
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Self::Int(i),
            Err(_) => Self::UInt(value),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<char> for Value {
    #[inline]
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::List(Arc::new(value))
    }
}

impl From<IndexMap<Value, Value>> for Value {
    #[inline]
    fn from(value: IndexMap<Value, Value>) -> Self {
        Self::Map(Arc::new(value))
    }
}

impl From<Object> for Value {
    #[inline]
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Record> for Value {
    #[inline]
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<PropertiesView> for Value {
    #[inline]
    fn from(value: PropertiesView) -> Self {
        Self::Properties(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Tests
