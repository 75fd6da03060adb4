use std::sync::Arc;

use super::{index_key, parse_index};
use crate::{AccessError, AccessKind, Accessor, Value};

// -----------------------------------------------------------------------------
// ArrayAccessor

/// Accessor of a fixed-size [`Value::Array`].
///
/// Elements can be replaced but the length never changes.
#[derive(Debug, Clone)]
pub struct ArrayAccessor {
    value: Value,
}

impl ArrayAccessor {
    #[inline]
    pub fn new(value: Value) -> Self {
        debug_assert!(matches!(value, Value::Array(_)));
        Self { value }
    }

    fn items(&self) -> &[Value] {
        match &self.value {
            Value::Array(items) => items,
            _ => &[],
        }
    }
}

impl Accessor for ArrayAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Array
    }

    #[inline]
    fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    fn into_value(self: Box<Self>) -> Value {
        self.value
    }

    fn get(&self, name: &str) -> Result<Option<Value>, AccessError> {
        match parse_index(name) {
            Some(index) => self.get_index(index),
            None => Err(AccessError::unsupported("get", self.kind())),
        }
    }

    #[inline]
    fn get_index(&self, index: usize) -> Result<Option<Value>, AccessError> {
        Ok(self.items().get(index).cloned())
    }

    fn set_index(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        let len = self.items().len();
        if index >= len {
            return Err(AccessError::OutOfBounds { index, len });
        }
        let mut items = self.items().to_vec();
        items[index] = value;
        self.value = Value::Array(items.into());
        Ok(())
    }

    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Ok((0..self.items().len()).map(index_key).collect())
    }
}

// -----------------------------------------------------------------------------
// SequenceAccessor

/// Accessor of a [`Value::List`] or a [`Value::Set`].
///
/// Setting the position right after the last element appends. Sets only
/// support appending.
#[derive(Debug, Clone)]
pub struct SequenceAccessor {
    value: Value,
}

impl SequenceAccessor {
    #[inline]
    pub fn new(value: Value) -> Self {
        debug_assert!(matches!(value, Value::List(_) | Value::Set(_)));
        Self { value }
    }

    fn len(&self) -> usize {
        match &self.value {
            Value::List(items) => items.len(),
            Value::Set(items) => items.len(),
            _ => 0,
        }
    }
}

impl Accessor for SequenceAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Sequence
    }

    #[inline]
    fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    fn into_value(self: Box<Self>) -> Value {
        self.value
    }

    fn get(&self, name: &str) -> Result<Option<Value>, AccessError> {
        match parse_index(name) {
            Some(index) => self.get_index(index),
            None => Err(AccessError::unsupported("get", self.kind())),
        }
    }

    fn get_index(&self, index: usize) -> Result<Option<Value>, AccessError> {
        Ok(match &self.value {
            Value::List(items) => items.get(index).cloned(),
            Value::Set(items) => items.get_index(index).cloned(),
            _ => None,
        })
    }

    fn set_index(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        let len = self.len();
        match &mut self.value {
            Value::List(items) if index < len => {
                Arc::make_mut(items)[index] = value;
                Ok(())
            }
            Value::List(items) if index == len => {
                Arc::make_mut(items).push(value);
                Ok(())
            }
            Value::Set(items) if index == len => {
                Arc::make_mut(items).insert(value);
                Ok(())
            }
            Value::Set(_) if index < len => {
                Err(AccessError::unsupported("set_index", AccessKind::Sequence))
            }
            _ => Err(AccessError::OutOfBounds { index, len }),
        }
    }

    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Ok((0..self.len()).map(index_key).collect())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{AccessError, Accessor, ArrayAccessor, SequenceAccessor, Value};

    #[test]
    fn arrays_keep_their_length() {
        let mut array = ArrayAccessor::new(Value::array([1, 2]));
        array.set_index(1, Value::from(5)).unwrap();
        assert_eq!(array.get("[1]").unwrap(), Some(Value::from(5)));
        assert_eq!(
            array.set_index(2, Value::from(3)),
            Err(AccessError::OutOfBounds { index: 2, len: 2 })
        );
        assert!(array.get("x").unwrap_err().is_unsupported());
    }

    #[test]
    fn copy_on_write() {
        let shared = Value::list([1, 2]);
        let mut list = SequenceAccessor::new(shared.clone());
        list.set_index(0, Value::from(9)).unwrap();
        assert_eq!(shared, Value::list([1, 2]));
        assert_eq!(list.value(), &Value::list([9, 2]));
    }

    #[test]
    fn sets_append_only() {
        let mut set = SequenceAccessor::new(Value::set(["a"]));
        set.set_index(1, Value::from("b")).unwrap();
        assert_eq!(set.get_index(1).unwrap(), Some(Value::from("b")));
        assert!(set.set_index(0, Value::from("c")).unwrap_err().is_unsupported());
        assert_eq!(set.key_set().unwrap(), ["[0]", "[1]"]);
    }
}
