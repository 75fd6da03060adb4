use std::sync::Arc;

use super::index_key;
use crate::{AccessError, AccessKind, Accessor, PropertiesView, PropertyKey, Value};

// -----------------------------------------------------------------------------
// MapAccessor

/// Accessor of a [`Value::Map`].
///
/// Names are looked up as string keys first, then as integer keys when
/// they are numeric. Positions are looked up the other way around.
#[derive(Debug, Clone)]
pub struct MapAccessor {
    value: Value,
}

impl MapAccessor {
    #[inline]
    pub fn new(value: Value) -> Self {
        debug_assert!(matches!(value, Value::Map(_)));
        Self { value }
    }

    fn lookup(&self, key: &Value) -> Option<Value> {
        match &self.value {
            Value::Map(map) => map.get(key).cloned(),
            _ => None,
        }
    }
}

impl Accessor for MapAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Map
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
        let found = self.lookup(&Value::Str(name.into())).or_else(|| {
            name.parse::<i64>()
                .ok()
                .and_then(|i| self.lookup(&Value::Int(i)))
        });
        Ok(found)
    }

    fn get_index(&self, index: usize) -> Result<Option<Value>, AccessError> {
        let found = self
            .lookup(&Value::from(index as u64))
            .or_else(|| self.lookup(&Value::Str(index.to_string())));
        Ok(found)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        if let Value::Map(map) = &mut self.value {
            Arc::make_mut(map).insert(Value::Str(name.into()), value);
        }
        Ok(())
    }

    fn set_index(&mut self, index: usize, value: Value) -> Result<(), AccessError> {
        if let Value::Map(map) = &mut self.value {
            Arc::make_mut(map).insert(Value::from(index as u64), value);
        }
        Ok(())
    }

    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Ok(match &self.value {
            Value::Map(map) => map.keys().map(ToString::to_string).collect(),
            _ => Vec::new(),
        })
    }
}

// -----------------------------------------------------------------------------
// PropertyAccessor

/// Read-only accessor of a [`PropertiesView`].
///
/// Looking up a member returns its leaf string, or the nested view when
/// there is no leaf but more keys below.
#[derive(Debug, Clone)]
pub struct PropertyAccessor {
    value: Value,
}

impl PropertyAccessor {
    #[inline]
    pub fn new(value: Value) -> Self {
        debug_assert!(matches!(value, Value::Properties(_)));
        Self { value }
    }

    fn view(&self) -> Option<&PropertiesView> {
        match &self.value {
            Value::Properties(view) => Some(view),
            _ => None,
        }
    }
}

impl Accessor for PropertyAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Properties
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
        Ok(self.view().and_then(|view| view.child(name).resolve()))
    }

    fn get_index(&self, index: usize) -> Result<Option<Value>, AccessError> {
        Ok(self.view().and_then(|view| view.child_index(index).resolve()))
    }

    fn set(&mut self, _: &str, _: Value) -> Result<(), AccessError> {
        Err(AccessError::Immutable(AccessKind::Properties))
    }

    fn set_index(&mut self, _: usize, _: Value) -> Result<(), AccessError> {
        Err(AccessError::Immutable(AccessKind::Properties))
    }

    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        let Some(view) = self.view() else {
            return Ok(Vec::new());
        };
        Ok(view
            .children()
            .into_iter()
            .map(|key| match key {
                PropertyKey::Name(name) => name,
                PropertyKey::Index(index) => index_key(index),
            })
            .collect())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{AccessError, AccessKind, Accessor, MapAccessor, MapPropertySource};
    use crate::{PropertiesView, PropertyAccessor, Value};

    #[test]
    fn string_and_integer_keys() {
        let map = MapAccessor::new(Value::map([
            (Value::from("a"), Value::from(1)),
            (Value::from(2), Value::from("two")),
            (Value::from("3"), Value::from("three")),
        ]));
        assert_eq!(map.get("a").unwrap(), Some(Value::from(1)));
        assert_eq!(map.get("2").unwrap(), Some(Value::from("two")));
        assert_eq!(map.get_index(2).unwrap(), Some(Value::from("two")));
        assert_eq!(map.get_index(3).unwrap(), Some(Value::from("three")));
        assert_eq!(map.get("missing").unwrap(), None);
        assert_eq!(map.key_set().unwrap(), ["a", "2", "3"]);
    }

    #[test]
    fn map_writes() {
        let mut map = MapAccessor::new(Value::map([("a", 1)]));
        map.set("b", Value::from(2)).unwrap();
        assert_eq!(Box::new(map).into_value(), Value::map([("a", 1), ("b", 2)]));
    }

    #[test]
    fn properties() {
        let view = PropertiesView::new(Arc::new(MapPropertySource::new(
            "env",
            [("list[0]", "x"), ("list[1]", "y"), ("a.b", "c")],
        )));
        let mut root = PropertyAccessor::new(Value::Properties(view));
        assert_eq!(root.key_set().unwrap(), ["list", "a"]);

        let list = root.get("list").unwrap().unwrap();
        let list = PropertyAccessor::new(list);
        assert_eq!(list.key_set().unwrap(), ["[0]", "[1]"]);
        assert_eq!(list.get_index(1).unwrap(), Some(Value::from("y")));
        assert_eq!(
            root.set("a", Value::Null),
            Err(AccessError::Immutable(AccessKind::Properties))
        );
    }
}
