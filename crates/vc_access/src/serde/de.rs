use core::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde_core::de::value::{MapAccessDeserializer, MapDeserializer, SeqDeserializer};
use serde_core::de::{self, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer, forward_to_deserialize_any};
use thiserror::Error;

use crate::Value;

// -----------------------------------------------------------------------------
// ValueError

/// Error of deserializing a type out of a [`Value`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValueError(String);

impl de::Error for ValueError {
    #[cold]
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any value")
    }

    #[inline]
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    #[inline]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    #[inline]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    #[inline]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    #[inline]
    fn visit_char<E: de::Error>(self, v: char) -> Result<Value, E> {
        Ok(Value::Char(v))
    }

    #[inline]
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Str(v.to_owned()))
    }

    #[inline]
    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Str(v))
    }

    #[inline]
    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(Arc::new(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = map.next_entry::<Value, Value>()? {
            entries.insert(key, value);
        }
        Ok(Value::Map(Arc::new(entries)))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

// -----------------------------------------------------------------------------
// Deserializer

fn visit_seq<'de, V: Visitor<'de>>(
    items: impl Iterator<Item = Value>,
    visitor: V,
) -> Result<V::Value, ValueError> {
    let mut seq = SeqDeserializer::<_, ValueError>::new(items);
    let value = visitor.visit_seq(&mut seq)?;
    seq.end()?;
    Ok(value)
}

fn visit_map<'de, V: Visitor<'de>>(
    entries: impl Iterator<Item = (Value, Value)>,
    visitor: V,
) -> Result<V::Value, ValueError> {
    let mut map = MapDeserializer::<_, ValueError>::new(entries);
    let value = visitor.visit_map(&mut map)?;
    map.end()?;
    Ok(value)
}

fn fields<'a>(
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
) -> impl Iterator<Item = (Value, Value)> {
    entries.map(|(k, v)| (Value::from(k), v.clone()))
}

fn set_items(items: &IndexSet<Value>) -> impl Iterator<Item = Value> + '_ {
    items.iter().cloned()
}

impl<'de> Deserializer<'de> for Value {
    type Error = ValueError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::UInt(u) => visitor.visit_u64(u),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Char(c) => visitor.visit_char(c),
            Value::Str(s) => visitor.visit_string(s),
            Value::Enum(e) => visitor.visit_str(e.variant()),
            Value::Class(id) => visitor.visit_string(id.to_string()),
            Value::Array(items) => visit_seq(items.iter().cloned(), visitor),
            Value::List(items) => visit_seq(items.iter().cloned(), visitor),
            Value::Set(items) => visit_seq(set_items(&items), visitor),
            Value::Map(map) => visit_map(map.iter().map(|(k, v)| (k.clone(), v.clone())), visitor),
            Value::Object(object) => visit_map(fields(object.fields()), visitor),
            Value::Record(record) => visit_map(fields(record.components()), visitor),
            Value::Properties(view) => view.to_value().deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        match self {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        visitor.visit_newtype_struct(self)
    }

    /// Unit variants come from strings, other variants from a map with a
    /// single entry keyed by the variant name.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        match self {
            Value::Str(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Enum(e) => visitor.visit_enum(e.variant().to_owned().into_deserializer()),
            Value::Map(map) if map.len() == 1 => {
                let entries = map.iter().map(|(k, v)| (k.clone(), v.clone()));
                visitor.visit_enum(MapAccessDeserializer::new(MapDeserializer::new(entries)))
            }
            other => Err(de::Error::custom(format!(
                "expected enum `{name}`, found a {} value",
                other.type_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, ValueError> for Value {
    type Deserializer = Value;

    #[inline]
    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use vc_types::{ClassBuilder, TypeRegistry};

    use crate::{Object, Value};

    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Fast,
        Safe,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        port: u16,
        mode: Mode,
        tags: Vec<String>,
        limit: Option<u32>,
    }

    #[test]
    fn json_into_values() {
        let value: Value = serde_json::from_str(r#"{"a":[1,-2,3.5],"b":null,"c":true}"#).unwrap();
        assert_eq!(
            value,
            Value::map([
                ("a", Value::list([Value::from(1), Value::from(-2), Value::from(3.5)])),
                ("b", Value::Null),
                ("c", Value::from(true)),
            ])
        );
    }

    #[test]
    fn values_into_structs() {
        let value = Value::map([
            ("name", Value::from("svc")),
            ("port", Value::from(80)),
            ("mode", Value::from("safe")),
            ("tags", Value::set(["x"])),
            ("limit", Value::Null),
        ]);
        let config = Config::deserialize(value).unwrap();
        assert_eq!(
            config,
            Config {
                name: "svc".into(),
                port: 80,
                mode: Mode::Safe,
                tags: vec!["x".into()],
                limit: None,
            }
        );
    }

    #[test]
    fn objects_into_structs() {
        #[derive(Deserialize)]
        struct Person {
            age: u8,
        }

        let mut registry = TypeRegistry::new();
        let class = registry.register(ClassBuilder::bean("Person")).unwrap();
        let object = Value::Object(Object::new(class).with_field("age", 30));
        let person = Person::deserialize(object).unwrap();
        assert_eq!(person.age, 30);
    }

    #[test]
    fn out_of_range() {
        let err = u8::deserialize(Value::from(300)).unwrap_err();
        assert!(err.to_string().contains("300"));
        assert!(Mode::deserialize(Value::from(1)).is_err());
        assert_eq!(Mode::deserialize(Value::from("fast")).unwrap(), Mode::Fast);
    }
}
