use serde_core::{Serialize, Serializer};

use crate::Value;

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Enum(e) => serializer.serialize_str(e.variant()),
            Value::Class(id) => serializer.collect_str(id),
            Value::Array(items) => serializer.collect_seq(items.iter()),
            Value::List(items) => serializer.collect_seq(items.iter()),
            Value::Set(items) => serializer.collect_seq(items.iter()),
            Value::Map(map) => serializer.collect_map(map.iter()),
            Value::Object(object) => serializer.collect_map(object.fields()),
            Value::Record(record) => serializer.collect_map(record.components()),
            Value::Properties(view) => view.to_value().serialize(serializer),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
