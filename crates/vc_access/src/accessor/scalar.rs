use crate::{AccessError, AccessKind, Accessor, Value};

// -----------------------------------------------------------------------------
// NullAccessor

/// Accessor of [`Value::Null`]: every lookup finds nothing.
#[derive(Debug, Default, Clone)]
pub struct NullAccessor {
    value: Value,
}

impl NullAccessor {
    #[inline]
    pub fn new() -> Self {
        Self { value: Value::Null }
    }
}

impl Accessor for NullAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Null
    }

    #[inline]
    fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    fn into_value(self: Box<Self>) -> Value {
        self.value
    }

    #[inline]
    fn get(&self, _: &str) -> Result<Option<Value>, AccessError> {
        Ok(None)
    }

    #[inline]
    fn get_index(&self, _: usize) -> Result<Option<Value>, AccessError> {
        Ok(None)
    }

    #[inline]
    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Ok(Vec::new())
    }
}

// -----------------------------------------------------------------------------
// ScalarAccessor

/// Accessor of a leaf value. It has no members at all.
#[derive(Debug, Clone)]
pub struct ScalarAccessor {
    value: Value,
}

impl ScalarAccessor {
    #[inline]
    pub fn new(value: Value) -> Self {
        debug_assert!(value.is_scalar());
        Self { value }
    }
}

impl Accessor for ScalarAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Scalar
    }

    #[inline]
    fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    fn into_value(self: Box<Self>) -> Value {
        self.value
    }
}
