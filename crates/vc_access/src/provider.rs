use core::fmt;
use std::sync::Arc;

use vc_path::{Entries, SegmentKind};
use vc_types::TypeFactory;

use crate::{AccessError, Accessor, ArrayAccessor, BeanAccessor, MapAccessor, NullAccessor};
use crate::{PropertyAccessor, RecordAccessor, ScalarAccessor, SequenceAccessor, Value};

// -----------------------------------------------------------------------------
// AccessorProvider

/// Creates the [`Accessor`] of the values it supports.
///
/// Providers are tried from the highest [`priority`](Self::priority) down;
/// the first one whose [`supports`](Self::supports) returns `true` wins.
pub trait AccessorProvider: Send + Sync {
    /// A name for diagnostics.
    fn name(&self) -> &str;

    fn priority(&self) -> i32;

    fn supports(&self, value: &Value) -> bool;

    fn create(&self, value: Value, factory: &Arc<TypeFactory>) -> Box<dyn Accessor>;
}

macro_rules! builtin_provider {
    ($name:ident, $label:literal, $priority:literal, |$v:ident| $supports:expr, |$value:ident, $factory:ident| $create:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        struct $name;

        impl AccessorProvider for $name {
            #[inline]
            fn name(&self) -> &str {
                $label
            }

            #[inline]
            fn priority(&self) -> i32 {
                $priority
            }

            #[inline]
            fn supports(&self, $v: &Value) -> bool {
                $supports
            }

            #[inline]
            #[allow(unused_variables)]
            fn create(&self, $value: Value, $factory: &Arc<TypeFactory>) -> Box<dyn Accessor> {
                Box::new($create)
            }
        }
    };
}

builtin_provider!(NullProvider, "null", 400, |v| v.is_null(), |value, factory| NullAccessor::new());
builtin_provider!(
    ScalarProvider,
    "scalar",
    300,
    |v| v.is_scalar(),
    |value, factory| ScalarAccessor::new(value)
);
builtin_provider!(
    ArrayProvider,
    "array",
    250,
    |v| matches!(v, Value::Array(_)),
    |value, factory| ArrayAccessor::new(value)
);
builtin_provider!(
    SequenceProvider,
    "sequence",
    240,
    |v| matches!(v, Value::List(_) | Value::Set(_)),
    |value, factory| SequenceAccessor::new(value)
);
builtin_provider!(
    MapProvider,
    "map",
    220,
    |v| matches!(v, Value::Map(_)),
    |value, factory| MapAccessor::new(value)
);
builtin_provider!(
    PropertiesProvider,
    "properties",
    210,
    |v| matches!(v, Value::Properties(_)),
    |value, factory| PropertyAccessor::new(value)
);
builtin_provider!(
    RecordProvider,
    "record",
    200,
    |v| matches!(v, Value::Record(_)),
    |value, factory| RecordAccessor::new(value, factory.clone())
);
builtin_provider!(
    BeanProvider,
    "bean",
    0,
    |v| matches!(v, Value::Object(_)),
    |value, factory| BeanAccessor::new(value, factory.clone())
);

// -----------------------------------------------------------------------------
// AccessorProviders

/// A priority-ordered table of [`AccessorProvider`]s.
///
/// [`new`](Self::new) installs a provider for every [`Value`] variant;
/// custom providers registered with a higher priority take precedence.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::{AccessorProviders, Value};
/// use vc_path::Path;
/// use vc_types::{TypeFactory, TypeRegistry};
///
/// let providers = AccessorProviders::new(Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new()))));
/// let data = Value::map([("servers", Value::list([Value::map([("port", 80)])]))]);
///
/// let port = providers.navigate(&data, Path::parse("servers[0].port").entries()).unwrap();
/// assert_eq!(port, Some(Value::from(80)));
///
/// let missing = providers.navigate(&data, Path::parse("servers[3].port").entries()).unwrap();
/// assert_eq!(missing, None);
/// ```
#[derive(Clone)]
pub struct AccessorProviders {
    factory: Arc<TypeFactory>,
    providers: Vec<Arc<dyn AccessorProvider>>,
}

impl AccessorProviders {
    /// A table with every builtin provider.
    pub fn new(factory: Arc<TypeFactory>) -> Self {
        Self::empty(factory)
            .with(NullProvider)
            .with(ScalarProvider)
            .with(ArrayProvider)
            .with(SequenceProvider)
            .with(MapProvider)
            .with(PropertiesProvider)
            .with(RecordProvider)
            .with(BeanProvider)
    }

    /// A table with no provider at all.
    #[inline]
    pub fn empty(factory: Arc<TypeFactory>) -> Self {
        Self {
            factory,
            providers: Vec::new(),
        }
    }

    /// Adds a provider after every provider of the same or higher priority.
    pub fn register(&mut self, provider: impl AccessorProvider + 'static) {
        let priority = provider.priority();
        let at = self
            .providers
            .iter()
            .position(|p| p.priority() < priority)
            .unwrap_or(self.providers.len());
        self.providers.insert(at, Arc::new(provider));
    }

    #[inline]
    pub fn with(mut self, provider: impl AccessorProvider + 'static) -> Self {
        self.register(provider);
        self
    }

    #[inline]
    pub fn factory(&self) -> &Arc<TypeFactory> {
        &self.factory
    }

    /// Provider names, in the order they are tried.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }

    /// Wraps `value` in the accessor of the first supporting provider.
    pub fn accessor(&self, value: Value) -> Result<Box<dyn Accessor>, AccessError> {
        match self.providers.iter().find(|p| p.supports(&value)) {
            Some(provider) => Ok(provider.create(value, &self.factory)),
            None => Err(AccessError::NoProvider(value.type_name())),
        }
    }

    /// Follows `path` from `root`, one accessor per segment.
    ///
    /// Indexed segments holding a number are looked up by position, every
    /// other segment by name. A missing member anywhere along the way is
    /// `Ok(None)`, and so is a corrupted segment. Walking into a value of
    /// the wrong shape fails with [`AccessError::Unsupported`].
    pub fn navigate(&self, root: &Value, path: &Entries) -> Result<Option<Value>, AccessError> {
        let mut current = root.clone();
        for segment in path.iter() {
            if segment.kind().contains(SegmentKind::CORRUPTED) {
                return Ok(None);
            }
            let accessor = self.accessor(current)?;
            let next = match (segment.is_indexed(), segment.index()) {
                (true, Some(index)) => accessor.get_index(index)?,
                _ => accessor.get(segment.content())?,
            };
            match next {
                Some(value) => current = value,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl fmt::Debug for AccessorProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorProviders")
            .field("providers", &self.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_path::Path;
    use vc_types::{TypeFactory, TypeRegistry};

    use super::AccessorProvider;
    use crate::{AccessError, AccessKind, Accessor, AccessorProviders, ScalarAccessor, Value};

    fn providers() -> AccessorProviders {
        AccessorProviders::new(Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new()))))
    }

    struct Shouting;

    impl AccessorProvider for Shouting {
        fn name(&self) -> &str {
            "shouting"
        }

        fn priority(&self) -> i32 {
            1000
        }

        fn supports(&self, value: &Value) -> bool {
            matches!(value, Value::Str(_))
        }

        fn create(&self, value: Value, _: &Arc<TypeFactory>) -> Box<dyn Accessor> {
            let upper = value.as_str().map(str::to_uppercase).unwrap_or_default();
            Box::new(ScalarAccessor::new(Value::from(upper)))
        }
    }

    #[test]
    fn builtin_order() {
        let names: Vec<_> = providers().names().map(str::to_owned).collect();
        assert_eq!(
            names,
            ["null", "scalar", "array", "sequence", "map", "properties", "record", "bean"]
        );
    }

    #[test]
    fn custom_providers_take_precedence() {
        let providers = providers().with(Shouting);
        let accessor = providers.accessor(Value::from("hi")).unwrap();
        assert_eq!(accessor.value(), &Value::from("HI"));
        assert_eq!(providers.accessor(Value::from(1)).unwrap().kind(), AccessKind::Scalar);
    }

    #[test]
    fn empty_table() {
        let providers =
            AccessorProviders::empty(Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new()))));
        assert_eq!(
            providers.accessor(Value::Null).err(),
            Some(AccessError::NoProvider("null"))
        );
    }

    #[test]
    fn navigation() {
        let providers = providers();
        let data = Value::map([
            ("a.b", Value::from(1)),
            ("list", Value::list([Value::map([("x", 2)])])),
            ("name", Value::from("n")),
        ]);
        let at = |path: &str| providers.navigate(&data, Path::parse(path).entries());

        assert_eq!(at("[a.b]").unwrap(), Some(Value::from(1)));
        assert_eq!(at("list[0].x").unwrap(), Some(Value::from(2)));
        assert_eq!(at("list[1].x").unwrap(), None);
        assert_eq!(at("").unwrap(), Some(data.clone()));
        assert_eq!(at("a]b").unwrap(), None);
        assert!(at("name.first").unwrap_err().is_unsupported());
    }
}
