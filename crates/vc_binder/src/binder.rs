use core::fmt;
use std::sync::Arc;

use vc_access::{AccessorProviders, Object, Value};
use vc_path::{DEFAULT_SEPARATOR, Path, PathParser};
use vc_types::{SequenceKind, StructKind, TypeFactory, TypeKind};

use crate::binders::{BinderTable, DataBinder};
use crate::{BindContext, BindError, BindHandler, BindResult, Bindable};
use crate::{ConversionService, DefaultConversionService, PlaceholderHandler};

// -----------------------------------------------------------------------------
// BindStrategy

/// What a bind does with a structured source where a scalar is expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BindStrategy {
    /// Bind it again after its own runtime type, down to the leaves.
    #[default]
    Deep,
    /// Leave it unbound and report it through
    /// [`on_unbound`](BindHandler::on_unbound).
    Shallow,
}

// -----------------------------------------------------------------------------
// Binder

/// Binds a [`Value`] tree onto declared types.
///
/// A binder is immutable once built and can be shared between threads.
/// Every call gets its own [`BindContext`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::Value;
/// use vc_binder::{Bindable, Binder};
/// use vc_types::{TypeFactory, TypeRegistry};
///
/// let factory = Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())));
/// let binder = Binder::new(factory.clone());
///
/// let source = Value::map([("ports", Value::list(["80", "443"]))]);
/// let target = Bindable::of(factory.parse("List<u16>").unwrap());
///
/// let ports = binder.bind("ports", &target, &source).unwrap();
/// assert_eq!(ports.into_value(), Some(Value::list([80, 443])));
/// ```
pub struct Binder {
    factory: Arc<TypeFactory>,
    providers: AccessorProviders,
    table: BinderTable,
    handler: Arc<dyn BindHandler>,
    conversion: Arc<dyn ConversionService>,
    strategy: BindStrategy,
    parser: PathParser,
}

impl Binder {
    /// A binder with the builtin binders, placeholder resolution and the
    /// default conversions.
    #[inline]
    pub fn new(factory: Arc<TypeFactory>) -> Self {
        Self::builder(factory).build()
    }

    #[inline]
    pub fn builder(factory: Arc<TypeFactory>) -> BinderBuilder {
        BinderBuilder::new(factory)
    }

    #[inline]
    pub fn factory(&self) -> &Arc<TypeFactory> {
        &self.factory
    }

    #[inline]
    pub fn providers(&self) -> &AccessorProviders {
        &self.providers
    }

    #[inline]
    pub fn table(&self) -> &BinderTable {
        &self.table
    }

    #[inline]
    pub fn handler(&self) -> &dyn BindHandler {
        &*self.handler
    }

    #[inline]
    pub fn conversion(&self) -> &dyn ConversionService {
        &*self.conversion
    }

    #[inline]
    pub fn strategy(&self) -> BindStrategy {
        self.strategy
    }

    #[inline]
    pub fn parser(&self) -> &PathParser {
        &self.parser
    }

    /// Binds `target` from the value of `source` at `name`.
    ///
    /// An empty `name` binds the whole source.
    #[inline]
    pub fn bind(
        &self,
        name: &str,
        target: &Bindable,
        source: &Value,
    ) -> Result<BindResult, BindError> {
        self.bind_path(&Path::parse_with(&self.parser, name), target, source)
    }

    pub fn bind_path(
        &self,
        path: &Path,
        target: &Bindable,
        source: &Value,
    ) -> Result<BindResult, BindError> {
        BindContext::new(self, source).bind(path, target)
    }

    /// Like [`bind`](Self::bind), but with nothing bound returns the target
    /// instance, or a new empty one.
    ///
    /// Records can not be created empty and fail with
    /// [`BindError::IllegalArgument`]. Scalars fall back to [`Value::Null`].
    pub fn bind_or_create(
        &self,
        name: &str,
        target: &Bindable,
        source: &Value,
    ) -> Result<Value, BindError> {
        match self.bind(name, target, source)?.into_value() {
            Some(value) => Ok(value),
            None => self.create(target),
        }
    }

    fn create(&self, target: &Bindable) -> Result<Value, BindError> {
        if let Some(value) = target.value() {
            return Ok(value);
        }
        let ty = target.ty();
        Ok(match self.factory.kind(ty) {
            TypeKind::Struct(StructKind::Bean) => {
                let info = self
                    .factory
                    .raw_class(ty)
                    .and_then(|id| self.factory.registry().class(id))
                    .ok_or_else(|| BindError::IllegalArgument(self.factory.display(ty)))?;
                match Object::instantiate(info) {
                    Ok(object) => Value::Object(object),
                    Err(vc_access::AccessError::IllegalArgument(message)) => {
                        return Err(BindError::IllegalArgument(message));
                    }
                    Err(error) => return Err(error.into()),
                }
            }
            TypeKind::Struct(StructKind::Record) => {
                return Err(BindError::IllegalArgument(format!(
                    "cannot create the record `{}` without its components",
                    self.factory.display(ty)
                )));
            }
            TypeKind::Array => Value::Array(Arc::from(Vec::new())),
            TypeKind::Sequence(SequenceKind::List) => Value::List(Arc::default()),
            TypeKind::Sequence(SequenceKind::Set) => Value::Set(Arc::default()),
            TypeKind::Map => Value::Map(Arc::default()),
            TypeKind::Scalar(_) | TypeKind::Enum | TypeKind::Unknown => Value::Null,
        })
    }

    /// Binds `target` at `name` and deserializes the result into `T`.
    ///
    /// The declared type drives the bind, `T` only shapes the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use serde::Deserialize;
    /// use vc_access::Value;
    /// use vc_binder::{Bindable, Binder};
    /// use vc_types::{TypeFactory, TypeRegistry};
    ///
    /// #[derive(Deserialize, Debug, PartialEq)]
    /// struct Limits {
    ///     max: u32,
    /// }
    ///
    /// let factory = Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())));
    /// let binder = Binder::new(factory.clone());
    /// let source = Value::map([("limits", Value::map([("max", "${default}")])), ("default", Value::from("8"))]);
    ///
    /// let target = Bindable::of(factory.parse("Map<String, u32>").unwrap());
    /// let limits: Option<Limits> = binder.bind_typed("limits", &target, &source).unwrap();
    /// assert_eq!(limits, Some(Limits { max: 8 }));
    /// ```
    #[cfg(feature = "serde")]
    pub fn bind_typed<T: serde_core::de::DeserializeOwned>(
        &self,
        name: &str,
        target: &Bindable,
        source: &Value,
    ) -> Result<Option<T>, BindError> {
        match self.bind(name, target, source)?.into_value() {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("binders", &self.table)
            .field("providers", &self.providers.names().collect::<Vec<_>>())
            .field("strategy", &self.strategy)
            .field("separator", &self.parser.separator())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BinderBuilder

/// Configures a [`Binder`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::Value;
/// use vc_binder::{BindStrategy, Bindable, Binder, NoopHandler};
/// use vc_types::{TypeFactory, TypeRegistry, builtin};
///
/// let factory = Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())));
/// let binder = Binder::builder(factory.clone())
///     .separator('/')
///     .handler(NoopHandler)
///     .strategy(BindStrategy::Shallow)
///     .build();
///
/// let source = Value::map([("a", Value::map([("b", "${x}")]))]);
/// let b = binder.bind("a/b", &Bindable::of(factory.of_class(builtin::STRING)), &source).unwrap();
/// assert_eq!(b.into_value(), Some(Value::from("${x}")));
/// ```
pub struct BinderBuilder {
    factory: Arc<TypeFactory>,
    providers: Option<AccessorProviders>,
    table: BinderTable,
    handler: Option<Arc<dyn BindHandler>>,
    conversion: Option<Arc<dyn ConversionService>>,
    strategy: BindStrategy,
    separator: char,
}

impl BinderBuilder {
    fn new(factory: Arc<TypeFactory>) -> Self {
        Self {
            factory,
            providers: None,
            table: BinderTable::new(),
            handler: None,
            conversion: None,
            strategy: BindStrategy::default(),
            separator: DEFAULT_SEPARATOR,
        }
    }

    #[inline]
    pub fn strategy(mut self, strategy: BindStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replaces the default [`PlaceholderHandler`].
    #[inline]
    pub fn handler(mut self, handler: impl BindHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    #[inline]
    pub fn conversion(mut self, conversion: impl ConversionService + 'static) -> Self {
        self.conversion = Some(Arc::new(conversion));
        self
    }

    /// Replaces the builtin accessor providers.
    #[inline]
    pub fn providers(mut self, providers: AccessorProviders) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Registers a custom binder next to the builtin ones.
    #[inline]
    pub fn binder(mut self, binder: impl DataBinder + 'static) -> Self {
        self.table.register(binder);
        self
    }

    /// The character between path segments, `.` by default.
    #[inline]
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn build(self) -> Binder {
        let providers = self
            .providers
            .unwrap_or_else(|| AccessorProviders::new(self.factory.clone()));
        Binder {
            providers,
            table: self.table,
            handler: self
                .handler
                .unwrap_or_else(|| Arc::new(PlaceholderHandler::default())),
            conversion: self
                .conversion
                .unwrap_or_else(|| Arc::new(DefaultConversionService)),
            strategy: self.strategy,
            parser: PathParser::new(self.separator),
            factory: self.factory,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use vc_access::Value;
    use vc_path::Path;
    use vc_types::{ClassBuilder, PropertyInfo, TypeExpr, TypeFactory, TypeRegistry, builtin};

    use crate::{BindContext, BindError, BindHandler, BindResult, Bindable, Binder, NoopHandler};

    fn factory() -> Arc<TypeFactory> {
        Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())))
    }

    /// Falls back to `-1` on any failure and counts bound values.
    #[derive(Default)]
    struct Recovering {
        bound: AtomicUsize,
    }

    impl BindHandler for Recovering {
        fn on_bound(&self, _: &Path, _: &Bindable, _: &BindContext<'_>, _: &Value) {
            self.bound.fetch_add(1, Ordering::Relaxed);
        }

        fn on_failure(
            &self,
            _: &Path,
            _: &Bindable,
            _: &BindContext<'_>,
            _: BindError,
        ) -> Result<BindResult, BindError> {
            Ok(BindResult::of(Value::from(-1)))
        }
    }

    /// Reads everything below `app`.
    struct Prefixed;

    impl BindHandler for Prefixed {
        fn on_key_created(&self, path: Path, _: &BindContext<'_>) -> Path {
            match path.entries().get(0) {
                Some("app") => path,
                _ => Path::parse("app").join(&path),
            }
        }
    }

    #[test]
    fn failures_reach_the_caller_wrapped() {
        let factory = factory();
        let binder = Binder::new(factory.clone());
        let source = Value::map([("n", "many")]);
        let err = binder
            .bind("n", &Bindable::of(factory.of_class(builtin::U8)), &source)
            .unwrap_err();
        let BindError::Failure { path, target, .. } = &err else {
            panic!("expected a failure, got {err:?}");
        };
        assert_eq!((path.as_str(), target.as_str()), ("n", "u8"));
        assert!(matches!(err.root_cause(), BindError::Conversion(_)));
    }

    #[test]
    fn handler_can_recover() {
        let factory = factory();
        let binder = Binder::builder(factory.clone())
            .handler(Recovering::default())
            .build();
        let source = Value::map([("list", Value::list(["1", "x", "3"]))]);
        let list = binder
            .bind("list", &Bindable::of(factory.parse("List<i32>").unwrap()), &source)
            .unwrap();
        assert_eq!(list.into_value(), Some(Value::list([1, -1, 3])));
    }

    #[test]
    fn keys_can_be_rewritten() {
        let factory = factory();
        let binder = Binder::builder(factory.clone()).handler(Prefixed).build();
        let source = Value::map([("app", Value::map([("name", "demo")]))]);
        let name = binder
            .bind("name", &Bindable::of(factory.of_class(builtin::STRING)), &source)
            .unwrap();
        assert_eq!(name.into_value(), Some(Value::from("demo")));
    }

    #[test]
    fn bind_or_create_falls_back() {
        let mut registry = TypeRegistry::new();
        let config = registry
            .register(
                ClassBuilder::bean("Config")
                    .property(PropertyInfo::new("debug", TypeExpr::class(builtin::BOOL))),
            )
            .unwrap();
        let factory = Arc::new(TypeFactory::new(Arc::new(registry)));
        let binder = Binder::new(factory.clone());
        let empty = Value::map(Vec::<(Value, Value)>::new());

        let created = binder
            .bind_or_create("config", &Bindable::of(factory.of_class(config)), &empty)
            .unwrap();
        assert!(matches!(created, Value::Object(ref o) if o.class() == config && o.len() == 0));

        let list = binder
            .bind_or_create("xs", &Bindable::of(factory.parse("List<i32>").unwrap()), &empty)
            .unwrap();
        assert_eq!(list, Value::list(Vec::<Value>::new()));

        let scalar = binder
            .bind_or_create("x", &Bindable::of(factory.of_class(builtin::I32)), &empty)
            .unwrap();
        assert!(scalar.is_null());
    }

    #[test]
    fn shared_between_threads() {
        let factory = factory();
        let binder = Arc::new(Binder::builder(factory.clone()).handler(NoopHandler).build());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let binder = binder.clone();
                let ty = factory.of_class(builtin::I64);
                thread::spawn(move || {
                    let source = Value::map([("n", Value::from(i.to_string()))]);
                    binder.bind("n", &Bindable::of(ty), &source).unwrap().into_value()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(Value::from(i as i64)));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn typed_results() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Server {
            host: String,
            ports: Vec<u16>,
        }

        let factory = factory();
        let binder = Binder::new(factory.clone());
        let source: Value = serde_json::from_str(
            r#"{ "server": { "host": "${name}.local", "ports": [80, 443] }, "name": "web" }"#,
        )
        .unwrap();
        let target = Bindable::of(factory.of_class(builtin::OBJECT));

        let server: Option<Server> = binder.bind_typed("server", &target, &source).unwrap();
        assert_eq!(
            server,
            Some(Server {
                host: "web.local".into(),
                ports: vec![80, 443],
            })
        );
        let missing: Option<Server> = binder.bind_typed("client", &target, &source).unwrap();
        assert_eq!(missing, None);
    }
}
