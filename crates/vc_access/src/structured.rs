use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use vc_types::hash::fixed_hash;
use vc_types::{ClassId, ClassInfo, ClassKind, TypeExpression, TypeFactory};

use crate::{AccessError, Value};

// -----------------------------------------------------------------------------
// Object

/// An instance of a bean class: property values by name.
///
/// Properties that were never set are absent rather than null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    class: ClassId,
    fields: Arc<IndexMap<String, Value>>,
}

impl Object {
    /// An instance with no property set.
    #[inline]
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            fields: Arc::default(),
        }
    }

    /// Calls the no-arg constructor of `info`.
    pub fn instantiate(info: &ClassInfo) -> Result<Self, AccessError> {
        if info.kind() != ClassKind::Bean || !info.is_constructible() {
            return Err(AccessError::IllegalArgument(format!(
                "`{}` has no no-arg constructor",
                info.name()
            )));
        }
        Ok(Self::new(info.id()))
    }

    #[inline]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a property and returns the previous value.
    #[inline]
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        Arc::make_mut(&mut self.fields).insert(name.into(), value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.class.hash(state);
        let fields = self
            .fields
            .iter()
            .fold(0u64, |acc, entry| acc.wrapping_add(fixed_hash(&entry)));
        state.write_u64(fields);
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.class)?;
        for (index, (name, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

// -----------------------------------------------------------------------------
// Record

/// An instance of a record class, built once from all of its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    class: ClassId,
    components: Arc<[(String, Value)]>,
}

impl Record {
    /// Invokes the canonical constructor of the record `ty`.
    ///
    /// `args` must name every declared component exactly once, and each
    /// value must fit the component type as seen from `ty`. Violations are
    /// [`AccessError::IllegalArgument`] naming the offending component.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use indexmap::IndexMap;
    /// use vc_access::{Record, Value};
    /// use vc_types::{ClassBuilder, TypeExpr, TypeFactory, TypeRegistry, builtin};
    ///
    /// let mut registry = TypeRegistry::new();
    /// let point = registry.register(
    ///     ClassBuilder::record("Point")
    ///         .component("x", TypeExpr::class(builtin::I32))
    ///         .component("y", TypeExpr::class(builtin::I32)),
    /// ).unwrap();
    /// let factory = TypeFactory::new(Arc::new(registry));
    /// let ty = factory.of_class(point);
    ///
    /// let mut args = IndexMap::new();
    /// args.insert("y".to_string(), Value::from(2));
    /// args.insert("x".to_string(), Value::from(1));
    /// let record = Record::construct(&factory, &ty, args).unwrap();
    /// assert_eq!(record.get("x"), Some(&Value::from(1)));
    ///
    /// let mut args = IndexMap::new();
    /// args.insert("x".to_string(), Value::from(1));
    /// let err = Record::construct(&factory, &ty, args).unwrap_err();
    /// assert!(err.to_string().contains("`y`"));
    /// ```
    pub fn construct(
        factory: &TypeFactory,
        ty: &TypeExpression,
        mut args: IndexMap<String, Value>,
    ) -> Result<Self, AccessError> {
        let info = factory
            .raw_class(ty)
            .and_then(|id| factory.registry().class(id))
            .filter(|info| info.kind() == ClassKind::Record)
            .ok_or_else(|| {
                AccessError::IllegalArgument(format!("`{}` is not a record", factory.display(ty)))
            })?;

        if args.len() != info.components().len() {
            let message = match info.components().iter().find(|c| !args.contains_key(c.name())) {
                Some(missing) => {
                    format!("missing component `{}` of `{}`", missing.name(), info.name())
                }
                None => {
                    let unknown = args
                        .keys()
                        .find(|k| info.component(k).is_none())
                        .map_or("?", String::as_str);
                    format!("unknown component `{unknown}` of `{}`", info.name())
                }
            };
            return Err(AccessError::IllegalArgument(message));
        }

        let mut components = Vec::with_capacity(args.len());
        for component in info.components() {
            let Some(value) = args.shift_remove(component.name()) else {
                return Err(AccessError::IllegalArgument(format!(
                    "missing component `{}` of `{}`",
                    component.name(),
                    info.name()
                )));
            };
            let component_ty = factory.node(component.ty().clone(), Some(ty));
            if !value.is_instance_of(factory, &component_ty) {
                return Err(AccessError::IllegalArgument(format!(
                    "component `{}` of `{}` expects `{}`, found a {} value",
                    component.name(),
                    info.name(),
                    factory.display(&component_ty),
                    value.type_name(),
                )));
            }
            components.push((component.name().to_owned(), value));
        }

        Ok(Self {
            class: info.id(),
            components: components.into(),
        })
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Components in declaration order.
    pub fn components(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class)?;
        for (index, (name, value)) in self.components.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str(")")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;
    use vc_types::{ClassBuilder, TypeExpr, TypeFactory, TypeRegistry, builtin};

    use crate::{AccessError, Object, Record, Value};

    fn factory() -> (TypeFactory, vc_types::ClassId, vc_types::ClassId) {
        let mut registry = TypeRegistry::new();
        let pair = registry
            .register(
                ClassBuilder::record("Pair")
                    .param("T")
                    .component("left", TypeExpr::param("T"))
                    .component("right", TypeExpr::param("T")),
            )
            .unwrap();
        let person = registry.register(ClassBuilder::bean("Person")).unwrap();
        (TypeFactory::new(Arc::new(registry)), pair, person)
    }

    fn args(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn generic_components() {
        let (factory, pair, _) = factory();
        let ty = factory.of(TypeExpr::parameterized(pair, [TypeExpr::class(builtin::STRING)]));

        let record = Record::construct(
            &factory,
            &ty,
            args(&[("left", "a".into()), ("right", "b".into())]),
        )
        .unwrap();
        assert_eq!(record.components().map(|(k, _)| k).collect::<Vec<_>>(), ["left", "right"]);

        let err = Record::construct(
            &factory,
            &ty,
            args(&[("left", "a".into()), ("right", 1.into())]),
        )
        .unwrap_err();
        assert!(matches!(&err, AccessError::IllegalArgument(m) if m.contains("`right`")));
    }

    #[test]
    fn component_count() {
        let (factory, pair, _) = factory();
        let ty = factory.of_class(pair);

        let err = Record::construct(
            &factory,
            &ty,
            args(&[("left", 1.into()), ("right", 2.into()), ("extra", 3.into())]),
        )
        .unwrap_err();
        assert!(matches!(&err, AccessError::IllegalArgument(m) if m.contains("`extra`")));
    }

    #[test]
    fn not_a_record() {
        let (factory, _, person) = factory();
        let err = Record::construct(&factory, &factory.of_class(person), IndexMap::new());
        assert!(matches!(err, Err(AccessError::IllegalArgument(_))));
    }

    #[test]
    fn objects() {
        let (factory, pair, person) = factory();
        let info = factory.registry().class(person).unwrap();
        let ann = Object::instantiate(info).unwrap().with_field("name", "Ann");
        let copy = ann.clone().with_field("age", 30);

        assert_eq!(ann.len(), 1);
        assert_eq!(copy.get("age"), Some(&Value::from(30)));
        assert!(Object::instantiate(factory.registry().class(pair).unwrap()).is_err());
    }
}
