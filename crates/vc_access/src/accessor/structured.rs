use std::sync::Arc;

use vc_types::{ClassKind, MAX_DEPTH, TypeExpression, TypeFactory};

use crate::{AccessError, AccessKind, Accessor, Value};

// -----------------------------------------------------------------------------
// PropertyDescriptor

/// A declared member of a bean or a record, with its type resolved in the
/// context of the inspected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: String,
    /// The path segment the member is bound from.
    pub path_name: String,
    pub ty: TypeExpression,
    pub writable: bool,
    pub required: bool,
}

/// The properties of the bean type `ty`, including inherited ones.
///
/// A subclass declaration hides a superclass property of the same name.
/// Subclass properties come first.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::bean_properties;
/// use vc_types::{ClassBuilder, PropertyInfo, TypeExpr, TypeFactory, TypeRegistry, builtin};
///
/// let mut registry = TypeRegistry::new();
/// let base = registry.register(
///     ClassBuilder::bean("Base")
///         .param("T")
///         .property(PropertyInfo::new("id", TypeExpr::param("T"))),
/// ).unwrap();
/// let user = registry.register(
///     ClassBuilder::bean("User")
///         .extends(TypeExpr::parameterized(base, [TypeExpr::class(builtin::I64)]))
///         .property(PropertyInfo::new("name", TypeExpr::class(builtin::STRING))),
/// ).unwrap();
/// let factory = TypeFactory::new(Arc::new(registry));
///
/// let props = bean_properties(&factory, &factory.of_class(user));
/// assert_eq!(props[0].name, "name");
/// assert_eq!(props[1].name, "id");
/// assert_eq!(factory.display(&props[1].ty), "i64");
/// ```
pub fn bean_properties(factory: &TypeFactory, ty: &TypeExpression) -> Vec<PropertyDescriptor> {
    let mut found: Vec<PropertyDescriptor> = Vec::new();
    let mut current = factory.resolve(ty);
    let mut depth = 0;
    while let Some(effective) = current {
        let Some(info) = factory.raw_class(&effective).and_then(|id| factory.registry().class(id))
        else {
            break;
        };
        for property in info.properties() {
            if found.iter().any(|p| p.name == property.name()) {
                continue;
            }
            found.push(PropertyDescriptor {
                name: property.name().to_owned(),
                path_name: property.path_name().to_owned(),
                ty: factory.node(property.ty().clone(), Some(&effective)),
                writable: property.is_writable(),
                required: property.is_required(),
            });
        }
        depth += 1;
        if depth > MAX_DEPTH {
            log::warn!("bean hierarchy of `{}` is too deep", factory.display(ty));
            break;
        }
        current = factory.super_type(&effective);
    }
    found
}

/// The components of the record type `ty`, in declaration order.
pub fn record_components(factory: &TypeFactory, ty: &TypeExpression) -> Vec<PropertyDescriptor> {
    let Some(effective) = factory.resolve(ty) else {
        return Vec::new();
    };
    let Some(info) = factory
        .raw_class(&effective)
        .and_then(|id| factory.registry().class(id))
        .filter(|info| info.kind() == ClassKind::Record)
    else {
        return Vec::new();
    };
    info.components()
        .iter()
        .map(|component| PropertyDescriptor {
            name: component.name().to_owned(),
            path_name: component.name().to_owned(),
            ty: factory.node(component.ty().clone(), Some(&effective)),
            writable: false,
            required: false,
        })
        .collect()
}

// -----------------------------------------------------------------------------
// BeanAccessor

/// Accessor of a [`Value::Object`].
///
/// Members are found by property name or by bound path name. Writes go
/// through the declared properties only.
#[derive(Debug, Clone)]
pub struct BeanAccessor {
    value: Value,
    factory: Arc<TypeFactory>,
}

impl BeanAccessor {
    #[inline]
    pub fn new(value: Value, factory: Arc<TypeFactory>) -> Self {
        debug_assert!(matches!(value, Value::Object(_)));
        Self { value, factory }
    }

    fn descriptors(&self) -> Vec<PropertyDescriptor> {
        match &self.value {
            Value::Object(object) => {
                bean_properties(&self.factory, &self.factory.of_class(object.class()))
            }
            _ => Vec::new(),
        }
    }

    fn descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        let mut descriptors = self.descriptors();
        let position = descriptors
            .iter()
            .position(|p| p.name == name)
            .or_else(|| descriptors.iter().position(|p| p.path_name == name))?;
        Some(descriptors.swap_remove(position))
    }
}

impl Accessor for BeanAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Bean
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
        let Value::Object(object) = &self.value else {
            return Ok(None);
        };
        if let Some(value) = object.get(name) {
            return Ok(Some(value.clone()));
        }
        Ok(self
            .descriptor(name)
            .and_then(|p| object.get(&p.name).cloned()))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        let Some(property) = self.descriptor(name) else {
            return Err(AccessError::IllegalArgument(format!("unknown property `{name}`")));
        };
        if !property.writable {
            return Err(AccessError::ReadOnly(property.name));
        }
        let Value::Object(object) = &mut self.value else {
            return Ok(());
        };
        let immutable = self
            .factory
            .registry()
            .class(object.class())
            .is_some_and(|info| info.is_immutable());
        if immutable {
            return Err(AccessError::Immutable(AccessKind::Bean));
        }
        object.set(property.name, value);
        Ok(())
    }

    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Ok(self.descriptors().into_iter().map(|p| p.name).collect())
    }

    fn properties(&self) -> Result<Vec<PropertyDescriptor>, AccessError> {
        Ok(self.descriptors())
    }
}

// -----------------------------------------------------------------------------
// RecordAccessor

/// Read-only accessor of a [`Value::Record`].
#[derive(Debug, Clone)]
pub struct RecordAccessor {
    value: Value,
    factory: Arc<TypeFactory>,
}

impl RecordAccessor {
    #[inline]
    pub fn new(value: Value, factory: Arc<TypeFactory>) -> Self {
        debug_assert!(matches!(value, Value::Record(_)));
        Self { value, factory }
    }
}

impl Accessor for RecordAccessor {
    #[inline]
    fn kind(&self) -> AccessKind {
        AccessKind::Record
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
        Ok(match &self.value {
            Value::Record(record) => record.get(name).cloned(),
            _ => None,
        })
    }

    fn set(&mut self, _: &str, _: Value) -> Result<(), AccessError> {
        Err(AccessError::Immutable(AccessKind::Record))
    }

    fn key_set(&self) -> Result<Vec<String>, AccessError> {
        Ok(match &self.value {
            Value::Record(record) => record.components().map(|(k, _)| k.to_owned()).collect(),
            _ => Vec::new(),
        })
    }

    fn properties(&self) -> Result<Vec<PropertyDescriptor>, AccessError> {
        Ok(match &self.value {
            Value::Record(record) => {
                record_components(&self.factory, &self.factory.of_class(record.class()))
            }
            _ => Vec::new(),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;
    use vc_types::{ClassBuilder, PropertyInfo, TypeExpr, TypeFactory, TypeRegistry, builtin};

    use crate::{AccessError, AccessKind, Accessor, BeanAccessor, Object, Record};
    use crate::{RecordAccessor, Value, bean_properties, record_components};

    struct Fixture {
        factory: Arc<TypeFactory>,
        person: vc_types::ClassId,
        frozen: vc_types::ClassId,
        point: vc_types::ClassId,
    }

    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::new();
        let named = registry
            .register(
                ClassBuilder::bean("Named")
                    .property(PropertyInfo::new("name", TypeExpr::class(builtin::I32)))
                    .property(
                        PropertyInfo::new("id", TypeExpr::class(builtin::STRING)).read_only(),
                    ),
            )
            .unwrap();
        let person = registry
            .register(
                ClassBuilder::bean("Person")
                    .extends(TypeExpr::class(named))
                    .property(PropertyInfo::new("name", TypeExpr::class(builtin::STRING)))
                    .property(
                        PropertyInfo::new("max_age", TypeExpr::class(builtin::I32))
                            .with_alias("max-age"),
                    ),
            )
            .unwrap();
        let frozen = registry
            .register(
                ClassBuilder::bean("Frozen")
                    .immutable()
                    .property(PropertyInfo::new("x", TypeExpr::class(builtin::I32))),
            )
            .unwrap();
        let point = registry
            .register(
                ClassBuilder::record("Point")
                    .component("x", TypeExpr::class(builtin::I32))
                    .component("y", TypeExpr::class(builtin::I32)),
            )
            .unwrap();
        Fixture {
            factory: Arc::new(TypeFactory::new(Arc::new(registry))),
            person,
            frozen,
            point,
        }
    }

    #[test]
    fn subclass_hides_superclass() {
        let fx = fixture();
        let props = bean_properties(&fx.factory, &fx.factory.of_class(fx.person));
        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["name", "max_age", "id"]);
        assert_eq!(fx.factory.display(&props[0].ty), "String");
        assert_eq!(props[1].path_name, "max-age");
        assert!(!props[2].writable);
    }

    #[test]
    fn bean_reads_and_writes() {
        let fx = fixture();
        let object = Object::new(fx.person).with_field("max_age", 90);
        let mut bean = BeanAccessor::new(Value::Object(object), fx.factory.clone());

        assert_eq!(bean.get("max-age").unwrap(), Some(Value::from(90)));
        bean.set("name", Value::from("Ann")).unwrap();
        assert_eq!(bean.get("name").unwrap(), Some(Value::from("Ann")));
        assert_eq!(
            bean.set("id", Value::from("x")),
            Err(AccessError::ReadOnly("id".into()))
        );
        assert!(matches!(
            bean.set("nope", Value::Null),
            Err(AccessError::IllegalArgument(_))
        ));
        assert_eq!(bean.key_set().unwrap(), ["name", "max_age", "id"]);
    }

    #[test]
    fn immutable_beans() {
        let fx = fixture();
        let mut bean = BeanAccessor::new(Value::Object(Object::new(fx.frozen)), fx.factory.clone());
        assert_eq!(
            bean.set("x", Value::from(1)),
            Err(AccessError::Immutable(AccessKind::Bean))
        );
    }

    #[test]
    fn records_are_read_only() {
        let fx = fixture();
        let ty = fx.factory.of_class(fx.point);
        let args: IndexMap<String, Value> = [
            ("x".to_owned(), Value::from(1)),
            ("y".to_owned(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        let record = Record::construct(&fx.factory, &ty, args).unwrap();
        let mut accessor = RecordAccessor::new(Value::Record(record), fx.factory.clone());

        assert_eq!(accessor.get("y").unwrap(), Some(Value::from(2)));
        assert_eq!(accessor.key_set().unwrap(), ["x", "y"]);
        assert_eq!(accessor.properties().unwrap().len(), 2);
        assert_eq!(record_components(&fx.factory, &ty)[1].name, "y");
        assert_eq!(
            accessor.set("x", Value::from(5)),
            Err(AccessError::Immutable(AccessKind::Record))
        );
    }
}
