use indexmap::IndexMap;
use vc_access::{AccessError, Accessor, Object, Record, Value, bean_properties, record_components};
use vc_path::Path;
use vc_types::{StructKind, TypeFactory, TypeKind};

use super::{DataBinder, priority};
use crate::{BindContext, BindError, BindResult, Bindable};

// -----------------------------------------------------------------------------
// BeanBinder

/// Binds beans through their writable properties.
///
/// Each property is bound at `path.<name>`, or at its alias. The instance is
/// the one the target supplies, or a new one created on the first bound
/// property. A required property that binds nothing fails with
/// [`BindError::RequiredPropertyMissing`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BeanBinder;

impl DataBinder for BeanBinder {
    #[inline]
    fn name(&self) -> &str {
        "bean"
    }

    #[inline]
    fn priority(&self) -> i32 {
        priority::BEAN
    }

    #[inline]
    fn supports(&self, factory: &TypeFactory, target: &Bindable) -> bool {
        factory.kind(target.ty()) == TypeKind::Struct(StructKind::Bean)
    }

    fn bind(
        &self,
        ctx: &BindContext<'_>,
        path: &Path,
        target: &Bindable,
    ) -> Result<BindResult, BindError> {
        if !path.is_root() && ctx.read(path)?.is_none() {
            return Ok(BindResult::empty());
        }
        let factory = ctx.factory();
        let existing = target.value().filter(|value| matches!(value, Value::Object(_)));

        let mut instance: Option<Box<dyn Accessor>> = None;
        for property in bean_properties(factory, target.ty()) {
            if !property.writable {
                continue;
            }
            let property_path = path.append_name(&property.path_name);
            let current = existing
                .as_ref()
                .and_then(|value| value.get(&property.name))
                .cloned();
            let property_target = Bindable::of(property.ty.clone()).with_existing(current);

            let Some(value) = ctx.bind(&property_path, &property_target)?.into_value() else {
                if property.required {
                    return Err(BindError::RequiredPropertyMissing {
                        path: property_path.to_string(),
                        property: property.name,
                    });
                }
                continue;
            };

            let accessor = match &mut instance {
                Some(accessor) => accessor,
                slot => {
                    let created = new_instance(ctx, target, &existing)?;
                    slot.insert(ctx.providers().accessor(created)?)
                }
            };
            accessor.set(&property.name, value.clone())?;
            ctx.handler().on_bound(&property_path, &property_target, ctx, &value);
        }

        Ok(instance.map_or(BindResult::empty(), |accessor| BindResult::of(accessor.into_value())))
    }
}

fn new_instance(
    ctx: &BindContext<'_>,
    target: &Bindable,
    existing: &Option<Value>,
) -> Result<Value, BindError> {
    if let Some(existing) = existing {
        return Ok(existing.clone());
    }
    let factory = ctx.factory();
    let info = factory
        .raw_class(target.ty())
        .and_then(|id| factory.registry().class(id))
        .ok_or_else(|| {
            BindError::IllegalArgument(format!("`{}` is not a class", factory.display(target.ty())))
        })?;
    Ok(Value::Object(Object::instantiate(info).map_err(illegal_argument)?))
}

fn illegal_argument(error: AccessError) -> BindError {
    match error {
        AccessError::IllegalArgument(message) => BindError::IllegalArgument(message),
        other => BindError::Access(other),
    }
}

// -----------------------------------------------------------------------------
// ValueObjectBinder

/// Binds records, built once from every component.
///
/// Nothing bound is an empty result. Some but not all components bound, or a
/// component of the wrong type, fails with [`BindError::IllegalArgument`]
/// naming the component.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueObjectBinder;

impl DataBinder for ValueObjectBinder {
    #[inline]
    fn name(&self) -> &str {
        "value-object"
    }

    #[inline]
    fn priority(&self) -> i32 {
        priority::VALUE_OBJECT
    }

    #[inline]
    fn supports(&self, factory: &TypeFactory, target: &Bindable) -> bool {
        factory.kind(target.ty()) == TypeKind::Struct(StructKind::Record)
    }

    fn bind(
        &self,
        ctx: &BindContext<'_>,
        path: &Path,
        target: &Bindable,
    ) -> Result<BindResult, BindError> {
        if !path.is_root() && ctx.read(path)?.is_none() {
            return Ok(BindResult::empty());
        }
        let factory = ctx.factory();
        let mut args = IndexMap::new();
        for component in record_components(factory, target.ty()) {
            let component_path = path.append_name(&component.path_name);
            let component_target = Bindable::of(component.ty.clone());
            if let Some(value) = ctx.bind(&component_path, &component_target)?.into_value() {
                ctx.handler().on_bound(&component_path, &component_target, ctx, &value);
                args.insert(component.name, value);
            }
        }
        if args.is_empty() {
            return Ok(BindResult::empty());
        }
        let record = Record::construct(factory, target.ty(), args).map_err(illegal_argument)?;
        Ok(BindResult::of(Value::Record(record)))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_access::{Object, Value};
    use vc_types::{ClassBuilder, ClassId, PropertyInfo, TypeExpr, TypeFactory, TypeRegistry};
    use vc_types::builtin;

    use crate::{BindError, Bindable, Binder};

    struct Fixture {
        binder: Binder,
        person: ClassId,
        point: ClassId,
        server: ClassId,
    }

    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::new();
        let person = registry
            .register(
                ClassBuilder::bean("Person")
                    .property(PropertyInfo::new("name", TypeExpr::class(builtin::STRING)))
                    .property(PropertyInfo::new("age", TypeExpr::class(builtin::I32)))
                    .property(PropertyInfo::new("id", TypeExpr::class(builtin::I64)).read_only()),
            )
            .unwrap();
        let point = registry
            .register(
                ClassBuilder::record("Point")
                    .component("x", TypeExpr::class(builtin::I32))
                    .component("y", TypeExpr::class(builtin::I32)),
            )
            .unwrap();
        let server = registry
            .register(
                ClassBuilder::bean("Server")
                    .property(
                        PropertyInfo::new("host", TypeExpr::class(builtin::STRING)).required(),
                    )
                    .property(
                        PropertyInfo::new("port", TypeExpr::class(builtin::U16))
                            .with_alias("listen-port"),
                    )
                    .property(PropertyInfo::new("origin", TypeExpr::class(point))),
            )
            .unwrap();
        let factory = Arc::new(TypeFactory::new(Arc::new(registry)));
        Fixture {
            binder: Binder::new(factory),
            person,
            point,
            server,
        }
    }

    fn target(f: &Fixture, class: ClassId) -> Bindable {
        Bindable::of(f.binder.factory().of_class(class))
    }

    #[test]
    fn round_trip() {
        let f = fixture();
        let source = Value::map([(
            "person",
            Value::map([("name", "Ann"), ("age", "30"), ("id", "7")]),
        )]);
        let bound = f.binder.bind("person", &target(&f, f.person), &source).unwrap();
        let Some(Value::Object(person)) = bound.into_value() else {
            panic!("expected an object");
        };
        assert_eq!(person.class(), f.person);
        assert_eq!(person.get("name"), Some(&Value::from("Ann")));
        assert_eq!(person.get("age"), Some(&Value::from(30)));
        // Read-only, never bound.
        assert_eq!(person.get("id"), None);
    }

    #[test]
    fn existing_instance_is_updated() {
        let f = fixture();
        let existing = Object::new(f.person).with_field("name", "Bob").with_field("age", 1);
        let source = Value::map([("age", "2")]);
        let bound = f
            .binder
            .bind("", &target(&f, f.person).with_value(existing.into()), &source)
            .unwrap();
        let Some(Value::Object(person)) = bound.into_value() else {
            panic!("expected an object");
        };
        assert_eq!(person.get("name"), Some(&Value::from("Bob")));
        assert_eq!(person.get("age"), Some(&Value::from(2)));
    }

    #[test]
    fn aliases_nesting_and_required() {
        let f = fixture();
        let source = Value::map([(
            "server",
            Value::map([
                ("host", Value::from("h")),
                ("listen-port", Value::from("8080")),
                ("origin", Value::map([("x", 1), ("y", 2)])),
            ]),
        )]);
        let bound = f.binder.bind("server", &target(&f, f.server), &source).unwrap();
        let Some(Value::Object(server)) = bound.into_value() else {
            panic!("expected an object");
        };
        assert_eq!(server.get("port"), Some(&Value::from(8080)));
        let Some(Value::Record(origin)) = server.get("origin") else {
            panic!("expected a record");
        };
        assert_eq!(origin.get("y"), Some(&Value::from(2)));

        let source = Value::map([("server", Value::map([("listen-port", 1)]))]);
        let err = f.binder.bind("server", &target(&f, f.server), &source).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            BindError::RequiredPropertyMissing { property, .. } if property == "host"
        ));

        let nothing = f.binder.bind("other", &target(&f, f.server), &source).unwrap();
        assert!(!nothing.is_bound());
    }

    #[test]
    fn records_need_every_component() {
        let f = fixture();
        let source = Value::map([
            ("full", Value::map([("x", "1"), ("y", "2")])),
            ("half", Value::map([("x", "1")])),
        ]);
        let full = f.binder.bind("full", &target(&f, f.point), &source).unwrap();
        let Some(Value::Record(point)) = full.into_value() else {
            panic!("expected a record");
        };
        assert_eq!(point.get("x"), Some(&Value::from(1)));

        let err = f.binder.bind("half", &target(&f, f.point), &source).unwrap_err();
        assert!(matches!(err.root_cause(), BindError::IllegalArgument(m) if m.contains("`y`")));

        assert!(!f.binder.bind("none", &target(&f, f.point), &source).unwrap().is_bound());
    }

    #[test]
    fn property_bound_at_its_own_path_is_a_cycle() {
        let mut registry = TypeRegistry::new();
        let node = ClassId::from_index(registry.len());
        registry
            .register(
                ClassBuilder::bean("Node")
                    .property(PropertyInfo::new("value", TypeExpr::class(builtin::I32)))
                    .property(PropertyInfo::new("inner", TypeExpr::class(node)).with_alias("")),
            )
            .unwrap();
        let factory = Arc::new(TypeFactory::new(Arc::new(registry)));
        let binder = Binder::new(factory.clone());

        let source = Value::map([("node", Value::map([("value", 1)]))]);
        let err = binder
            .bind("node", &Bindable::of(factory.of_class(node)), &source)
            .unwrap_err();
        assert!(matches!(
            err.root_cause(),
            BindError::RecursiveBinding { path } if path == "node"
        ));
        assert!(matches!(err, BindError::Failure { ref path, .. } if path == "node"));
    }

    #[test]
    fn self_referencing_record_stops_where_data_ends() {
        let mut registry = TypeRegistry::new();
        let node = ClassId::from_index(registry.len());
        registry
            .register(
                ClassBuilder::record("Node")
                    .component("v", TypeExpr::class(builtin::I32))
                    .component("next", TypeExpr::class(node)),
            )
            .unwrap();
        let factory = Arc::new(TypeFactory::new(Arc::new(registry)));
        let binder = Binder::new(factory.clone());
        let node = Bindable::of(factory.of_class(node));

        let source = Value::map([
            ("n", Value::map([("v", 1)])),
            ("e", Value::map::<&str, i32>([])),
        ]);
        let err = binder.bind("n", &node, &source).unwrap_err();
        assert!(matches!(err.root_cause(), BindError::IllegalArgument(m) if m.contains("`next`")));

        assert!(!binder.bind("e", &node, &source).unwrap().is_bound());
        assert!(!binder.bind("missing", &node, &source).unwrap().is_bound());
    }
}
