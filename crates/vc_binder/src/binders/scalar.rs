use vc_access::Value;
use vc_path::Path;
use vc_types::{TypeExpr, TypeExpression, TypeFactory, TypeKind, builtin};

use super::{DataBinder, priority};
use crate::{BindContext, BindError, BindResult, BindStrategy, Bindable};

/// Binds scalars, enums, class literals and targets of unknown shape.
///
/// A scalar source is handed to [`on_binding`](crate::BindHandler::on_binding)
/// and then to the conversion service. A non-scalar source bound as an
/// unknown type is bound again after its own runtime type under
/// [`BindStrategy::Deep`]. Everything else is left unbound.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarBinder;

impl DataBinder for ScalarBinder {
    #[inline]
    fn name(&self) -> &str {
        "scalar"
    }

    #[inline]
    fn priority(&self) -> i32 {
        priority::SCALAR
    }

    fn supports(&self, factory: &TypeFactory, target: &Bindable) -> bool {
        matches!(
            factory.kind(target.ty()),
            TypeKind::Scalar(_) | TypeKind::Enum | TypeKind::Unknown
        )
    }

    fn bind(
        &self,
        ctx: &BindContext<'_>,
        path: &Path,
        target: &Bindable,
    ) -> Result<BindResult, BindError> {
        let Some(value) = ctx.read(path)? else {
            return Ok(BindResult::empty());
        };
        if value.is_scalar() {
            let value = ctx.handler().on_binding(path, target, ctx, value)?;
            return Ok(BindResult::of(ctx.convert(value, target)?));
        }

        let factory = ctx.factory();
        if ctx.strategy() == BindStrategy::Deep && factory.kind(target.ty()) == TypeKind::Unknown {
            let runtime = Bindable::of(runtime_type(factory, &value));
            return ctx.dispatch(path, &runtime);
        }

        ctx.handler().on_unbound(path, target, ctx);
        Ok(BindResult::empty())
    }
}

/// The type a non-scalar source is bound as when nothing more precise is
/// declared.
fn runtime_type(factory: &TypeFactory, value: &Value) -> TypeExpression {
    match value.runtime_class(factory.registry()) {
        Some(class) => factory.of_class(class),
        None => factory.of(TypeExpr::array(TypeExpr::Class(builtin::OBJECT))),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_access::Value;
    use vc_types::{TypeFactory, TypeRegistry, builtin};

    use crate::{BindStrategy, Bindable, Binder};

    fn factory() -> Arc<TypeFactory> {
        Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())))
    }

    #[test]
    fn converts_scalars() {
        let factory = factory();
        let binder = Binder::new(factory.clone());
        let source = Value::map([
            ("port", Value::from("8080")),
            ("nested", Value::map([("a", 1)])),
        ]);

        let port = binder
            .bind("port", &Bindable::of(factory.of_class(builtin::U16)), &source)
            .unwrap();
        assert_eq!(port.into_value(), Some(Value::from(8080)));

        let missing = binder
            .bind("nope", &Bindable::of(factory.of_class(builtin::U16)), &source)
            .unwrap();
        assert!(!missing.is_bound());

        // A map is not a string.
        let nested = binder
            .bind("nested", &Bindable::of(factory.of_class(builtin::STRING)), &source)
            .unwrap();
        assert!(!nested.is_bound());
    }

    #[test]
    fn unknown_targets_follow_the_strategy() {
        let factory = factory();
        let source = Value::map([("nested", Value::map([("a", Value::list([1, 2]))]))]);
        let object = Bindable::of(factory.of_class(builtin::OBJECT));

        let deep = Binder::new(factory.clone());
        let bound = deep.bind("nested", &object, &source).unwrap();
        assert_eq!(
            bound.into_value(),
            Some(Value::map([("a", Value::list([1, 2]))]))
        );

        let shallow = Binder::builder(factory.clone())
            .strategy(BindStrategy::Shallow)
            .build();
        assert!(!shallow.bind("nested", &object, &source).unwrap().is_bound());
        assert_eq!(
            shallow.bind("nested.a[1]", &object, &source).unwrap().into_value(),
            Some(Value::from(2))
        );
    }
}
