use std::sync::Arc;

use vc_access::Value;
use vc_path::Path;
use vc_types::{SequenceKind, TypeFactory, TypeKind, builtin};

use super::{DataBinder, MAX_COLLECTION_SIZE, priority};
use crate::{BindContext, BindError, BindResult, Bindable};

/// Binds the elements at `path[0]`, `path[1]`, ... up to the first index
/// that binds nothing.
///
/// A scalar at `path` itself, with no `path[0]`, is bound as the only
/// element. `None` when the source holds nothing to bind.
fn bind_elements(
    ctx: &BindContext<'_>,
    path: &Path,
    target: &Bindable,
) -> Result<Option<Vec<Value>>, BindError> {
    let factory = ctx.factory();
    let element = factory
        .element_type(target.ty())
        .unwrap_or_else(|| factory.of_class(builtin::OBJECT));
    let element = Bindable::of(element);

    if ctx.read(&path.append_index(0))?.is_none() {
        return match ctx.read(path)? {
            Some(value) if value.is_scalar() => {
                Ok(ctx.dispatch(path, &element)?.into_value().map(|value| vec![value]))
            }
            Some(value) if value.is_collection() => Ok(Some(Vec::new())),
            _ => Ok(None),
        };
    }

    let mut items = Vec::new();
    for index in 0..MAX_COLLECTION_SIZE {
        match ctx.bind(&path.append_index(index), &element)?.into_value() {
            Some(value) => items.push(value),
            None => return Ok(Some(items)),
        }
    }
    if ctx.read(&path.append_index(MAX_COLLECTION_SIZE))?.is_some() {
        log::warn!(
            "`{path}` holds more than {MAX_COLLECTION_SIZE} elements, the rest is not bound"
        );
    }
    Ok(Some(items))
}

macro_rules! collection_binder {
    ($(#[$meta:meta])* $name:ident, $label:literal, $priority:expr, $kind:pat, |$items:ident| $collect:expr) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl DataBinder for $name {
            #[inline]
            fn name(&self) -> &str {
                $label
            }

            #[inline]
            fn priority(&self) -> i32 {
                $priority
            }

            #[inline]
            fn supports(&self, factory: &TypeFactory, target: &Bindable) -> bool {
                matches!(factory.kind(target.ty()), $kind)
            }

            fn bind(
                &self,
                ctx: &BindContext<'_>,
                path: &Path,
                target: &Bindable,
            ) -> Result<BindResult, BindError> {
                Ok(bind_elements(ctx, path, target)?
                    .map_or(BindResult::empty(), |$items| BindResult::of($collect)))
            }
        }
    };
}

collection_binder!(
    /// Binds arrays, collected like a list and then fixed in size.
    ArrayBinder,
    "array",
    priority::ARRAY,
    TypeKind::Array,
    |items| Value::Array(Arc::from(items))
);

collection_binder!(
    /// Binds every collection that is not a set.
    ListBinder,
    "list",
    priority::LIST,
    TypeKind::Sequence(SequenceKind::List),
    |items| Value::List(Arc::new(items))
);

collection_binder!(
    /// Binds sets. Duplicate elements collapse, the first one keeps its place.
    SetBinder,
    "set",
    priority::SET,
    TypeKind::Sequence(SequenceKind::Set),
    |items| Value::set(items)
);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_access::Value;
    use vc_types::{TypeFactory, TypeRegistry};

    use crate::{BindResult, Bindable, Binder, MAX_COLLECTION_SIZE};

    fn bind(ty: &str, path: &str, source: &Value) -> BindResult {
        let factory = Arc::new(TypeFactory::new(Arc::new(TypeRegistry::new())));
        let binder = Binder::new(factory.clone());
        binder
            .bind(path, &Bindable::of(factory.parse(ty).unwrap()), source)
            .unwrap()
    }

    #[test]
    fn lists_convert_each_element() {
        let source = Value::map([("ports", Value::list(["80", "443"]))]);
        assert_eq!(
            bind("List<i32>", "ports", &source).into_value(),
            Some(Value::list([80, 443]))
        );
        assert_eq!(
            bind("i32[]", "ports", &source).into_value(),
            Some(Value::array([80, 443]))
        );
        assert!(!bind("List<i32>", "hosts", &source).is_bound());
    }

    #[test]
    fn scalar_becomes_a_singleton() {
        let source = Value::from("x");
        assert_eq!(
            bind("List<String>", "", &source).into_value(),
            Some(Value::list(["x"]))
        );

        let source = Value::map([("tags", "x")]);
        assert_eq!(
            bind("Set<String>", "tags", &source).into_value(),
            Some(Value::set(["x"]))
        );
    }

    #[test]
    fn stops_at_the_first_gap() {
        let source = Value::map([(
            "list",
            Value::list([Value::from(1), Value::Null, Value::from(3)]),
        )]);
        assert_eq!(
            bind("List<i64>", "list", &source).into_value(),
            Some(Value::list([1]))
        );
    }

    #[test]
    fn sets_drop_duplicates() {
        let source = Value::map([("s", Value::list(["b", "a", "b"]))]);
        assert_eq!(
            bind("Set<String>", "s", &source).into_value(),
            Some(Value::set(["b", "a"]))
        );
    }

    #[test]
    fn nested_collections() {
        let source = Value::map([(
            "grid",
            Value::list([Value::list([1, 2]), Value::list([3])]),
        )]);
        assert_eq!(
            bind("List<List<u8>>", "grid", &source).into_value(),
            Some(Value::list([Value::list([1, 2]), Value::list([3])]))
        );
    }

    #[test]
    fn capped_at_the_maximum_size() {
        let source = Value::list(0..=MAX_COLLECTION_SIZE as i64);
        let Some(Value::List(items)) = bind("List<i64>", "", &source).into_value() else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), MAX_COLLECTION_SIZE);
    }
}
