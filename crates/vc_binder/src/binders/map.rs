use std::sync::Arc;

use indexmap::IndexMap;
use vc_access::Value;
use vc_path::Path;
use vc_types::{TypeFactory, TypeKind, builtin};

use super::{DataBinder, priority};
use crate::{BindContext, BindError, BindResult, Bindable};

/// Binds maps, one entry per key of the source at the target path.
///
/// Each key is addressed as exactly one segment, so `a.b` stays a single
/// key. Entries of an existing map are kept and bound into. Binding into an
/// immutable map class fails with [`BindError::IllegalArgument`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MapBinder;

impl DataBinder for MapBinder {
    #[inline]
    fn name(&self) -> &str {
        "map"
    }

    #[inline]
    fn priority(&self) -> i32 {
        priority::MAP
    }

    #[inline]
    fn supports(&self, factory: &TypeFactory, target: &Bindable) -> bool {
        factory.kind(target.ty()) == TypeKind::Map
    }

    fn bind(
        &self,
        ctx: &BindContext<'_>,
        path: &Path,
        target: &Bindable,
    ) -> Result<BindResult, BindError> {
        let factory = ctx.factory();
        let immutable = factory
            .raw_class(target.ty())
            .and_then(|id| factory.registry().class(id))
            .is_some_and(|info| info.is_immutable());
        if immutable {
            return Err(BindError::IllegalArgument(format!(
                "cannot bind into the immutable map `{}`",
                factory.display(target.ty())
            )));
        }

        let Some(source) = ctx.read(path)? else {
            return Ok(BindResult::empty());
        };
        // Only sequences and property views report `[i]` keys. A map key
        // spelled `[0]` is a plain key.
        let indexed = matches!(
            source,
            Value::Array(_) | Value::List(_) | Value::Set(_) | Value::Properties(_)
        );
        let Some(keys) = ctx.key_set(source)? else {
            return Ok(BindResult::empty());
        };

        let object = || factory.of_class(builtin::OBJECT);
        let (key_ty, value_ty) = factory.map_types(target.ty());
        let key_ty = key_ty.unwrap_or_else(object);
        let value_ty = value_ty.unwrap_or_else(object);

        let mut entries: IndexMap<Value, Value> = target
            .value()
            .and_then(|value| value.as_map().cloned())
            .unwrap_or_default();
        for key in keys {
            let (entry_path, text) = match synthetic_index(&key).filter(|_| indexed) {
                Some(index) => (path.append_index(index), index.to_string()),
                None => (path.append_key(&key), key),
            };
            let key = ctx.conversion().convert(factory, Value::Str(text), &key_ty)?;
            let entry = Bindable::of(value_ty.clone()).with_existing(entries.get(&key).cloned());
            if let Some(value) = ctx.bind(&entry_path, &entry)?.into_value() {
                entries.insert(key, value);
            }
        }
        Ok(BindResult::of(Value::Map(Arc::new(entries))))
    }
}

/// The index of the `[i]` keys sequences report.
fn synthetic_index(key: &str) -> Option<usize> {
    key.strip_prefix('[')?.strip_suffix(']')?.parse().ok()
}

// -----------------------------------------------------------------------------
// Tests
