use core::fmt;
use std::sync::Arc;

use vc_access::Value;
use vc_types::{TypeExpression, TypeFactory};

/// Lazily yields the existing instance a bind should write into.
pub type ValueSupplier = Arc<dyn Fn() -> Option<Value> + Send + Sync>;

/// A bind target: the type to produce and, optionally, an existing instance.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_access::Value;
/// use vc_binder::Bindable;
/// use vc_types::{TypeFactory, TypeRegistry, builtin};
///
/// let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
/// let target = Bindable::of(factory.of_class(builtin::OBJECT)).with_value(Value::list([1]));
///
/// // A bare `Object` target takes the type of its instance.
/// let refreshed = target.refresh(&factory);
/// assert_eq!(factory.raw_class(refreshed.ty()), Some(builtin::ARRAY_LIST));
/// ```
#[derive(Clone)]
pub struct Bindable {
    ty: TypeExpression,
    supplier: Option<ValueSupplier>,
}

impl Bindable {
    #[inline]
    pub fn of(ty: TypeExpression) -> Self {
        Self { ty, supplier: None }
    }

    /// Binds into `value` instead of a new instance.
    pub fn with_value(self, value: Value) -> Self {
        self.with_supplier(move || Some(value.clone()))
    }

    /// Binds into the instance `supplier` yields, if any.
    #[inline]
    pub fn with_supplier(
        mut self,
        supplier: impl Fn() -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.supplier = Some(Arc::new(supplier));
        self
    }

    /// Like [`with_value`](Self::with_value), nothing for `None` or null.
    #[inline]
    pub fn with_existing(self, value: Option<Value>) -> Self {
        match value {
            Some(value) if !value.is_null() => self.with_value(value),
            _ => self,
        }
    }

    #[inline]
    pub fn ty(&self) -> &TypeExpression {
        &self.ty
    }

    /// The existing instance. Null counts as none.
    pub fn value(&self) -> Option<Value> {
        self.supplier
            .as_ref()
            .and_then(|supplier| supplier())
            .filter(|value| !value.is_null())
    }

    /// The same target, typed after its instance when the declared type is
    /// a bare `Object`.
    pub fn refresh(&self, factory: &TypeFactory) -> Self {
        let root = factory.registry().root_class();
        if root.is_none() || factory.raw_class(&self.ty) != root {
            return self.clone();
        }
        let runtime = self
            .value()
            .and_then(|value| value.runtime_class(factory.registry()));
        match runtime {
            Some(class) if Some(class) != root => Self {
                ty: factory.of_class(class),
                supplier: self.supplier.clone(),
            },
            _ => self.clone(),
        }
    }
}

impl fmt::Debug for Bindable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindable")
            .field("ty", &self.ty)
            .field("has_value", &self.supplier.is_some())
            .finish()
    }
}
