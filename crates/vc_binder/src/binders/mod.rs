//! The binders a [`Binder`](crate::Binder) dispatches to, one per target
//! shape.

mod bean;
mod collection;
mod map;
mod scalar;

use core::fmt;
use std::sync::Arc;

use vc_path::Path;
use vc_types::TypeFactory;

use crate::{BindContext, BindError, BindResult, Bindable};

pub use bean::{BeanBinder, ValueObjectBinder};
pub use collection::{ArrayBinder, ListBinder, SetBinder};
pub use map::MapBinder;
pub use scalar::ScalarBinder;

/// Upper bound on the elements bound into one collection.
///
/// Indexed scanning stops here even when the source holds more.
pub const MAX_COLLECTION_SIZE: usize = 4096;

/// Priorities of the builtin binders, highest tried first.
pub mod priority {
    pub const SCALAR: i32 = 300;
    pub const ARRAY: i32 = 250;
    pub const LIST: i32 = 240;
    pub const SET: i32 = 230;
    pub const MAP: i32 = 220;
    pub const VALUE_OBJECT: i32 = 200;
    /// The fallback, below everything a custom binder is likely to use.
    pub const BEAN: i32 = 0;
}

// -----------------------------------------------------------------------------
// DataBinder

/// Binds the targets of one shape.
pub trait DataBinder: Send + Sync {
    /// A name for diagnostics.
    fn name(&self) -> &str;

    fn priority(&self) -> i32;

    fn supports(&self, factory: &TypeFactory, target: &Bindable) -> bool;

    /// Binds `target` at `path`. Nested members go back through
    /// [`BindContext::bind`].
    fn bind(
        &self,
        ctx: &BindContext<'_>,
        path: &Path,
        target: &Bindable,
    ) -> Result<BindResult, BindError>;
}

// -----------------------------------------------------------------------------
// BinderTable

/// Binders ordered by descending priority, registration order on ties.
///
/// The order is fixed when a binder is registered, dispatch only scans.
#[derive(Clone)]
pub struct BinderTable {
    binders: Vec<Arc<dyn DataBinder>>,
}

impl BinderTable {
    /// A table with every builtin binder.
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.register(ScalarBinder);
        table.register(ArrayBinder);
        table.register(ListBinder);
        table.register(SetBinder);
        table.register(MapBinder);
        table.register(ValueObjectBinder);
        table.register(BeanBinder);
        table
    }

    #[inline]
    pub const fn empty() -> Self {
        Self {
            binders: Vec::new(),
        }
    }

    /// Adds a binder after every binder of the same or higher priority.
    pub fn register(&mut self, binder: impl DataBinder + 'static) {
        self.register_arc(Arc::new(binder));
    }

    pub fn register_arc(&mut self, binder: Arc<dyn DataBinder>) {
        let priority = binder.priority();
        let at = self
            .binders
            .iter()
            .position(|b| b.priority() < priority)
            .unwrap_or(self.binders.len());
        self.binders.insert(at, binder);
    }

    /// The first binder supporting `target`.
    pub fn find(&self, factory: &TypeFactory, target: &Bindable) -> Option<&dyn DataBinder> {
        self.binders
            .iter()
            .find(|b| b.supports(factory, target))
            .map(|b| &**b)
    }

    /// Binder names, in the order they are tried.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.binders.iter().map(|b| b.name())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.binders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

impl fmt::Debug for BinderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vc_path::Path;
    use vc_types::{TypeFactory, TypeRegistry, builtin};

    use super::{BinderTable, DataBinder};
    use crate::{BindContext, BindError, BindResult, Bindable};

    struct Fixed(i32);

    impl DataBinder for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn priority(&self) -> i32 {
            self.0
        }

        fn supports(&self, _: &TypeFactory, _: &Bindable) -> bool {
            true
        }

        fn bind(
            &self,
            _: &BindContext<'_>,
            _: &Path,
            _: &Bindable,
        ) -> Result<BindResult, BindError> {
            Ok(BindResult::empty())
        }
    }

    #[test]
    fn ordered_by_priority() {
        let table = BinderTable::new();
        let names: Vec<_> = table.names().collect();
        assert_eq!(
            names,
            ["scalar", "array", "list", "set", "map", "value-object", "bean"]
        );

        let factory = TypeFactory::new(Arc::new(TypeRegistry::new()));
        let list = Bindable::of(factory.parse("List<String>").unwrap());
        assert_eq!(table.find(&factory, &list).map(|b| b.name()), Some("list"));

        let mut table = table;
        table.register(Fixed(1000));
        table.register(Fixed(240));
        let names: Vec<_> = table.names().collect();
        assert_eq!(names[0], "fixed");
        assert_eq!(&names[3..5], ["list", "fixed"]);

        let string = Bindable::of(factory.of_class(builtin::STRING));
        assert_eq!(table.find(&factory, &string).map(|b| b.name()), Some("fixed"));
    }
}
