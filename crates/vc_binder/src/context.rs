use core::cell::RefCell;
use std::sync::Arc;

use vc_access::{AccessorProviders, Value};
use vc_path::Path;
use vc_types::TypeFactory;
use vc_types::hash::HashSet;

use crate::{BindError, BindHandler, BindResult, BindStrategy, Bindable, Binder, ConversionService};

// -----------------------------------------------------------------------------
// InFlight

/// Removes a path from the in-flight set when its bind returns, however it
/// returns.
struct InFlight<'c> {
    paths: &'c RefCell<HashSet<String>>,
    key: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.paths.borrow_mut().remove(&self.key);
    }
}

// -----------------------------------------------------------------------------
// BindContext

/// State of one top-level bind, threaded through the whole descent.
///
/// The context tracks the paths currently being bound. Entering a path that
/// is already in flight fails with [`BindError::RecursiveBinding`]. The set
/// lives and dies with the call, so a [`Binder`] can serve many calls at
/// once.
pub struct BindContext<'a> {
    binder: &'a Binder,
    source: &'a Value,
    in_flight: RefCell<HashSet<String>>,
}

impl<'a> BindContext<'a> {
    pub(crate) fn new(binder: &'a Binder, source: &'a Value) -> Self {
        Self {
            binder,
            source,
            in_flight: RefCell::new(HashSet::default()),
        }
    }

    #[inline]
    pub fn binder(&self) -> &'a Binder {
        self.binder
    }

    #[inline]
    pub fn factory(&self) -> &'a Arc<TypeFactory> {
        self.binder.factory()
    }

    #[inline]
    pub fn providers(&self) -> &'a AccessorProviders {
        self.binder.providers()
    }

    #[inline]
    pub fn conversion(&self) -> &'a dyn ConversionService {
        self.binder.conversion()
    }

    #[inline]
    pub fn handler(&self) -> &'a dyn BindHandler {
        self.binder.handler()
    }

    #[inline]
    pub fn strategy(&self) -> BindStrategy {
        self.binder.strategy()
    }

    /// The root of the data being bound.
    #[inline]
    pub fn source(&self) -> &'a Value {
        self.source
    }

    /// Parses `text` with the separator of the binder.
    #[inline]
    pub fn parse_path(&self, text: &str) -> Path {
        Path::parse_with(self.binder.parser(), text)
    }

    /// The source value at `path`.
    ///
    /// Null and values behind a shape that can not be walked read as
    /// nothing.
    pub fn read(&self, path: &Path) -> Result<Option<Value>, BindError> {
        match self.providers().navigate(self.source, path.entries()) {
            Ok(value) => Ok(value.filter(|value| !value.is_null())),
            Err(error) if error.is_unsupported() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// The keys of `value`, `None` if it has none.
    pub fn key_set(&self, value: Value) -> Result<Option<Vec<String>>, BindError> {
        let accessor = self.providers().accessor(value)?;
        match accessor.key_set() {
            Ok(keys) => Ok(Some(keys)),
            Err(error) if error.is_unsupported() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Binds `target` at `path`.
    ///
    /// This is the entry nested binders recurse through: it applies
    /// [`on_key_created`](BindHandler::on_key_created), guards against
    /// cycles and routes errors through
    /// [`on_failure`](BindHandler::on_failure). Errors the handler passes on
    /// are wrapped in [`BindError::Failure`] with `path` and the target type.
    pub fn bind(&self, path: &Path, target: &Bindable) -> Result<BindResult, BindError> {
        let path = self.handler().on_key_created(path.clone(), self);
        let key = path.to_string();
        if !self.in_flight.borrow_mut().insert(key.clone()) {
            return Err(BindError::RecursiveBinding { path: key });
        }
        let _guard = InFlight {
            paths: &self.in_flight,
            key,
        };

        let target = target.refresh(self.factory());
        match self.dispatch(&path, &target) {
            Ok(result) => Ok(result),
            Err(error) => match self.handler().on_failure(&path, &target, self, error) {
                Ok(fallback) => Ok(fallback),
                Err(error) if error.is_binding_error() => Err(error),
                Err(error) => Err(BindError::Failure {
                    path: path.to_string(),
                    target: self.factory().display(target.ty()),
                    source: Box::new(error),
                }),
            },
        }
    }

    /// Hands `target` to the first supporting binder, without the cycle
    /// guard or the failure hook of [`bind`](Self::bind).
    ///
    /// Binders use it to bind the same path again as another type.
    pub fn dispatch(&self, path: &Path, target: &Bindable) -> Result<BindResult, BindError> {
        let factory = self.factory();
        let Some(binder) = self.binder.table().find(factory, target) else {
            return Err(BindError::NoBinderFound {
                target: factory.display(target.ty()),
            });
        };
        crate::cfg::debug! {
            log::trace!(
                "bind `{path}` as `{}` with the {} binder",
                factory.display(target.ty()),
                binder.name(),
            );
        }
        binder.bind(self, path, target)
    }

    /// Converts a scalar into the type of `target`.
    pub fn convert(&self, value: Value, target: &Bindable) -> Result<Value, BindError> {
        Ok(self.conversion().convert(self.factory(), value, target.ty())?)
    }
}
