use vc_access::Value;
use vc_path::Path;

use crate::{BindContext, BindError, BindResult, Bindable};

// -----------------------------------------------------------------------------
// BindHandler

/// Hooks around every bind.
///
/// Every hook has an inert default, implementors override what they need.
/// Handlers compose: a wrapping handler forwards to the one it wraps, see
/// [`PlaceholderHandler`](crate::PlaceholderHandler).
pub trait BindHandler: Send + Sync {
    /// Rewrites `path` before anything is read from it.
    fn on_key_created(&self, path: Path, ctx: &BindContext<'_>) -> Path {
        let _ = ctx;
        path
    }

    /// Transforms a scalar read from the source, before it is converted.
    fn on_binding(
        &self,
        path: &Path,
        target: &Bindable,
        ctx: &BindContext<'_>,
        value: Value,
    ) -> Result<Value, BindError> {
        let _ = (path, target, ctx);
        Ok(value)
    }

    /// Observes a value written into its parent.
    fn on_bound(&self, path: &Path, target: &Bindable, ctx: &BindContext<'_>, value: &Value) {
        let _ = (path, target, ctx, value);
    }

    /// Recovers from a failed bind, or passes the error on.
    fn on_failure(
        &self,
        path: &Path,
        target: &Bindable,
        ctx: &BindContext<'_>,
        error: BindError,
    ) -> Result<BindResult, BindError> {
        let _ = (path, target, ctx);
        Err(error)
    }

    /// Observes a source value left unbound by a shallow bind.
    fn on_unbound(&self, path: &Path, target: &Bindable, ctx: &BindContext<'_>) {
        let _ = (path, target, ctx);
    }
}

/// The handler with every hook inert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl BindHandler for NoopHandler {}
