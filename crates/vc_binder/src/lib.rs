#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Compilation config

pub(crate) mod cfg {
    /// Keeps its body only in debug builds with the `debug` feature.
    macro_rules! debug {
        ($($body:tt)*) => {
            #[cfg(all(debug_assertions, feature = "debug"))]
            {
                $($body)*
            }
        };
    }

    pub(crate) use debug;
}

// -----------------------------------------------------------------------------
// Modules

mod bindable;
mod binder;
mod context;
mod conversion;
mod error;
mod handler;
mod placeholder;
mod result;

pub mod binders;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use bindable::{Bindable, ValueSupplier};
pub use binder::{BindStrategy, Binder, BinderBuilder};
pub use binders::{BinderTable, DataBinder, MAX_COLLECTION_SIZE};
pub use context::BindContext;
pub use conversion::{ConversionService, DefaultConversionService};
pub use error::{BindError, ConversionError};
pub use handler::{BindHandler, NoopHandler};
pub use placeholder::PlaceholderHandler;
pub use result::BindResult;
