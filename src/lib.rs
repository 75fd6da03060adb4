#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_access as access;
pub use vc_binder as binder;
pub use vc_path as path;
pub use vc_types as types;

/// The types most binds need.
pub mod prelude {
    pub use vc_access::{MapPropertySource, Object, PropertiesView, Record, Value};
    pub use vc_binder::{BindError, BindHandler, BindResult, BindStrategy, Bindable, Binder};
    pub use vc_path::Path;
    pub use vc_types::{ClassBuilder, PropertyInfo, TypeExpr, TypeFactory, TypeRegistry, builtin};
}
