#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod accessor;
mod error;
mod provider;
mod source;
mod structured;
mod value;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use accessor::{AccessKind, Accessor, ArrayAccessor, BeanAccessor, MapAccessor};
pub use accessor::{NullAccessor, PropertyAccessor, PropertyDescriptor, RecordAccessor};
pub use accessor::{ScalarAccessor, SequenceAccessor, bean_properties, record_components};
pub use error::AccessError;
pub use provider::{AccessorProvider, AccessorProviders};
pub use source::{MapPropertySource, PropertiesView, PropertyKey, PropertySource};
pub use structured::{Object, Record};
pub use value::{EnumValue, Value};
