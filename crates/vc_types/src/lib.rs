#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod class;
mod error;
mod expr;
mod expression;
mod factory;
mod kind;
mod registry;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use cache::{NoTypeCache, Relation, SharedTypeCache, TypeCache};
pub use class::{ClassBuilder, ClassId, ClassInfo, ClassKind, ComponentInfo};
pub use class::{PropertyInfo, ScalarKind, TypeParam};
pub use error::TypeError;
pub use expr::{DisplayExpr, TypeExpr};
pub use expression::TypeExpression;
pub use factory::{MAX_DEPTH, TypeFactory};
pub use kind::{SequenceKind, StructKind, TypeKind};
pub use registry::{TypeRegistry, builtin};
