#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod entries;
mod kind;
mod parser;
mod path;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use entries::{Entries, Segment};
pub use kind::SegmentKind;
pub use parser::{DEFAULT_SEPARATOR, PathParser};
pub use path::Path;
