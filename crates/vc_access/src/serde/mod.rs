//! [`Value`](crate::Value) as a serde data model.
//!
//! - [`Serialize`](serde_core::Serialize) writes a value out in the plain
//!   data model: scalars as scalars, containers and structured values as
//!   sequences and maps.
//! - [`Deserialize`](serde_core::Deserialize) reads any self-describing
//!   input into a value.
//! - `Value` is itself a [`Deserializer`](serde_core::Deserializer), so a
//!   bound value can be turned into any `T: Deserialize`.
//!
//! ```
//! use serde::Deserialize;
//! use vc_access::Value;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let value = Value::map([("host", Value::from("localhost")), ("port", Value::from(8080))]);
//! let server = Server::deserialize(value).unwrap();
//! assert_eq!(server, Server { host: "localhost".into(), port: 8080 });
//! ```

// -----------------------------------------------------------------------------
// Modules

mod de;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use de::ValueError;
