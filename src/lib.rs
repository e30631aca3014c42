//! Typed views over a type catalog that keep closed types, generic
//! definitions and everything in between apart.
//!
//! ```
//! use typesketch::{InMemoryCatalog, Reflect, TypeLike, Visibility};
//!
//! let mut catalog = InMemoryCatalog::new();
//! catalog.define(Some("N"), "Base3", &["T", "U"], Visibility::Public)?;
//! let reflect = Reflect::new(&catalog);
//!
//! let int = reflect.of::<i32>().apply(&[])?;
//! let string = reflect.of::<String>().apply(&[])?;
//! let closed = reflect.named_strict("N.Base3`2")?.apply(&[int, string])?;
//! assert_eq!(closed.name().source_full_name(), "global::N.Base3<int, string>");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod error;
pub mod name;
pub mod parser;
pub mod reflect;
pub mod render;
pub mod schema;
pub mod sketches;
pub mod subst;

#[cfg(test)]
mod fixtures;

pub use catalog::{InMemoryCatalog, NestedFilter, TypeCatalog};
pub use error::{CatalogError, ResolveError, SketchError};
pub use name::Name;
pub use reflect::{Reflect, Reflected, ValueType};
pub use schema::{Builtin, DefId, RawType, TypeDef, Visibility};
pub use sketches::{AnyType, ClosedType, OpenType, TypeLike, TypeSketch};
