//! Dual-partition property store for duck.
//!
//! A [`Store`] behaves at the same time as an open property bag and as a
//! statically declared object: an optional *declared* partition holds a
//! concrete value whose [`Shape`] fixes a set of typed members, and a
//! *dynamic* partition holds string-keyed members added at runtime.
//!
//! # Resolution Rules
//!
//! 1. Reads consult the dynamic partition first, then the declared one.
//! 2. Writes to a declared name are coerced to the member's type; anything
//!    else goes to the dynamic partition verbatim.
//! 3. A key never exists in both partitions.
//! 4. Enumeration yields declared members in shape order, then dynamic
//!    members in insertion order, skipping members that hold no value.
//! 5. `clear` and `remove` only ever touch the dynamic partition.
//!
//! # Modules
//!
//! - [`value`]: the dynamic [`Value`]
//! - [`shape`]: [`Shape`] descriptors and the [`Reflect`] family of traits
//! - [`field`]: [`FieldValue`], per-member conversion
//! - [`coerce`]: the coercion rule and recursive [`populate`]
//! - [`store`]: [`Store`]
//! - [`typed`]: [`TypedStore`], a store with a typed declared partition
//! - [`literal`]: anonymous [`Literal`]s
//! - [`source`]: the [`Source`] trait for readable prototypes
//! - [`config`]: [`MappingConfig`]

pub mod coerce;
pub mod config;
pub mod error;
pub mod field;
pub mod literal;
mod macros;
pub mod shape;
pub mod source;
pub mod store;
pub mod typed;
pub mod value;

#[cfg(test)]
mod fixtures;

// Re-export primary types at crate root for ergonomic imports.
pub use coerce::{coerce, populate, populate_new, Coercion};
pub use config::MappingConfig;
pub use error::{StoreError, StoreResult};
pub use field::FieldValue;
pub use literal::Literal;
pub use shape::{construct, Field, Interface, Reflect, Shape, ShapeKind, Shaped, TypeTag};
pub use source::Source;
pub use store::Store;
pub use typed::TypedStore;
pub use value::{Value, DATETIME_FORMAT};
