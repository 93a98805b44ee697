//! Structural mapping for duck.
//!
//! The [`Mapper`] moves values between [`Store`](duck_store::Store)s and
//! caller-supplied shapes: typed structs, property-only interfaces and
//! anonymous literals.
//!
//! # Operations
//!
//! - **as-if**: project a store onto a shape ([`Mapper::as_if`],
//!   [`Mapper::as_if_shape`], [`Mapper::as_view`]) or overlay it onto an
//!   existing prototype ([`Mapper::as_if_with`], [`Mapper::as_if_literal`]).
//! - **extend**: add members that don't exist yet ([`Mapper::extend`],
//!   [`Mapper::extend_with`], [`Mapper::extend_path`]).
//! - **set**: overwrite members that do exist, recursively
//!   ([`Mapper::set`]).
//! - **convert**: build plain or typed stores from any source
//!   ([`Mapper::to_store`], [`Mapper::store_from_entries`],
//!   [`Mapper::to_typed`]).
//!
//! None of the multi-member operations are transactional: a failure
//! leaves the members processed before it applied.
//!
//! # Modules
//!
//! - [`error`]: [`MapError`], [`ErrorKind`] and [`MapResult`]
//! - [`mapper`]: [`Mapper`] and the as-if family
//! - [`view`]: live interface [`View`]s and [`Mapped`]
//! - [`extend`]: extend from sources, closures and paths
//! - [`set`]: partial update from literals
//! - [`convert`]: store construction helpers
//! - [`ext`]: [`StoreExt`], the same operations as `Store` methods

pub mod convert;
pub mod error;
pub mod ext;
pub mod extend;
pub mod mapper;
pub mod set;
pub mod view;

#[cfg(test)]
mod fixtures;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{ErrorKind, MapError, MapResult};
pub use ext::StoreExt;
pub use mapper::Mapper;
pub use view::{Mapped, View};
