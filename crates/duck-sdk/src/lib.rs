//! duck: an open property bag that is also a statically declared object,
//! plus the mapping algorithms between the two.
//!
//! This crate re-exports the public surface of the workspace. Most users
//! want the [`prelude`]:
//!
//! ```
//! use duck_sdk::prelude::*;
//!
//! let mut store = Store::new();
//! store.extend_with(|p| p.get("office").set("name", "London")).unwrap();
//! store.set_from(&literal! { office: { name: "Paris" } }).unwrap();
//! let office = store.get("office").and_then(Value::into_store).unwrap();
//! assert_eq!(office.get("name"), Some(Value::from("Paris")));
//! ```

pub mod duck;
pub mod error;

pub use duck::Duck;
pub use error::{DuckError, DuckResult};

// Re-export key types
pub use duck_map::{ErrorKind, MapError, MapResult, Mapped, Mapper, StoreExt, View};
pub use duck_path::{
    parse, validate_member_name, BinaryOp, IntoOperand, Operand, Path, PathError, PathResult,
    Placeholder, Recording, Step, StepKind, UnaryOp,
};
pub use duck_store::{
    coerce, construct, populate, populate_new, Coercion, Field, FieldValue, Interface, Literal,
    MappingConfig, Reflect, Shape, ShapeKind, Shaped, Source, Store, StoreError, StoreResult,
    TypeTag, TypedStore, Value, DATETIME_FORMAT,
};
pub use duck_store::{interface, literal, shape};

/// The types and traits needed for everyday use.
pub mod prelude {
    pub use crate::{Duck, DuckError, DuckResult};
    pub use duck_map::{ErrorKind, Mapper, StoreExt};
    pub use duck_path::{parse, Path, Placeholder};
    pub use duck_store::{
        interface, literal, shape, FieldValue, Interface, Literal, MappingConfig, Reflect,
        Shaped, Source, Store, TypedStore, Value,
    };
}
