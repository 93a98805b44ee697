//! Path recording for duck.
//!
//! Given a closure written as if it performed a nested property access or
//! assignment, [`parse`] reconstructs the dotted member path and the
//! terminal value without touching any real object graph:
//!
//! ```
//! let recording = duck_path::parse(|p| p.get("office").set("name", "Paris")).unwrap();
//! assert_eq!(recording.path(), "office.name");
//! ```
//!
//! # Modules
//!
//! - [`error`]: [`PathError`] and [`PathResult`]
//! - [`names`]: member name validation
//! - [`step`]: recorded [`Step`]s and their rendering
//! - [`recorder`]: [`Placeholder`], [`parse`], and [`Recording`]
//! - [`path`]: explicit [`Path`]s

pub mod error;
pub mod names;
pub mod path;
pub mod recorder;
pub mod step;

pub use error::{PathError, PathResult};
pub use names::validate_member_name;
pub use path::Path;
pub use recorder::{parse, IntoOperand, Placeholder, Recording};
pub use step::{BinaryOp, Operand, Step, StepKind, UnaryOp};
