//! Static shape descriptors and the reflection traits built on them.
//!
//! A [`Shape`] describes the declared members of a type: their names, in
//! reflection order, and their semantic [`TypeTag`]s. Types opt in through
//! the [`shape!`](crate::shape!) and [`interface!`](crate::interface!)
//! macros, or by implementing [`Reflect`] by hand.
//!
//! Field types are reached through `fn() -> TypeTag` rather than stored
//! inline so that shapes can refer to each other (including themselves)
//! without const-evaluation cycles.

use std::any::Any;
use std::fmt;

use crate::coerce::Coercion;
use crate::error::StoreResult;
use crate::field::FieldValue;
use crate::value::Value;

/// Static description of a declared type.
#[derive(Debug)]
pub struct Shape {
    /// Type name, used in error messages and for shape identity.
    pub name: &'static str,
    pub kind: ShapeKind,
    /// Declared members in reflection order.
    pub fields: &'static [Field],
}

/// What kind of target a [`Shape`] describes.
#[derive(Debug)]
pub enum ShapeKind {
    /// A concrete type. `construct` is its no-argument constructor, or
    /// `None` when the type cannot be built without arguments.
    Concrete {
        construct: Option<fn() -> Box<dyn Reflect>>,
    },
    /// A property-only interface description. Any entry in `methods` is a
    /// behaviour member, which the mapper refuses to proxy.
    Interface { methods: &'static [&'static str] },
    /// The untyped marker: mapping to it reinterprets the store as is.
    Dynamic,
}

impl Shape {
    /// The untyped marker shape.
    pub const DYNAMIC: Shape = Shape {
        name: "dynamic",
        kind: ShapeKind::Dynamic,
        fields: &[],
    };

    /// Look up a declared member by name.
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared member names in reflection order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ShapeKind::Interface { .. })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, ShapeKind::Dynamic)
    }

    /// Behaviour members declared by an interface shape.
    pub fn methods(&self) -> &'static [&'static str] {
        match self.kind {
            ShapeKind::Interface { methods } => methods,
            _ => &[],
        }
    }

    /// The no-argument constructor of a concrete shape.
    pub fn constructor(&self) -> Option<fn() -> Box<dyn Reflect>> {
        match self.kind {
            ShapeKind::Concrete { construct } => construct,
            _ => None,
        }
    }
}

/// A declared member of a [`Shape`].
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub ty: fn() -> TypeTag,
}

impl Field {
    pub fn type_tag(&self) -> TypeTag {
        (self.ty)()
    }
}

/// Semantic type of a declared member; the target of coercion.
#[derive(Clone, Debug)]
pub enum TypeTag {
    /// Accepts any value unchanged.
    Any,
    Bool,
    Int,
    Float,
    Text,
    DateTime,
    /// A nested store of unknown shape.
    Store,
    Optional(Box<TypeTag>),
    List(Box<TypeTag>),
    /// A nested declared type.
    Shape(&'static Shape),
}

impl TypeTag {
    /// Returns `true` when values of this type are descended into.
    pub fn is_structural(&self) -> bool {
        match self {
            TypeTag::Store | TypeTag::Shape(_) => true,
            TypeTag::Optional(inner) => inner.is_structural(),
            _ => false,
        }
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeTag::Any, TypeTag::Any)
            | (TypeTag::Bool, TypeTag::Bool)
            | (TypeTag::Int, TypeTag::Int)
            | (TypeTag::Float, TypeTag::Float)
            | (TypeTag::Text, TypeTag::Text)
            | (TypeTag::DateTime, TypeTag::DateTime)
            | (TypeTag::Store, TypeTag::Store) => true,
            (TypeTag::Optional(a), TypeTag::Optional(b)) | (TypeTag::List(a), TypeTag::List(b)) => {
                a == b
            }
            // Consts may be duplicated per use site, so compare by name.
            (TypeTag::Shape(a), TypeTag::Shape(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Any => f.write_str("any"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Int => f.write_str("int"),
            TypeTag::Float => f.write_str("float"),
            TypeTag::Text => f.write_str("text"),
            TypeTag::DateTime => f.write_str("datetime"),
            TypeTag::Store => f.write_str("store"),
            TypeTag::Optional(inner) => write!(f, "option<{inner}>"),
            TypeTag::List(inner) => write!(f, "list<{inner}>"),
            TypeTag::Shape(shape) => f.write_str(shape.name),
        }
    }
}

/// Object-safe access to an instance's declared members.
pub trait Reflect: Any + fmt::Debug {
    fn shape(&self) -> &'static Shape;

    /// Read a declared member. `None` if the shape has no such member;
    /// `Some(Value::Null)` if it has one without a value.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// `true` if `name` is a declared member currently holding a value.
    fn has_value(&self, name: &str) -> bool {
        self.get_field(name).is_some_and(|value| !value.is_null())
    }

    /// Coerce `value` to the member's type and write it.
    fn set_field(&mut self, name: &str, value: Value, cx: &mut Coercion<'_>) -> StoreResult<()>;

    /// Live access to a nested composite member, `None` for scalars.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect>;

    fn clone_reflect(&self) -> Box<dyn Reflect>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Reflect + 'a {
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// `(name, value)` for every declared member, in reflection order.
    pub fn members(&self) -> Vec<(&'static str, Value)> {
        self.shape()
            .fields
            .iter()
            .map(|f| (f.name, self.get_field(f.name).unwrap_or_default()))
            .collect()
    }
}

impl Clone for Box<dyn Reflect> {
    fn clone(&self) -> Self {
        self.clone_reflect()
    }
}

/// A concrete declared type with a no-argument constructor.
pub trait Shaped: Reflect + FieldValue + Default + Clone {
    const SHAPE: &'static Shape;
}

/// A property-only interface description.
pub trait Interface {
    const SHAPE: &'static Shape;
}

/// Constructor thunk stored in [`ShapeKind::Concrete`].
pub fn construct<T: Shaped>() -> Box<dyn Reflect> {
    Box::new(T::default())
}
