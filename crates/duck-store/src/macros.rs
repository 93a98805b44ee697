//! Declarative macros for shapes, interfaces, and literals.

/// Declare a struct together with its [`Shape`](crate::Shape), and implement
/// [`Reflect`](crate::Reflect), [`Shaped`](crate::Shaped) and
/// [`FieldValue`](crate::FieldValue) for it.
///
/// Every field type must implement `FieldValue`. The struct must derive (or
/// implement) `Default`, `Clone` and `Debug`.
///
/// ```
/// duck_store::shape! {
///     #[derive(Clone, Debug, Default)]
///     pub struct Office {
///         pub name: String,
///         pub floor: Option<i64>,
///     }
/// }
/// use duck_store::Shaped;
/// assert_eq!(Office::SHAPE.fields.len(), 2);
/// ```
#[macro_export]
macro_rules! shape {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Shaped for $name {
            const SHAPE: &'static $crate::Shape = &$crate::Shape {
                name: stringify!($name),
                kind: $crate::ShapeKind::Concrete {
                    construct: Some($crate::construct::<$name>),
                },
                fields: &[
                    $(
                        $crate::Field {
                            name: stringify!($field),
                            ty: <$ty as $crate::FieldValue>::type_tag,
                        },
                    )*
                ],
            };
        }

        impl $crate::Reflect for $name {
            fn shape(&self) -> &'static $crate::Shape {
                <Self as $crate::Shaped>::SHAPE
            }

            fn get_field(&self, name: &str) -> Option<$crate::Value> {
                match name {
                    $( stringify!($field) => Some($crate::FieldValue::to_value(&self.$field)), )*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: $crate::Value,
                cx: &mut $crate::Coercion<'_>,
            ) -> $crate::StoreResult<()> {
                match name {
                    $(
                        stringify!($field) => cx.member(name, |cx| {
                            self.$field = <$ty as $crate::FieldValue>::from_value(value, cx)?;
                            Ok(())
                        }),
                    )*
                    _ => Err($crate::StoreError::MemberNotFound {
                        name: name.to_string(),
                    }),
                }
            }

            fn has_value(&self, name: &str) -> bool {
                match name {
                    $( stringify!($field) => !$crate::FieldValue::is_unset(&self.$field), )*
                    _ => false,
                }
            }

            fn field_mut(&mut self, name: &str) -> Option<&mut dyn $crate::Reflect> {
                match name {
                    $( stringify!($field) => $crate::FieldValue::as_reflect_mut(&mut self.$field), )*
                    _ => None,
                }
            }

            fn clone_reflect(&self) -> Box<dyn $crate::Reflect> {
                Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::FieldValue for $name {
            fn type_tag() -> $crate::TypeTag {
                $crate::TypeTag::Shape(<Self as $crate::Shaped>::SHAPE)
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Store($crate::Store::snapshot(self))
            }

            fn from_value(
                value: $crate::Value,
                cx: &mut $crate::Coercion<'_>,
            ) -> $crate::StoreResult<Self> {
                $crate::populate_new::<Self>(value, cx)
            }

            fn as_reflect_mut(&mut self) -> Option<&mut dyn $crate::Reflect> {
                Some(self)
            }

            fn is_unset(&self) -> bool {
                false
            }
        }
    };
}

/// Declare a property-only interface: a marker type whose
/// [`Interface::SHAPE`](crate::Interface::SHAPE) lists the members a live
/// view over a store exposes. Names listed under `methods` are behaviour
/// members; the mapper refuses to proxy interfaces that have any.
///
/// ```
/// duck_store::interface! {
///     pub Department { id: i64, name: String }
/// }
/// use duck_store::Interface;
/// assert!(Department::SHAPE.methods().is_empty());
/// ```
#[macro_export]
macro_rules! interface {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident {
            $( $field:ident : $ty:ty ),* $(,)?
        }
        $( methods [ $( $method:ident ),* $(,)? ] )?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        $vis struct $name;

        impl $crate::Interface for $name {
            const SHAPE: &'static $crate::Shape = &$crate::Shape {
                name: stringify!($name),
                kind: $crate::ShapeKind::Interface {
                    methods: &[ $( $( stringify!($method) ),* )? ],
                },
                fields: &[
                    $(
                        $crate::Field {
                            name: stringify!($field),
                            ty: <$ty as $crate::FieldValue>::type_tag,
                        },
                    )*
                ],
            };
        }
    };
}

/// Build an anonymous [`Literal`](crate::Literal).
///
/// Values are single token trees: literals, identifiers, or parenthesised
/// expressions. A braced value becomes a nested literal.
///
/// ```
/// let literal = duck_store::literal! { office: { name: "Paris" }, id: 3 };
/// assert_eq!(literal.to_string(), "{office: {name: Paris}, id: 3}");
/// ```
#[macro_export]
macro_rules! literal {
    (@value { $($inner:tt)* }) => {
        $crate::literal! { $($inner)* }
    };
    (@value $value:expr) => {
        $value
    };
    ($( $key:ident : $value:tt ),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut literal = $crate::Literal::new();
        $( literal.push(stringify!($key), $crate::literal!(@value $value)); )*
        literal
    }};
}
