//! Per-member conversion between typed slots and [`Value`]s.

use chrono::{NaiveDate, NaiveDateTime};

use crate::coerce::Coercion;
use crate::error::StoreResult;
use crate::shape::{Reflect, TypeTag};
use crate::store::Store;
use crate::value::Value;

/// Conversion contract for a declared member's Rust type.
///
/// [`shape!`](crate::shape!) requires it of every field type. Implement it
/// by hand for types the crate does not cover, such as enums stored as text.
pub trait FieldValue: Sized {
    /// Semantic type of the member, used as the coercion target.
    fn type_tag() -> TypeTag;

    /// Current value of the slot.
    fn to_value(&self) -> Value;

    /// Build a slot value from `value`, applying the coercion rule.
    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self>;

    /// Live access for composite members, `None` for scalars.
    fn as_reflect_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    /// Whether the slot holds no value, i.e. [`FieldValue::to_value`] would
    /// be null.
    fn is_unset(&self) -> bool {
        self.to_value().is_null()
    }
}

/// Coerce `value` to `tag` and extract it with `pick`. `pick` only sees
/// values of the tag's own variant, so its `None` arm is unreachable in
/// practice but still reported as a mismatch.
fn coerced<T>(
    value: Value,
    tag: TypeTag,
    cx: &mut Coercion<'_>,
    pick: impl FnOnce(&Value) -> Option<T>,
) -> StoreResult<T> {
    let out = cx.coerce(value, &tag)?;
    pick(&out).ok_or_else(|| cx.mismatch(&out, &tag))
}

impl FieldValue for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        coerced(value, TypeTag::Bool, cx, Value::as_bool)
    }
}

impl FieldValue for i64 {
    fn type_tag() -> TypeTag {
        TypeTag::Int
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        coerced(value, TypeTag::Int, cx, Value::as_int)
    }
}

macro_rules! narrow_int_field {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::Int
            }

            fn to_value(&self) -> Value {
                Value::from(*self)
            }

            fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
                let original = value.clone();
                let wide = i64::from_value(value, cx)?;
                <$ty>::try_from(wide).map_err(|_| cx.mismatch(&original, &TypeTag::Int))
            }
        }
    )*};
}

narrow_int_field!(i32, u32);

/// Values above `i64::MAX` are written as decimal text so they read back
/// exactly; integral floats up to `u64::MAX` are accepted on the way in.
impl FieldValue for u64 {
    fn type_tag() -> TypeTag {
        TypeTag::Int
    }

    fn to_value(&self) -> Value {
        match i64::try_from(*self) {
            Ok(small) => Value::Int(small),
            Err(_) => Value::Text(self.to_string()),
        }
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        match &value {
            Value::Int(i) => {
                return u64::try_from(*i).map_err(|_| cx.mismatch(&value, &TypeTag::Int));
            }
            // `u64::MAX as f64` is 2^64; the cast saturates it back to `u64::MAX`.
            Value::Float(x) if x.fract() == 0.0 && *x >= 0.0 && *x <= u64::MAX as f64 => {
                return Ok(*x as u64);
            }
            Value::Text(text) => {
                if let Ok(parsed) = text.trim().parse::<u64>() {
                    return Ok(parsed);
                }
            }
            _ => {}
        }
        let original = value.clone();
        let wide = i64::from_value(value, cx)?;
        u64::try_from(wide).map_err(|_| cx.mismatch(&original, &TypeTag::Int))
    }
}

impl FieldValue for f64 {
    fn type_tag() -> TypeTag {
        TypeTag::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        coerced(value, TypeTag::Float, cx, |v| match v {
            Value::Float(x) => Some(*x),
            _ => None,
        })
    }
}

impl FieldValue for f32 {
    fn type_tag() -> TypeTag {
        TypeTag::Float
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        f64::from_value(value, cx).map(|x| x as f32)
    }
}

impl FieldValue for String {
    fn type_tag() -> TypeTag {
        TypeTag::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        match cx.coerce(value, &TypeTag::Text)? {
            Value::Text(s) => Ok(s),
            other => Err(cx.mismatch(&other, &TypeTag::Text)),
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn type_tag() -> TypeTag {
        TypeTag::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        coerced(value, TypeTag::DateTime, cx, Value::as_datetime)
    }
}

impl FieldValue for NaiveDate {
    fn type_tag() -> TypeTag {
        TypeTag::DateTime
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        NaiveDateTime::from_value(value, cx).map(|dt| dt.date())
    }
}

impl FieldValue for Value {
    fn type_tag() -> TypeTag {
        TypeTag::Any
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value, _cx: &mut Coercion<'_>) -> StoreResult<Self> {
        Ok(value)
    }

    fn is_unset(&self) -> bool {
        self.is_null()
    }
}

impl FieldValue for Store {
    fn type_tag() -> TypeTag {
        TypeTag::Store
    }

    fn to_value(&self) -> Value {
        Value::Store(self.clone())
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        match value {
            Value::Store(store) => Ok(store),
            other => Err(cx.mismatch(&other, &TypeTag::Store)),
        }
    }

    fn is_unset(&self) -> bool {
        false
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::Optional(Box::new(T::type_tag()))
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value, cx).map(Some)
    }

    fn as_reflect_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().and_then(T::as_reflect_mut)
    }

    fn is_unset(&self) -> bool {
        self.as_ref().map_or(true, T::is_unset)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::List(Box::new(T::type_tag()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value, cx: &mut Coercion<'_>) -> StoreResult<Self> {
        match value {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| cx.member(&i.to_string(), |cx| T::from_value(item, cx)))
                .collect(),
            other => Err(cx.mismatch(&other, &Self::type_tag())),
        }
    }

    fn is_unset(&self) -> bool {
        false
    }
}
