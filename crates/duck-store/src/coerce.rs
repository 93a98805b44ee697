//! Best-effort conversion of values to a member's semantic type.
//!
//! The rule, applied by [`Coercion::coerce`] and by every
//! [`FieldValue::from_value`](crate::FieldValue::from_value):
//!
//! 1. A value that already has the target type is used as is.
//! 2. A store written to a structural target is mapped, recursively, into a
//!    freshly constructed instance of that target ([`populate`]).
//! 3. Anything else goes through a scalar conversion (text to number,
//!    text to date-time, numeric widening, ...). Failure is a
//!    [`StoreError::TypeMismatch`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::trace;

use crate::config::MappingConfig;
use crate::error::{StoreError, StoreResult};
use crate::shape::{Reflect, Shaped, TypeTag};
use crate::store::Store;
use crate::value::{Value, DATETIME_FORMAT};

/// Longest rendering of an offending value kept in a mismatch error.
const MAX_REPORTED_VALUE_LEN: usize = 64;

/// Coercion context: configuration, nesting depth, and the member path
/// being written (for error messages).
#[derive(Debug)]
pub struct Coercion<'c> {
    config: &'c MappingConfig,
    depth: usize,
    path: Vec<String>,
}

impl Default for Coercion<'static> {
    fn default() -> Self {
        Coercion::new(MappingConfig::shared_default())
    }
}

impl<'c> Coercion<'c> {
    pub fn new(config: &'c MappingConfig) -> Self {
        Self {
            config,
            depth: 0,
            path: Vec::new(),
        }
    }

    pub fn config(&self) -> &'c MappingConfig {
        self.config
    }

    /// Current structural nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Dotted path of the member currently being written.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Run `f` with `member` pushed onto the member path.
    pub fn member<T, E>(
        &mut self,
        member: &str,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        self.path.push(member.to_string());
        let out = f(self);
        self.path.pop();
        out
    }

    /// Run `f` one structural level deeper, failing once the configured
    /// maximum depth is exceeded.
    pub fn nested<T, E: From<StoreError>>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        if self.depth >= self.config.max_depth {
            return Err(StoreError::StructureTooDeep {
                max_depth: self.config.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Build a [`StoreError::TypeMismatch`] for `value` at the current path.
    pub fn mismatch(&self, value: &Value, target: &TypeTag) -> StoreError {
        let mut rendered = value.to_string();
        if rendered.len() > MAX_REPORTED_VALUE_LEN {
            let mut cut = MAX_REPORTED_VALUE_LEN;
            while !rendered.is_char_boundary(cut) {
                cut -= 1;
            }
            rendered.truncate(cut);
            rendered.push_str("...");
        }
        StoreError::TypeMismatch {
            value: rendered,
            source_type: value.type_name().to_string(),
            member: if self.path.is_empty() {
                "<value>".to_string()
            } else {
                self.path()
            },
            target_type: target.to_string(),
        }
    }

    /// Convert `value` to `target`, returning a value of the target type.
    pub fn coerce(&mut self, value: Value, target: &TypeTag) -> StoreResult<Value> {
        match (target, value) {
            (TypeTag::Any, value) => Ok(value),
            (TypeTag::Optional(_), Value::Null) => Ok(Value::Null),
            (TypeTag::Optional(inner), value) => self.coerce(value, inner),
            (target, Value::Null) => Err(self.mismatch(&Value::Null, target)),

            (TypeTag::Bool, value) => self.to_bool(value).map(Value::Bool),
            (TypeTag::Int, value) => self.to_int(value).map(Value::Int),
            (TypeTag::Float, value) => self.to_float(value).map(Value::Float),
            (TypeTag::Text, value) => self.to_text(value).map(Value::Text),
            (TypeTag::DateTime, value) => self.to_datetime(value).map(Value::DateTime),

            (TypeTag::Store, Value::Store(store)) => Ok(Value::Store(store)),
            (TypeTag::List(inner), Value::List(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    out.push(self.member(&i.to_string(), |cx| cx.coerce(item, inner))?);
                }
                Ok(Value::List(out))
            }
            (TypeTag::Shape(shape), Value::Store(store)) => match shape.constructor() {
                Some(construct) => {
                    let mut instance = construct();
                    populate(instance.as_mut(), &store, self)?;
                    Ok(Value::Store(Store::snapshot(instance.as_ref())))
                }
                None => Ok(Value::Store(store)),
            },
            (target, value) => Err(self.mismatch(&value, target)),
        }
    }

    fn to_bool(&self, value: Value) -> StoreResult<bool> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            Value::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(self.mismatch(&value, &TypeTag::Bool)),
            },
            other => Err(self.mismatch(&other, &TypeTag::Bool)),
        }
    }

    fn to_int(&self, value: Value) -> StoreResult<i64> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Bool(b) => Ok(i64::from(b)),
            Value::Float(x) => self.float_to_int(x).ok_or_else(|| self.mismatch(&value, &TypeTag::Int)),
            Value::Text(ref s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(|x| self.float_to_int(x)))
                    .ok_or_else(|| self.mismatch(&value, &TypeTag::Int))
            }
            other => Err(self.mismatch(&other, &TypeTag::Int)),
        }
    }

    fn float_to_int(&self, x: f64) -> Option<i64> {
        // i64::MAX is not exactly representable; stay strictly inside the range.
        if !x.is_finite() || x < i64::MIN as f64 || x >= i64::MAX as f64 {
            return None;
        }
        if x.fract() == 0.0 || self.config.lossy_numeric {
            Some(x.trunc() as i64)
        } else {
            None
        }
    }

    fn to_float(&self, value: Value) -> StoreResult<f64> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
            Value::Text(ref s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.mismatch(&value, &TypeTag::Float)),
            other => Err(self.mismatch(&other, &TypeTag::Float)),
        }
    }

    fn to_text(&self, value: Value) -> StoreResult<String> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
            Value::DateTime(dt) => Ok(dt.format(DATETIME_FORMAT).to_string()),
            other => Err(self.mismatch(&other, &TypeTag::Text)),
        }
    }

    fn to_datetime(&self, value: Value) -> StoreResult<NaiveDateTime> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Text(ref s) => self
                .parse_datetime(s.trim())
                .ok_or_else(|| self.mismatch(&value, &TypeTag::DateTime)),
            other => Err(self.mismatch(&other, &TypeTag::DateTime)),
        }
    }

    fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        for format in &self.config.datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(dt);
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date.and_time(NaiveTime::MIN));
            }
        }
        DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc())
    }
}

/// Copy every non-null value in `source` whose name matches a declared
/// member of `target` into that member, coercing as it goes. Members with
/// no corresponding entry keep their current value.
pub fn populate(target: &mut dyn Reflect, source: &Store, cx: &mut Coercion<'_>) -> StoreResult<()> {
    cx.nested(|cx| {
        let shape = target.shape();
        for field in shape.fields {
            let Some(value) = source.get(field.name).and_then(Value::non_null) else {
                continue;
            };
            trace!(shape = shape.name, member = field.name, "populate member");
            target.set_field(field.name, value, cx)?;
        }
        Ok(())
    })
}

/// Build a fresh `T` from a structural value (coercion rule 2).
pub fn populate_new<T: Shaped>(value: Value, cx: &mut Coercion<'_>) -> StoreResult<T> {
    match value {
        Value::Store(store) => {
            if store.dynamic().is_empty() {
                if let Some(same) = store.declared_as::<T>() {
                    return Ok(same.clone());
                }
            }
            let mut target = T::default();
            populate(&mut target, &store, cx)?;
            Ok(target)
        }
        other => Err(cx.mismatch(&other, &TypeTag::Shape(T::SHAPE))),
    }
}

/// Coerce with the shared default configuration.
pub fn coerce(value: Value, target: &TypeTag) -> StoreResult<Value> {
    Coercion::default().coerce(value, target)
}
