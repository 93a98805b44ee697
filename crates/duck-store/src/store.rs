//! The dual-partition property store.
//!
//! A [`Store`] holds an optional *declared* partition, a concrete object whose
//! shape fixes a set of typed members, and a *dynamic* partition of
//! string-keyed values added at runtime. Lookups consult the dynamic
//! partition first and the declared partition second; a key never lives in
//! both.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::coerce::Coercion;
use crate::error::{StoreError, StoreResult};
use crate::shape::{Reflect, Shape};
use crate::source::Source;
use crate::value::Value;

/// A property bag with an optional statically declared partition.
#[derive(Clone, Debug, Default)]
pub struct Store {
    declared: Option<Box<dyn Reflect>>,
    dynamic: IndexMap<String, Value>,
}

impl Store {
    /// An empty store with no declared partition.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose declared partition is `declared`.
    pub fn with_declared<T: Reflect>(declared: T) -> Self {
        Self::with_declared_boxed(Box::new(declared))
    }

    pub fn with_declared_boxed(declared: Box<dyn Reflect>) -> Self {
        Self {
            declared: Some(declared),
            dynamic: IndexMap::new(),
        }
    }

    /// A plain store holding the current non-null members of `object`.
    pub fn snapshot(object: &dyn Reflect) -> Self {
        object
            .members()
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Recursively copy every readable, non-null member of `source` into a
    /// new plain store. Nested composite values become nested plain stores.
    /// The recursion is unbounded; see [`Store::from_prototype_with`].
    pub fn from_prototype<S: Source + ?Sized>(source: &S) -> Self {
        source
            .members()
            .into_iter()
            .filter_map(|(name, value)| value.non_null().map(|v| (name, v.into_plain())))
            .collect()
    }

    /// [`Store::from_prototype`] bounded by `cx`. The copy counts as one
    /// level and every nested store as one more; past the configured
    /// maximum it fails with [`StoreError::StructureTooDeep`].
    pub fn from_prototype_with<S: Source + ?Sized>(
        source: &S,
        cx: &mut Coercion<'_>,
    ) -> StoreResult<Self> {
        cx.nested(|cx| {
            let mut store = Store::new();
            for (name, value) in source.members() {
                if let Some(value) = value.non_null() {
                    let value = value.into_plain_with(cx)?;
                    store.insert_dynamic(name, value);
                }
            }
            Ok(store)
        })
    }

    /// Shape of the declared partition, or [`Shape::DYNAMIC`] without one.
    pub fn shape(&self) -> &'static Shape {
        match &self.declared {
            Some(declared) => declared.shape(),
            None => &Shape::DYNAMIC,
        }
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Dictionary-style lookup: dynamic partition first, then declared.
    ///
    /// A declared member without a value resolves to `Some(Value::Null)`;
    /// an unknown key to `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.dynamic.get(key) {
            return Some(value.clone());
        }
        self.declared.as_ref().and_then(|d| d.get_field(key))
    }

    /// Borrow a dynamic entry.
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        self.dynamic.get(key)
    }

    /// Mutably borrow a dynamic entry.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.dynamic.get_mut(key)
    }

    /// Member-style lookup; unknown names are an error.
    pub fn member(&self, name: &str) -> StoreResult<Value> {
        self.get(name).ok_or_else(|| StoreError::MemberNotFound {
            name: name.to_string(),
        })
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Write `value` under `key`. Declared members are coerced to their
    /// type; anything else lands verbatim in the dynamic partition.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> StoreResult<()> {
        self.set_with(key, value.into(), &mut Coercion::default())
    }

    /// Member-style write, identical to [`Store::set`].
    pub fn set_member(&mut self, name: &str, value: impl Into<Value>) -> StoreResult<()> {
        self.set(name, value)
    }

    /// [`Store::set`] with an explicit coercion context.
    pub fn set_with(&mut self, key: &str, value: Value, cx: &mut Coercion<'_>) -> StoreResult<()> {
        if let Some(declared) = self.declared.as_mut() {
            if declared.shape().field(key).is_some() {
                trace!(member = key, shape = declared.shape().name, "set declared member");
                return declared.set_field(key, value, cx);
            }
        }
        trace!(member = key, "set dynamic member");
        self.dynamic.insert(key.to_string(), value);
        Ok(())
    }

    /// Append a new dynamic member. Fails if `key` exists in either partition.
    pub fn add(&mut self, key: &str, value: impl Into<Value>) -> StoreResult<()> {
        if self.contains_key(key) {
            return Err(StoreError::DuplicateKey {
                key: key.to_string(),
            });
        }
        trace!(member = key, "add dynamic member");
        self.dynamic.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Insert into the dynamic partition without the declared-name check.
    pub(crate) fn insert_dynamic(&mut self, key: String, value: Value) {
        self.dynamic.insert(key, value);
    }

    /// Remove a dynamic member. Declared names are never removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.dynamic.shift_remove(key).is_some()
    }

    /// Remove a dynamic member only if it currently holds `value`.
    pub fn remove_entry(&mut self, key: &str, value: &Value) -> bool {
        if self.dynamic.get(key) == Some(value) {
            self.dynamic.shift_remove(key);
            true
        } else {
            false
        }
    }

    /// Drop every dynamic member. Declared values are untouched.
    pub fn clear(&mut self) {
        self.dynamic.clear();
    }

    // ---------------------------------------------------------------
    // Enumeration
    // ---------------------------------------------------------------

    /// Non-null members: declared ones in shape order, then dynamic ones in
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        let declared = self
            .declared
            .iter()
            .flat_map(|d| d.as_ref().members())
            .map(|(name, value)| (name.to_string(), value));
        let dynamic = self.dynamic_present().map(|(k, v)| (k.clone(), v.clone()));
        declared.filter(|(_, value)| !value.is_null()).chain(dynamic)
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.declared_present()
            .map(str::to_string)
            .chain(self.dynamic_present().map(|(key, _)| key.clone()))
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Number of enumerated (non-null) members.
    pub fn len(&self) -> usize {
        self.declared_present().count() + self.dynamic_present().count()
    }

    pub fn is_empty(&self) -> bool {
        self.declared_present().next().is_none() && self.dynamic_present().next().is_none()
    }

    /// Declared names holding a value, in shape order.
    fn declared_present(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.declared.iter().flat_map(|declared| {
            let declared = declared.as_ref();
            declared
                .shape()
                .fields
                .iter()
                .map(|field| field.name)
                .filter(move |name| declared.has_value(name))
        })
    }

    fn dynamic_present(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.dynamic.iter().filter(|(_, value)| !value.is_null())
    }

    /// Whether `key` resolves to `value`, comparing dynamic members in place.
    fn holds(&self, key: &str, value: &Value) -> bool {
        match self.dynamic.get(key) {
            Some(mine) => mine == value,
            None => self.declared.as_ref().and_then(|d| d.get_field(key)).as_ref() == Some(value),
        }
    }

    /// `true` for dynamic keys and for every declared name, set or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.dynamic.contains_key(key) || self.is_declared(key)
    }

    /// `true` when `key` resolves to a non-null value equal to `value`.
    pub fn contains(&self, key: &str, value: &Value) -> bool {
        !value.is_null() && self.holds(key, value)
    }

    /// Copy the enumerated members into `dest` starting at `index`.
    pub fn copy_to(&self, dest: &mut [(String, Value)], index: usize) -> StoreResult<()> {
        let entries: Vec<_> = self.iter().collect();
        let room = dest.len().checked_sub(index).ok_or_else(|| {
            StoreError::InvalidArgument(format!(
                "index {index} is past the end of a destination of length {}",
                dest.len()
            ))
        })?;
        if room < entries.len() {
            return Err(StoreError::InvalidArgument(format!(
                "destination has room for {room} entries, {} needed",
                entries.len()
            )));
        }
        for (slot, entry) in dest[index..].iter_mut().zip(entries) {
            *slot = entry;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Partitions
    // ---------------------------------------------------------------

    pub fn declared(&self) -> Option<&dyn Reflect> {
        self.declared.as_deref()
    }

    pub fn declared_mut(&mut self) -> Option<&mut dyn Reflect> {
        match &mut self.declared {
            Some(declared) => Some(declared.as_mut()),
            None => None,
        }
    }

    /// The declared partition as a concrete type.
    pub fn declared_as<T: Reflect>(&self) -> Option<&T> {
        self.declared().and_then(|d| d.downcast_ref::<T>())
    }

    pub fn declared_as_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.declared_mut().and_then(|d| d.downcast_mut::<T>())
    }

    /// Declared member names in shape order.
    pub fn declared_names(&self) -> Vec<&'static str> {
        self.shape().field_names().collect()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.shape().field(name).is_some()
    }

    pub fn dynamic(&self) -> &IndexMap<String, Value> {
        &self.dynamic
    }
}

impl Value {
    /// Normalise nested stores to plain stores, recursing through lists.
    pub fn into_plain(self) -> Value {
        match self {
            Value::Store(store) => Value::Store(Store::from_prototype(&store)),
            Value::List(items) => Value::List(items.into_iter().map(Value::into_plain).collect()),
            other => other,
        }
    }

    /// [`Value::into_plain`] with nested stores counted against `cx`.
    pub fn into_plain_with(self, cx: &mut Coercion<'_>) -> StoreResult<Value> {
        match self {
            Value::Store(store) => Store::from_prototype_with(&store, cx).map(Value::Store),
            Value::List(items) => items
                .into_iter()
                .map(|item| item.into_plain_with(cx))
                .collect::<StoreResult<Vec<_>>>()
                .map(Value::List),
            other => Ok(other),
        }
    }
}

impl FromIterator<(String, Value)> for Store {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut store = Store::new();
        for (key, value) in iter {
            store.insert_dynamic(key, value);
        }
        store
    }
}

impl TryFrom<Value> for Store {
    type Error = StoreError;

    fn try_from(value: Value) -> StoreResult<Self> {
        match value {
            Value::Store(store) => Ok(store),
            other => Err(StoreError::InvalidArgument(format!(
                "a {} value is not structural and can't become a store",
                other.type_name()
            ))),
        }
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .dynamic_present()
                .all(|(key, value)| other.holds(key, value))
            && self.declared_present().all(|name| {
                self.declared
                    .as_ref()
                    .and_then(|d| d.get_field(name))
                    .is_some_and(|value| other.holds(name, &value))
            })
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Store {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IndexMap::<String, Value>::deserialize(deserializer).map(|map| map.into_iter().collect())
    }
}
