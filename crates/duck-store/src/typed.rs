use std::ops::{Deref, DerefMut};

use crate::coerce::{populate, Coercion};
use crate::error::StoreResult;
use crate::shape::Shaped;
use crate::source::Source;
use crate::store::Store;

const DECLARED_INVARIANT: &str = "typed store always has a declared partition of its own type";

/// A [`Store`] whose declared partition is a `T`.
///
/// Dereferences to the underlying store, so every dictionary and member
/// operation is available; [`TypedStore::declared`] gives typed access to
/// the declared members.
#[derive(Clone, Debug)]
pub struct TypedStore<T: Shaped> {
    store: Store,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Shaped> TypedStore<T> {
    pub fn new(declared: T) -> Self {
        Self {
            store: Store::with_declared(declared),
            _marker: std::marker::PhantomData,
        }
    }

    /// Seed a typed store from `source`: declared names are coerced into the
    /// declared partition, everything else lands in the dynamic one.
    pub fn from_prototype<S: Source + ?Sized>(source: &S) -> StoreResult<Self> {
        Self::from_prototype_with(source, &mut Coercion::default())
    }

    /// [`TypedStore::from_prototype`] with an explicit coercion context.
    pub fn from_prototype_with<S: Source + ?Sized>(
        source: &S,
        cx: &mut Coercion<'_>,
    ) -> StoreResult<Self> {
        let mut typed = Self::default();
        for (name, value) in source.members() {
            if let Some(value) = value.non_null() {
                let value = value.into_plain_with(cx)?;
                typed.store.set_with(&name, value, cx)?;
            }
        }
        Ok(typed)
    }

    pub fn declared(&self) -> &T {
        self.store.declared_as::<T>().expect(DECLARED_INVARIANT)
    }

    pub fn declared_mut(&mut self) -> &mut T {
        self.store.declared_as_mut::<T>().expect(DECLARED_INVARIANT)
    }

    /// Map the whole store, declared and dynamic, onto a fresh `T`.
    pub fn to_shape(&self) -> StoreResult<T> {
        let mut target = T::default();
        populate(&mut target, &self.store, &mut Coercion::default())?;
        Ok(target)
    }

    pub fn into_store(self) -> Store {
        self.store
    }
}

impl<T: Shaped> Default for TypedStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Shaped> Deref for TypedStore<T> {
    type Target = Store;

    fn deref(&self) -> &Store {
        &self.store
    }
}

impl<T: Shaped> DerefMut for TypedStore<T> {
    fn deref_mut(&mut self) -> &mut Store {
        &mut self.store
    }
}

impl<T: Shaped> From<TypedStore<T>> for Store {
    fn from(typed: TypedStore<T>) -> Self {
        typed.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::fixtures::{Office, Person};
    use crate::value::Value;

    #[test]
    fn declared_members_are_typed() {
        let mut typed = TypedStore::<Office>::default();
        typed.set("name", "Paris").unwrap();
        typed.add("floor", 2).unwrap();
        assert_eq!(typed.declared().name, "Paris");
        typed.declared_mut().id = 9;
        assert_eq!(typed.get("id"), Some(Value::Int(9)));
        assert!(matches!(
            typed.add("name", "x"),
            Err(StoreError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn to_shape_reads_dynamic_members_too() {
        let mut typed = TypedStore::<Office>::default();
        typed.set("name", "Paris").unwrap();
        typed.add("extra", 1).unwrap();
        let office = typed.to_shape().unwrap();
        assert_eq!(office.name, "Paris");
    }

    #[test]
    fn from_prototype_routes_declared_names() {
        let literal = crate::literal! { id: "12", name: "Rome", floor: 4 };
        let typed = TypedStore::<Office>::from_prototype(&literal).unwrap();
        assert_eq!(typed.declared().id, 12);
        assert_eq!(typed.declared().name, "Rome");
        assert_eq!(typed.dynamic().get("floor"), Some(&Value::Int(4)));
    }

    #[test]
    fn from_prototype_of_nested_shape() {
        let person = Person::sample();
        let typed = TypedStore::<Person>::from_prototype(&person).unwrap();
        assert_eq!(typed.declared(), &person);
        assert!(typed.dynamic().is_empty());
    }

    #[test]
    fn into_store_keeps_declared_partition() {
        let store: Store = TypedStore::new(Office::default()).into();
        assert!(store.declared_as::<Office>().is_some());
    }
}
