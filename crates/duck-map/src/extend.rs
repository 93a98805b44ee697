//! Adding members to a store: from a source, a recorded closure, or an
//! explicit path.

use duck_path::{Path, Placeholder};
use duck_store::{Coercion, Source, Store, StoreError, StoreResult, Value};
use tracing::{debug, trace};

use crate::error::{MapError, MapResult};
use crate::mapper::Mapper;

impl Mapper {
    /// Add every non-null member of `source` to `store`.
    ///
    /// A member whose key already exists fails with
    /// [`StoreError::DuplicateKey`]. Members added before the failure stay
    /// added.
    pub fn extend<S: Source + ?Sized>(&self, store: &mut Store, source: &S) -> MapResult<()> {
        debug!(source = source.shape_name(), members = store.len(), "extend");
        extend_into(store, source.members(), &mut self.coercion())?;
        Ok(())
    }

    /// Record `f` as a member path and add its assigned value at that path.
    ///
    /// ```
    /// use duck_map::Mapper;
    /// use duck_store::{Store, Value};
    ///
    /// let mut store = Store::new();
    /// Mapper::new()
    ///     .extend_with(&mut store, |p| p.get("a").get("b").set("c", 42))
    ///     .unwrap();
    /// let a = store.get("a").unwrap();
    /// let b = a.as_store().unwrap().get("b").unwrap();
    /// assert_eq!(b.as_store().unwrap().get("c"), Some(Value::Int(42)));
    /// ```
    ///
    /// A closure that assigns nothing leaves the store unchanged.
    pub fn extend_with<'s, F, R>(&self, store: &'s mut Store, f: F) -> MapResult<&'s mut Store>
    where
        F: FnOnce(Placeholder) -> R,
    {
        let recording = duck_path::parse(f)?;
        match recording.value() {
            None | Some(Value::Null) => {
                debug!(expression = %recording, "extend_with assigned nothing");
                Ok(store)
            }
            Some(value) => {
                let path = recording.to_path()?;
                self.extend_path(store, &path, value.clone())
            }
        }
    }

    /// Add `value` under `path`, creating the intermediate stores that are
    /// missing. The last segment must not exist yet.
    pub fn extend_path<'s>(
        &self,
        store: &'s mut Store,
        path: &Path,
        value: impl Into<Value>,
    ) -> MapResult<&'s mut Store> {
        let Some((last, parents)) = path.split_last() else {
            return Err(MapError::InvalidArgument("empty member path".into()));
        };
        if parents.len() >= self.config().max_depth {
            return Err(StoreError::StructureTooDeep {
                max_depth: self.config().max_depth,
            }
            .into());
        }
        debug!(path = %path, "extend along path");
        let value: Value = value.into();
        let innermost = descend(&mut *store, parents)?;
        let value = value.into_plain_with(&mut self.coercion())?;
        innermost.add(last, value)?;
        Ok(store)
    }
}

fn extend_into(
    store: &mut Store,
    members: Vec<(String, Value)>,
    cx: &mut Coercion<'_>,
) -> StoreResult<()> {
    cx.nested(|cx| {
        for (name, value) in members {
            let Some(value) = value.non_null() else {
                continue;
            };
            let value = value.into_plain_with(cx)?;
            if store.contains_key(&name) {
                if let (Some(Value::Store(mut existing)), Value::Store(incoming)) =
                    (store.get(&name), &value)
                {
                    cx.member(&name, |cx| {
                        extend_into(&mut existing, incoming.iter().collect(), cx)
                    })?;
                }
                return Err(StoreError::DuplicateKey { key: name });
            }
            trace!(member = %name, "extend member");
            store.add(&name, value)?;
        }
        Ok(())
    })
}

/// Walk `names` from `current`, creating empty nested stores where a name is
/// missing, and return the innermost store.
fn descend<'a>(mut current: &'a mut Store, names: &[String]) -> MapResult<&'a mut Store> {
    for name in names {
        if current.is_declared(name) {
            return Err(MapError::InvalidArgument(format!(
                "{name} is a declared member of {} and can't be extended",
                current.shape().name
            )));
        }
        match current.get_ref(name) {
            None | Some(Value::Null) => {
                trace!(member = %name, "create nested store");
                current.set(name, Store::new())?;
            }
            Some(Value::Store(_)) => {}
            Some(other) => {
                return Err(MapError::InvalidArgument(format!(
                    "{name} holds a {} value, not a nested store",
                    other.type_name()
                )))
            }
        }
        current = match current.get_mut(name) {
            Some(Value::Store(nested)) => nested,
            _ => {
                return Err(MapError::InvalidArgument(format!(
                    "{name} could not be opened as a nested store"
                )))
            }
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use crate::fixtures::{Office, Person};
    use crate::{ErrorKind, Mapper};
    use duck_path::Path;
    use duck_store::{literal, Store, Value};

    #[test]
    fn disjoint_members_are_added() {
        let mut store = Store::new();
        store.add("id", 1).unwrap();
        Mapper::new()
            .extend(&mut store, &literal! { name: "Paris", floor: 2 })
            .unwrap();
        assert_eq!(store.get("name"), Some(Value::from("Paris")));
        assert_eq!(store.member("floor").unwrap(), Value::Int(2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn duplicate_member_fails_without_rollback() {
        let mut store = Store::new();
        store.add("name", "London").unwrap();
        let err = Mapper::new()
            .extend(&mut store, &literal! { floor: 2, name: "Paris", wing: "east" })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(store.get("name"), Some(Value::from("London")));
        assert_eq!(store.get("floor"), Some(Value::Int(2)));
        assert!(!store.contains_key("wing"));
    }

    #[test]
    fn declared_names_count_as_present() {
        let mut store = Store::with_declared(Office::default());
        let err = Mapper::new()
            .extend(&mut store, &literal! { name: "Paris" })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    }

    #[test]
    fn nested_sources_become_plain_stores() {
        let mut store = Store::new();
        Mapper::new().extend(&mut store, &Person::sample()).unwrap();
        let office = store.get("office").and_then(Value::into_store).unwrap();
        assert!(office.declared().is_none());
        assert_eq!(office.get("name"), Some(Value::from("London")));
        assert!(!store.contains_key("first_name"));
    }

    #[test]
    fn nested_overlap_still_reports_the_outer_key() {
        let mut store = Store::new();
        store.add("office", literal! { name: "London" }).unwrap();
        let err = Mapper::new()
            .extend(&mut store, &literal! { office: { floor: 2 } })
            .unwrap_err();
        assert_eq!(err.to_string(), "store error: can't add the member office as it has already been added");
        let office = store.get("office").and_then(Value::into_store).unwrap();
        assert!(!office.contains_key("floor"));
    }

    #[test]
    fn recorded_path_creates_intermediate_stores() {
        let mut store = Store::new();
        Mapper::new()
            .extend_with(&mut store, |p| p.get("a").get("b").set("c", 42))
            .unwrap();
        let path: Path = "a.d".parse().unwrap();
        Mapper::new().extend_path(&mut store, &path, "x").unwrap();
        let a = store.get("a").and_then(Value::into_store).unwrap();
        let b = a.get("b").and_then(Value::into_store).unwrap();
        assert_eq!(b.get("c"), Some(Value::Int(42)));
        assert_eq!(a.get("d"), Some(Value::from("x")));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn read_only_closure_is_a_no_op() {
        let mut store = Store::new();
        Mapper::new()
            .extend_with(&mut store, |p| p.get("a").get("b"))
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn existing_nested_stores_are_reused() {
        let mut store = Store::new();
        store.add("a", literal! { x: 1 }).unwrap();
        let path: Path = "a.y".parse().unwrap();
        Mapper::new().extend_path(&mut store, &path, 2).unwrap();
        let a = store.get("a").and_then(Value::into_store).unwrap();
        assert_eq!(a.get("x"), Some(Value::Int(1)));
        assert_eq!(a.get("y"), Some(Value::Int(2)));

        let err = Mapper::new().extend_path(&mut store, &path, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    }

    #[test]
    fn scalars_and_declared_members_block_the_path() {
        let mut store = Store::with_declared(Office::default());
        store.add("floor", 2).unwrap();
        let through_scalar: Path = "floor.wing".parse().unwrap();
        let through_declared: Path = "name.first".parse().unwrap();
        let mapper = Mapper::new();
        assert_eq!(
            mapper.extend_path(&mut store, &through_scalar, 1).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            mapper.extend_path(&mut store, &through_declared, 1).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn invalid_recorded_names_fail() {
        let mut store = Store::new();
        let err = Mapper::new()
            .extend_with(&mut store, |p| p.get("a b").set("c", 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = Mapper::new().extend_with(&mut store, |_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
    }
}
