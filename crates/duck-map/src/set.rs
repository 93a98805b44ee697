//! Partial update of existing members from an anonymous literal.

use duck_path::Placeholder;
use duck_store::{Coercion, Reflect, Source, Store, Value};
use tracing::{debug, trace};

use crate::error::{MapError, MapResult};
use crate::mapper::Mapper;

impl Mapper {
    /// Overwrite existing members of `store` with the members of `source`,
    /// which must be an anonymous literal.
    ///
    /// Every member named by the literal must already hold a value. Nested
    /// literals update nested values member by member, so siblings the
    /// literal does not name are left alone.
    pub fn set<S: Source + ?Sized>(&self, store: &mut Store, source: &S) -> MapResult<()> {
        if !source.is_literal() {
            return Err(MapError::InvalidArgument(format!(
                "set takes an anonymous literal, not {}",
                source.shape_name()
            )));
        }
        debug!(members = store.len(), "set from literal");
        set_in_store(store, source.members(), &mut self.coercion())
    }

    /// Setting through a recorded closure is not supported; always fails
    /// with [`MapError::NotImplemented`].
    pub fn set_with<F, R>(&self, _store: &mut Store, _f: F) -> MapResult<()>
    where
        F: FnOnce(Placeholder) -> R,
    {
        Err(MapError::NotImplemented(
            "setting members through a recorded closure",
        ))
    }
}

fn set_in_store(
    store: &mut Store,
    members: Vec<(String, Value)>,
    cx: &mut Coercion<'_>,
) -> MapResult<()> {
    cx.nested(|cx| {
        for (name, incoming) in members {
            let current = store
                .get(&name)
                .and_then(Value::non_null)
                .ok_or_else(|| missing(cx, &name))?;
            match (current, incoming) {
                (Value::Store(current), Value::Store(incoming)) => {
                    let written_back =
                        cx.member(&name, |cx| set_nested(store, &name, current, incoming, cx))?;
                    if let Some(copy) = written_back {
                        store.set_with(&name, Value::Store(copy), cx)?;
                    }
                }
                (current, Value::Store(_)) => return Err(not_structural(cx, &name, &current)),
                (_, value) => {
                    trace!(member = %name, "set member");
                    store.set_with(&name, value, cx)?;
                }
            }
        }
        Ok(())
    })
}

/// Update the nested value `name` of `store` in place where it can be
/// reached mutably; otherwise update `current` and return it for writing
/// back.
fn set_nested(
    store: &mut Store,
    name: &str,
    current: Store,
    incoming: Store,
    cx: &mut Coercion<'_>,
) -> MapResult<Option<Store>> {
    let members: Vec<(String, Value)> = incoming.iter().collect();
    if let Some(inner) = store.declared_mut().and_then(|d| d.field_mut(name)) {
        set_in_reflect(inner, members, cx)?;
        return Ok(None);
    }
    if let Some(Value::Store(nested)) = store.get_mut(name) {
        set_in_store(nested, members, cx)?;
        return Ok(None);
    }
    let mut copy = current;
    set_in_store(&mut copy, members, cx)?;
    Ok(Some(copy))
}

fn set_in_reflect(
    target: &mut dyn Reflect,
    members: Vec<(String, Value)>,
    cx: &mut Coercion<'_>,
) -> MapResult<()> {
    cx.nested(|cx| {
        for (name, incoming) in members {
            let current = target
                .get_field(&name)
                .and_then(Value::non_null)
                .ok_or_else(|| missing(cx, &name))?;
            match (current, incoming) {
                (Value::Store(current), Value::Store(incoming)) => {
                    let members: Vec<(String, Value)> = incoming.iter().collect();
                    if let Some(inner) = target.field_mut(&name) {
                        cx.member(&name, |cx| set_in_reflect(inner, members, cx))?;
                    } else {
                        let mut copy = current;
                        cx.member(&name, |cx| set_in_store(&mut copy, members, cx))?;
                        target.set_field(&name, Value::Store(copy), cx)?;
                    }
                }
                (current, Value::Store(_)) => return Err(not_structural(cx, &name, &current)),
                (_, value) => {
                    trace!(shape = target.shape().name, member = %name, "set member");
                    target.set_field(&name, value, cx)?;
                }
            }
        }
        Ok(())
    })
}

fn member_path(cx: &Coercion<'_>, name: &str) -> String {
    let parent = cx.path();
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn missing(cx: &Coercion<'_>, name: &str) -> MapError {
    MapError::MissingProperty {
        path: member_path(cx, name),
    }
}

fn not_structural(cx: &Coercion<'_>, name: &str, current: &Value) -> MapError {
    MapError::InvalidArgument(format!(
        "can't write a composite value to {}, which holds a {} value",
        member_path(cx, name),
        current.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use crate::fixtures::{Office, OfficeSize, Person};
    use crate::{ErrorKind, MapError, Mapper};
    use duck_store::{literal, Store, TypedStore, Value};

    #[test]
    fn london_becomes_paris() {
        let mut store = Store::new();
        store.add("office", literal! { name: "London" }).unwrap();
        Mapper::new()
            .set(&mut store, &literal! { office: { name: "Paris" } })
            .unwrap();
        let office = store.get("office").and_then(Value::into_store).unwrap();
        assert_eq!(office.get("name"), Some(Value::from("Paris")));
        assert_eq!(store.keys().collect::<Vec<_>>(), ["office"]);
        assert_eq!(office.len(), 1);
    }

    #[test]
    fn siblings_are_left_alone() {
        let mut store = Store::with_declared(Person::sample());
        store.add("nickname", "Smithy").unwrap();
        Mapper::new()
            .set(&mut store, &literal! { id: "7", office: { name: "Paris" } })
            .unwrap();
        let person = store.declared_as::<Person>().unwrap();
        assert_eq!(person.id, 7);
        assert_eq!(person.office.name, "Paris");
        assert_eq!(person.office.id, 1);
        assert_eq!(person.office.size, Some(OfficeSize::Large));
        assert_eq!(person.last_name, "Smith");
        assert_eq!(store.get("nickname"), Some(Value::from("Smithy")));
    }

    #[test]
    fn missing_member_is_reported_with_its_path() {
        let mut store = Store::with_declared(Person::sample());
        let err = Mapper::new()
            .set(&mut store, &literal! { first_name: "Ann" })
            .unwrap_err();
        assert_eq!(err, MapError::MissingProperty { path: "first_name".into() });

        let err = Mapper::new()
            .set(&mut store, &literal! { office: { floor: 2 } })
            .unwrap_err();
        assert_eq!(err, MapError::MissingProperty { path: "office.floor".into() });

        let err = Mapper::new()
            .set(&mut store, &literal! { nope: 1 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingProperty);
    }

    #[test]
    fn composite_over_scalar_is_rejected() {
        let mut store = Store::new();
        store.add("name", "London").unwrap();
        let err = Mapper::new()
            .set(&mut store, &literal! { name: { first: "L" } })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.get("name"), Some(Value::from("London")));
    }

    #[test]
    fn dynamic_values_are_written_verbatim() {
        let mut store = Store::new();
        store.add("floor", 2).unwrap();
        Mapper::new()
            .set(&mut store, &literal! { floor: "second" })
            .unwrap();
        assert_eq!(store.get("floor"), Some(Value::from("second")));
    }

    #[test]
    fn declared_values_are_coerced() {
        let mut store = Store::with_declared(Office::default());
        store.set("name", "London").unwrap();
        let err = Mapper::new()
            .set(&mut store, &literal! { id: "first" })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn nested_store_inside_a_nested_store_is_updated_in_place() {
        let mut store = Store::new();
        store
            .add("site", literal! { office: { name: "London", floor: 1 } })
            .unwrap();
        Mapper::new()
            .set(&mut store, &literal! { site: { office: { floor: 4 } } })
            .unwrap();
        let site = store.get("site").and_then(Value::into_store).unwrap();
        let office = site.get("office").and_then(Value::into_store).unwrap();
        assert_eq!(office.get("floor"), Some(Value::Int(4)));
        assert_eq!(office.get("name"), Some(Value::from("London")));
    }

    #[test]
    fn only_literals_are_accepted() {
        let mut store = TypedStore::<Office>::default();
        let err = Mapper::new()
            .set(&mut store, &Office::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let plain = Store::new();
        let err = Mapper::new().set(&mut store, &plain).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn closure_form_is_not_implemented() {
        let mut store = Store::new();
        let err = Mapper::new()
            .set_with(&mut store, |p| p.get("a").set("b", 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }
}
