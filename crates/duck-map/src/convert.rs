//! Conversions from arbitrary sources into plain and typed stores.

use duck_store::{Shaped, Source, Store, StoreResult, TypedStore, Value};
use tracing::debug;

use crate::error::MapResult;
use crate::mapper::Mapper;

impl Mapper {
    /// Copy every readable, non-null member of `source` into a new plain
    /// store, turning nested composite values into nested plain stores.
    /// Nesting deeper than the configured `max_depth` is refused.
    pub fn to_store<S: Source + ?Sized>(&self, source: &S) -> MapResult<Store> {
        debug!(source = source.shape_name(), "to_store");
        Ok(Store::from_prototype_with(source, &mut self.coercion())?)
    }

    /// Build a plain store from string-keyed entries. Nested stores and
    /// lists are normalised recursively; null entries are kept.
    pub fn store_from_entries<I, K, V>(&self, entries: I) -> MapResult<Store>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut cx = self.coercion();
        let store = cx.nested(|cx| {
            entries
                .into_iter()
                .map(|(key, value)| {
                    let (key, value): (String, Value) = (key.into(), value.into());
                    Ok((key, value.into_plain_with(cx)?))
                })
                .collect::<StoreResult<Store>>()
        })?;
        Ok(store)
    }

    /// Build a plain store from a JSON object.
    pub fn store_from_json(&self, json: serde_json::Value) -> MapResult<Store> {
        Ok(Store::try_from(Value::from(json))?)
    }

    /// A typed store seeded from `source`: names `T` declares are coerced
    /// into the declared partition, the rest go to the dynamic one.
    pub fn to_typed<T: Shaped, S: Source + ?Sized>(&self, source: &S) -> MapResult<TypedStore<T>> {
        debug!(shape = T::SHAPE.name, source = source.shape_name(), "to_typed");
        Ok(TypedStore::from_prototype_with(source, &mut self.coercion())?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::fixtures::{Office, Person};
    use crate::{ErrorKind, Mapper};
    use duck_store::{literal, MappingConfig, Store, Value};
    use serde_json::json;

    #[test]
    fn to_store_flattens_declared_objects() {
        let store = Mapper::new().to_store(&Person::sample()).unwrap();
        assert!(store.declared().is_none());
        assert_eq!(store.get("last_name"), Some(Value::from("Smith")));
        assert!(!store.contains_key("first_name"));
        let office = store.get("office").and_then(Value::into_store).unwrap();
        assert_eq!(office.get("size"), Some(Value::from("large")));
    }

    #[test]
    fn to_store_copies_typed_stores_in_full() {
        let mut typed = Mapper::new()
            .to_typed::<Office, _>(&literal! { name: "Oslo", floor: 5 })
            .unwrap();
        typed.add("wing", "north").unwrap();
        let store = Mapper::new().to_store(&*typed).unwrap();
        assert_eq!(store.keys().collect::<Vec<_>>(), ["id", "name", "floor", "wing"]);
        assert_eq!(typed.declared().name, "Oslo");
    }

    #[test]
    fn entries_keep_nulls_and_normalise_nesting() {
        let mut nested = BTreeMap::new();
        nested.insert("inner".to_string(), Value::Store(Store::with_declared(Office::default())));
        let store = Mapper::new().store_from_entries([
            ("a", Value::Null),
            ("b", Value::List(vec![Value::Store(Store::with_declared(Office::default()))])),
            ("c", Value::Store(nested.into_iter().collect())),
        ])
        .unwrap();
        assert!(store.dynamic().contains_key("a"));
        let b = store.get("b").unwrap();
        let first = b.as_list().unwrap()[0].as_store().unwrap();
        assert!(first.declared().is_none());
        let c = store.get("c").and_then(Value::into_store).unwrap();
        let inner = c.get("inner").and_then(Value::into_store).unwrap();
        assert!(inner.declared().is_none());
        assert_eq!(inner.get("id"), Some(Value::Int(0)));
    }

    #[test]
    fn copies_refuse_nesting_past_max_depth() {
        let deep = literal! { a: { b: { c: 1 } } };
        assert!(Mapper::new().to_store(&deep).is_ok());

        let shallow = Mapper::with_config(MappingConfig {
            max_depth: 2,
            ..MappingConfig::default()
        });
        let err = shallow.to_store(&deep).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructureTooDeep);

        let a = Mapper::new().to_store(&deep).unwrap().get("a").unwrap();
        let err = shallow.store_from_entries([("a", a)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructureTooDeep);

        let mut target = Store::new();
        let err = shallow.extend(&mut target, &deep).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructureTooDeep);
    }

    #[test]
    fn json_objects_become_stores() {
        let store = Mapper::new()
            .store_from_json(json!({ "name": "Paris", "office": { "floor": 2 } }))
            .unwrap();
        let office: Office = Mapper::new().as_if(&store).unwrap();
        assert_eq!(office.name, "Paris");
        let err = Mapper::new().store_from_json(json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn to_typed_coerces_declared_members() {
        let typed = Mapper::new()
            .to_typed::<Office, _>(&literal! { id: "12", name: "Rome" })
            .unwrap();
        assert_eq!(typed.declared().id, 12);
        let err = Mapper::new()
            .to_typed::<Office, _>(&literal! { id: "twelve" })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}
