use std::fmt;

use crate::store::Store;
use crate::value::Value;

/// An anonymous structural literal: ordered names mapped to values.
///
/// Usually built with [`literal!`](crate::literal!). Nested literals are
/// stored as nested plain stores.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Literal {
    store: Store,
}

impl Literal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or overwrite a member. Nested literals become nested stores.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) {
        self.store.insert_dynamic(name.to_string(), value.into());
    }

    /// Builder form of [`Literal::push`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.store.get_ref(name)
    }

    pub fn as_store(&self) -> &Store {
        &self.store
    }

    pub fn as_store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Value::Store(literal.store)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.store, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_order_and_nests() {
        let office = Literal::new().with("name", "Paris");
        let literal = Literal::new().with("id", 3).with("office", office);
        let keys: Vec<_> = literal.as_store().keys().collect();
        assert_eq!(keys, ["id", "office"]);
        let nested = literal.get("office").and_then(Value::as_store).unwrap();
        assert_eq!(nested.get("name"), Some(Value::from("Paris")));
    }

    #[test]
    fn macro_builds_nested_literal() {
        let literal = crate::literal! {
            office: { name: "Paris", floor: 2 },
            id: 3,
            tags: (vec!["a", "b"]),
        };
        assert_eq!(literal.to_string(), "{office: {name: Paris, floor: 2}, id: 3, tags: [a, b]}");
        assert_eq!(literal.get("id"), Some(&Value::Int(3)));
    }

    #[test]
    fn empty_literal() {
        let literal = crate::literal! {};
        assert!(literal.as_store().is_empty());
        assert_eq!(Value::from(literal), Value::Store(Store::new()));
    }
}
