//! Live interface views and the result of a runtime-dispatched projection.

use duck_store::{
    Coercion, Field, FieldValue, MappingConfig, Reflect, Shape, Store, StoreError, Value,
};
use tracing::trace;

use crate::error::MapResult;

/// A store seen through a property-only interface.
///
/// Nothing is copied: reads coerce the store's current value to the
/// member's declared type, writes coerce and go straight to the store.
#[derive(Debug)]
pub struct View<'s> {
    store: &'s mut Store,
    shape: &'static Shape,
    config: MappingConfig,
}

impl<'s> View<'s> {
    pub(crate) fn new(store: &'s mut Store, shape: &'static Shape, config: MappingConfig) -> Self {
        Self {
            store,
            shape,
            config,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Member names the interface declares.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.shape.field_names()
    }

    /// Read `name`, coerced to its declared type. `Null` when the store has
    /// no value for it.
    pub fn get(&self, name: &str) -> MapResult<Value> {
        let field = self.field(name)?;
        let Some(value) = self.store.get(name).and_then(Value::non_null) else {
            return Ok(Value::Null);
        };
        let mut cx = Coercion::new(&self.config);
        Ok(cx.member(name, |cx| cx.coerce(value, &field.type_tag()))?)
    }

    /// Read `name` as a concrete Rust type.
    pub fn get_as<T: FieldValue>(&self, name: &str) -> MapResult<T> {
        let value = self.get(name)?;
        let mut cx = Coercion::new(&self.config);
        Ok(cx.member(name, |cx| T::from_value(value, cx))?)
    }

    /// Coerce `value` to the declared type of `name` and write it through.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> MapResult<()> {
        let field = self.field(name)?;
        let mut cx = Coercion::new(&self.config);
        let value = cx.member(name, |cx| cx.coerce(value.into(), &field.type_tag()))?;
        trace!(shape = self.shape.name, member = name, "write through view");
        self.store.set_with(name, value, &mut cx)?;
        Ok(())
    }

    pub fn store(&self) -> &Store {
        self.store
    }

    /// Give up the view and get the underlying store back.
    pub fn into_store(self) -> &'s mut Store {
        self.store
    }

    fn field(&self, name: &str) -> MapResult<&'static Field> {
        self.shape.field(name).ok_or_else(|| {
            StoreError::MemberNotFound {
                name: format!("{}.{name}", self.shape.name),
            }
            .into()
        })
    }
}

/// Outcome of [`Mapper::as_if_shape`](crate::Mapper::as_if_shape).
#[derive(Debug)]
pub enum Mapped<'s> {
    /// The store itself, reinterpreted as untyped.
    Dynamic(&'s mut Store),
    /// A live view through an interface.
    View(View<'s>),
    /// A freshly built and populated instance.
    Instance(Box<dyn Reflect>),
}

impl<'s> Mapped<'s> {
    pub fn into_view(self) -> Option<View<'s>> {
        match self {
            Mapped::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<Box<dyn Reflect>> {
        match self {
            Mapped::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn instance_as<T: Reflect>(&self) -> Option<&T> {
        match self {
            Mapped::Instance(instance) => instance.downcast_ref::<T>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::Department;
    use crate::{ErrorKind, Mapper};
    use duck_store::{Store, Value};

    fn store() -> Store {
        let mut store = Store::new();
        store.add("id", "12").unwrap();
        store.add("name", "Sales").unwrap();
        store.add("budget", 1000).unwrap();
        store
    }

    #[test]
    fn reads_are_coerced_to_declared_types() {
        let mut store = store();
        let view = Mapper::new().as_view::<Department>(&mut store).unwrap();
        assert_eq!(view.get("id").unwrap(), Value::Int(12));
        assert_eq!(view.get_as::<i64>("id").unwrap(), 12);
        assert_eq!(view.get_as::<String>("name").unwrap(), "Sales");
        assert_eq!(view.names().collect::<Vec<_>>(), ["id", "name", "head_count"]);
    }

    #[test]
    fn missing_values_read_as_null() {
        let mut store = store();
        let view = Mapper::new().as_view::<Department>(&mut store).unwrap();
        assert_eq!(view.get("head_count").unwrap(), Value::Null);
        assert_eq!(view.get_as::<Option<i64>>("head_count").unwrap(), None);
    }

    #[test]
    fn undeclared_names_are_not_visible() {
        let mut store = store();
        let view = Mapper::new().as_view::<Department>(&mut store).unwrap();
        let err = view.get("budget").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MemberNotFound);
    }

    #[test]
    fn writes_go_through_to_the_store() {
        let mut store = store();
        let mut view = Mapper::new().as_view::<Department>(&mut store).unwrap();
        view.set("head_count", "30").unwrap();
        view.set("name", "Marketing").unwrap();
        let err = view.set("head_count", "many").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(view.store().get("head_count"), Some(Value::Int(30)));
        drop(view);
        assert_eq!(store.get("name"), Some(Value::from("Marketing")));
        assert_eq!(store.get("budget"), Some(Value::Int(1000)));
    }

    #[test]
    fn view_sees_later_store_changes() {
        let mut store = store();
        let view = Mapper::new().as_view::<Department>(&mut store).unwrap();
        let store = view.into_store();
        store.set("name", "Ops").unwrap();
        let view = Mapper::new().as_view::<Department>(store).unwrap();
        assert_eq!(view.get("name").unwrap(), Value::from("Ops"));
    }
}
