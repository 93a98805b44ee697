//! The structural mapper and its as-if projections.

use std::sync::OnceLock;

use duck_store::{
    populate, Coercion, Interface, Literal, MappingConfig, Reflect, Shape, ShapeKind, Shaped,
    Store, Value,
};
use tracing::{debug, trace};

use crate::error::{MapError, MapResult};
use crate::view::{Mapped, View};

/// Maps values between stores and caller-supplied shapes.
///
/// A mapper only carries its [`MappingConfig`]; every operation is a pure
/// function of its arguments and the config.
#[derive(Clone, Debug, Default)]
pub struct Mapper {
    config: MappingConfig,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MappingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Process-wide mapper with the default configuration.
    pub fn shared() -> &'static Mapper {
        static SHARED: OnceLock<Mapper> = OnceLock::new();
        SHARED.get_or_init(Mapper::default)
    }

    pub(crate) fn coercion(&self) -> Coercion<'_> {
        Coercion::new(&self.config)
    }

    /// Build a fresh `T` from the members of `store`.
    ///
    /// Every declared member of `T` with a non-null value in the store is
    /// coerced and copied; nested shapes are built recursively. Members the
    /// store does not have keep `T::default()`'s value.
    pub fn as_if<T: Shaped>(&self, store: &Store) -> MapResult<T> {
        debug!(shape = T::SHAPE.name, members = store.len(), "as_if");
        let mut target = T::default();
        populate(&mut target, store, &mut self.coercion())?;
        Ok(target)
    }

    /// Runtime-dispatched projection onto `shape`.
    ///
    /// The dynamic marker hands the store back untouched, a property-only
    /// interface yields a live [`View`], and a concrete shape yields a new
    /// populated instance.
    pub fn as_if_shape<'s>(
        &self,
        store: &'s mut Store,
        shape: &'static Shape,
    ) -> MapResult<Mapped<'s>> {
        debug!(shape = shape.name, members = store.len(), "as_if_shape");
        match &shape.kind {
            ShapeKind::Dynamic => Ok(Mapped::Dynamic(store)),
            ShapeKind::Interface { .. } => self.view(store, shape).map(Mapped::View),
            ShapeKind::Concrete { construct: None } => Err(MapError::InvalidArgument(format!(
                "{} can't be built without constructor arguments",
                shape.name
            ))),
            ShapeKind::Concrete {
                construct: Some(construct),
            } => {
                let mut instance = construct();
                populate(instance.as_mut(), store, &mut self.coercion())?;
                Ok(Mapped::Instance(instance))
            }
        }
    }

    /// A live view of `store` through the interface `I`.
    pub fn as_view<'s, I: Interface>(&self, store: &'s mut Store) -> MapResult<View<'s>> {
        debug!(shape = I::SHAPE.name, members = store.len(), "as_view");
        self.view(store, I::SHAPE)
    }

    fn view<'s>(&self, store: &'s mut Store, shape: &'static Shape) -> MapResult<View<'s>> {
        let methods = shape.methods();
        if !methods.is_empty() {
            return Err(MapError::UnsupportedShape {
                shape: shape.name.to_string(),
                methods: methods.iter().map(|m| m.to_string()).collect(),
            });
        }
        Ok(View::new(store, shape, self.config.clone()))
    }

    /// Overlay the members of `store` onto an existing `prototype` and hand
    /// it back. Members the store lacks keep the prototype's values; nested
    /// shapes are overlaid in place.
    pub fn as_if_with<'p, P: Reflect>(
        &self,
        store: &Store,
        prototype: &'p mut P,
    ) -> MapResult<&'p mut P> {
        debug!(shape = prototype.shape().name, members = store.len(), "as_if onto prototype");
        overlay(prototype, store, &mut self.coercion())?;
        Ok(prototype)
    }

    /// [`Mapper::as_if_with`] for a type-erased target.
    pub fn as_if_reflect(&self, store: &Store, target: &mut dyn Reflect) -> MapResult<()> {
        debug!(shape = target.shape().name, members = store.len(), "as_if onto reflected target");
        overlay(target, store, &mut self.coercion())
    }

    /// Overlay the members of `store` onto an anonymous literal. Each member
    /// is coerced to the runtime type of the literal's current value; a
    /// member holding no value accepts anything.
    pub fn as_if_literal<'l>(
        &self,
        store: &Store,
        literal: &'l mut Literal,
    ) -> MapResult<&'l mut Literal> {
        debug!(members = store.len(), "as_if onto literal");
        overlay_plain(literal.as_store_mut(), store, &mut self.coercion())?;
        Ok(literal)
    }
}

fn overlay(target: &mut dyn Reflect, source: &Store, cx: &mut Coercion<'_>) -> MapResult<()> {
    cx.nested(|cx| {
        let shape = target.shape();
        for field in shape.fields {
            let Some(value) = source.get(field.name).and_then(Value::non_null) else {
                continue;
            };
            if let Value::Store(nested) = &value {
                if let Some(inner) = target.field_mut(field.name) {
                    cx.member(field.name, |cx| overlay(inner, nested, cx))?;
                    continue;
                }
            }
            trace!(shape = shape.name, member = field.name, "overlay member");
            target.set_field(field.name, value, cx)?;
        }
        Ok(())
    })
}

fn overlay_plain(target: &mut Store, source: &Store, cx: &mut Coercion<'_>) -> MapResult<()> {
    cx.nested(|cx| {
        let names: Vec<String> = target.dynamic().keys().cloned().collect();
        for name in names {
            let Some(value) = source.get(&name).and_then(Value::non_null) else {
                continue;
            };
            let Some(slot) = target.get_mut(&name) else {
                continue;
            };
            match (slot, value) {
                (Value::Store(current), Value::Store(incoming)) => {
                    cx.member(&name, |cx| overlay_plain(current, &incoming, cx))?;
                }
                (slot, value) => {
                    let tag = slot.type_tag();
                    trace!(member = %name, target = %tag, "overlay literal member");
                    *slot = cx.member(&name, |cx| cx.coerce(value, &tag))?;
                }
            }
        }
        Ok(())
    })
}
