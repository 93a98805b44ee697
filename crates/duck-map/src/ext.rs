//! Mapping operations as methods on [`Store`], backed by
//! [`Mapper::shared`].

use duck_path::{Path, Placeholder};
use duck_store::{Interface, Literal, Reflect, Shape, Shaped, Source, Store, Value};

use crate::error::MapResult;
use crate::mapper::Mapper;
use crate::view::{Mapped, View};

/// Extension trait exposing the [`Mapper`] operations on a [`Store`] with
/// the default configuration.
///
/// `set_from` and `set_by` are the mapper's `set` and `set_with`, renamed so
/// they don't collide with [`Store::set`].
pub trait StoreExt {
    fn as_if<T: Shaped>(&self) -> MapResult<T>;

    fn as_if_shape(&mut self, shape: &'static Shape) -> MapResult<Mapped<'_>>;

    fn as_view<I: Interface>(&mut self) -> MapResult<View<'_>>;

    fn as_if_with<'p, P: Reflect>(&self, prototype: &'p mut P) -> MapResult<&'p mut P>;

    fn as_if_literal<'l>(&self, literal: &'l mut Literal) -> MapResult<&'l mut Literal>;

    fn extend<S: Source + ?Sized>(&mut self, source: &S) -> MapResult<()>;

    fn extend_with<F, R>(&mut self, f: F) -> MapResult<&mut Self>
    where
        F: FnOnce(Placeholder) -> R;

    fn extend_path<V: Into<Value>>(&mut self, path: &Path, value: V) -> MapResult<&mut Self>;

    fn set_from<S: Source + ?Sized>(&mut self, source: &S) -> MapResult<()>;

    fn set_by<F, R>(&mut self, f: F) -> MapResult<()>
    where
        F: FnOnce(Placeholder) -> R;
}

impl StoreExt for Store {
    fn as_if<T: Shaped>(&self) -> MapResult<T> {
        Mapper::shared().as_if(self)
    }

    fn as_if_shape(&mut self, shape: &'static Shape) -> MapResult<Mapped<'_>> {
        Mapper::shared().as_if_shape(self, shape)
    }

    fn as_view<I: Interface>(&mut self) -> MapResult<View<'_>> {
        Mapper::shared().as_view::<I>(self)
    }

    fn as_if_with<'p, P: Reflect>(&self, prototype: &'p mut P) -> MapResult<&'p mut P> {
        Mapper::shared().as_if_with(self, prototype)
    }

    fn as_if_literal<'l>(&self, literal: &'l mut Literal) -> MapResult<&'l mut Literal> {
        Mapper::shared().as_if_literal(self, literal)
    }

    fn extend<S: Source + ?Sized>(&mut self, source: &S) -> MapResult<()> {
        Mapper::shared().extend(self, source)
    }

    fn extend_with<F, R>(&mut self, f: F) -> MapResult<&mut Self>
    where
        F: FnOnce(Placeholder) -> R,
    {
        Mapper::shared().extend_with(self, f)
    }

    fn extend_path<V: Into<Value>>(&mut self, path: &Path, value: V) -> MapResult<&mut Self> {
        Mapper::shared().extend_path(self, path, value)
    }

    fn set_from<S: Source + ?Sized>(&mut self, source: &S) -> MapResult<()> {
        Mapper::shared().set(self, source)
    }

    fn set_by<F, R>(&mut self, f: F) -> MapResult<()>
    where
        F: FnOnce(Placeholder) -> R,
    {
        Mapper::shared().set_with(self, f)
    }
}
