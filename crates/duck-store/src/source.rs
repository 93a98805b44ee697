use crate::literal::Literal;
use crate::shape::Reflect;
use crate::store::Store;
use crate::value::Value;

/// Anything that exposes readable named values in a stable order.
///
/// Implemented for every [`Reflect`] type (declared members in shape order),
/// for [`Store`] (the union view), and for [`Literal`].
pub trait Source {
    /// Name used in log events and error messages.
    fn shape_name(&self) -> &'static str;

    /// `(name, value)` pairs, possibly including nulls.
    fn members(&self) -> Vec<(String, Value)>;

    /// `true` only for anonymous literals.
    fn is_literal(&self) -> bool {
        false
    }
}

impl<T: Reflect + ?Sized> Source for T {
    fn shape_name(&self) -> &'static str {
        self.shape().name
    }

    fn members(&self) -> Vec<(String, Value)> {
        self.shape()
            .fields
            .iter()
            .map(|f| (f.name.to_string(), self.get_field(f.name).unwrap_or_default()))
            .collect()
    }
}

impl Source for Store {
    fn shape_name(&self) -> &'static str {
        self.shape().name
    }

    fn members(&self) -> Vec<(String, Value)> {
        self.iter().collect()
    }
}

impl Source for Literal {
    fn shape_name(&self) -> &'static str {
        "literal"
    }

    fn members(&self) -> Vec<(String, Value)> {
        self.as_store().iter().collect()
    }

    fn is_literal(&self) -> bool {
        true
    }
}
