//! Recorded steps and their expression-like rendering.

use std::fmt;
use std::rc::Rc;

use duck_store::Value;

/// Unary operators the recorder intercepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Negate => f.write_str("Negate"),
            UnaryOp::Not => f.write_str("Not"),
        }
    }
}

/// Binary operators the recorder intercepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        };
        f.write_str(symbol)
    }
}

/// Right-hand side of a binary step: a plain value or another recorded chain.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    Step(Rc<Step>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(value) => write!(f, "{value}"),
            Operand::Step(step) => write!(f, "{step}"),
        }
    }
}

/// What a recorded step did.
#[derive(Clone, Debug, PartialEq)]
pub enum StepKind {
    /// The closure's placeholder parameter.
    Root,
    Get { name: String },
    Set { name: String, value: Value },
    GetIndex { indexes: Vec<Value> },
    SetIndex { indexes: Vec<Value>, value: Value },
    Call { name: String, args: Vec<Value> },
    Invoke { args: Vec<Value> },
    /// Conversion to the named Rust type.
    Convert { target: &'static str },
    Unary { op: UnaryOp },
    Binary { op: BinaryOp, rhs: Operand },
}

/// One intercepted operation, linked to the step it was performed on.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub parent: Option<Rc<Step>>,
}

impl Step {
    pub fn root() -> Self {
        Self {
            kind: StepKind::Root,
            parent: None,
        }
    }

    pub fn new(kind: StepKind, parent: Rc<Step>) -> Self {
        Self {
            kind,
            parent: Some(parent),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, StepKind::Root)
    }

    /// Member name for get, set, and call steps.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Get { name } | StepKind::Set { name, .. } | StepKind::Call { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Carried value of a set or set-index step.
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            StepKind::Set { value, .. } | StepKind::SetIndex { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Contribution to a dotted path: the member name, or the index values
    /// joined with `,`. Root, invoke, convert, and operator steps have none.
    pub fn path_segment(&self) -> Option<String> {
        match &self.kind {
            StepKind::GetIndex { indexes } | StepKind::SetIndex { indexes, .. } => {
                Some(join(indexes))
            }
            _ => self.name().map(str::to_string),
        }
    }
}

pub(crate) fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

struct Parent<'a>(&'a Option<Rc<Step>>);

impl fmt::Display for Parent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(step) => write!(f, "{step}"),
            None => f.write_str("it"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = Parent(&self.parent);
        match &self.kind {
            StepKind::Root => f.write_str("it"),
            StepKind::Get { name } => write!(f, "{parent}.{name}"),
            StepKind::Set { name, value } => write!(f, "({parent}.{name}={value})"),
            StepKind::GetIndex { indexes } => write!(f, "{parent}[{}]", join(indexes)),
            StepKind::SetIndex { indexes, value } => {
                write!(f, "({parent}[{}]={value})", join(indexes))
            }
            StepKind::Call { name, args } => write!(f, "{parent}.{name}({})", join(args)),
            StepKind::Invoke { args } => write!(f, "{parent}({})", join(args)),
            StepKind::Convert { target } => write!(f, "({target}::{parent})"),
            StepKind::Unary { op } => write!(f, "({op}::{parent})"),
            StepKind::Binary { op, rhs } => write!(f, "({parent} {op} {rhs})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(kinds: Vec<StepKind>) -> Step {
        let mut step = Rc::new(Step::root());
        for kind in kinds {
            step = Rc::new(Step::new(kind, step));
        }
        Rc::try_unwrap(step).unwrap()
    }

    fn get(name: &str) -> StepKind {
        StepKind::Get { name: name.into() }
    }

    #[test]
    fn renders_like_an_expression() {
        let step = chain(vec![get("a"), StepKind::Set { name: "b".into(), value: Value::Int(42) }]);
        assert_eq!(step.to_string(), "(it.a.b=42)");

        let step = chain(vec![get("a"), StepKind::GetIndex { indexes: vec![Value::Int(0)] }]);
        assert_eq!(step.to_string(), "it.a[0]");

        let step = chain(vec![
            get("a"),
            StepKind::Call { name: "m".into(), args: vec![Value::Int(1), Value::Int(2)] },
        ]);
        assert_eq!(step.to_string(), "it.a.m(1,2)");

        let step = chain(vec![get("a"), StepKind::Unary { op: UnaryOp::Not }]);
        assert_eq!(step.to_string(), "(Not::it.a)");

        let step = chain(vec![get("a"), StepKind::Convert { target: "i64" }]);
        assert_eq!(step.to_string(), "(i64::it.a)");

        let step = chain(vec![
            get("a"),
            StepKind::Binary { op: BinaryOp::Add, rhs: Operand::Value(Value::Int(1)) },
        ]);
        assert_eq!(step.to_string(), "(it.a + 1)");
    }

    #[test]
    fn path_segments() {
        let set_index = Step::new(
            StepKind::SetIndex { indexes: vec![Value::Int(0), Value::from("k")], value: Value::Null },
            Rc::new(Step::root()),
        );
        assert_eq!(set_index.path_segment().as_deref(), Some("0,k"));
        assert_eq!(set_index.value(), Some(&Value::Null));
        assert_eq!(Step::root().path_segment(), None);
        let invoke = Step::new(StepKind::Invoke { args: vec![] }, Rc::new(Step::root()));
        assert_eq!(invoke.path_segment(), None);
        assert_eq!(invoke.to_string(), "it()");
    }
}
