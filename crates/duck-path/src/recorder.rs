//! Recording placeholders and the [`parse`] entry point.
//!
//! A closure receives a [`Placeholder`] standing in for "the object" and
//! performs member reads, writes, index accesses, calls, conversions, and
//! operators on it. Each operation appends a [`Step`] to a private recording
//! context and returns a fresh placeholder, so chains like
//! `p.get("a").get("b").set("c", 42)` are captured in full. Nothing is
//! evaluated against a real object.
//!
//! The context is `Rc`-based: a recording lives on one thread and ends when
//! [`parse`] returns.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Not, Rem, Sub};
use std::rc::Rc;

use duck_store::Value;
use tracing::{debug, trace};

use crate::error::{PathError, PathResult};
use crate::names::validate_member_name;
use crate::path::Path;
use crate::step::{self, BinaryOp, Operand, Step, StepKind, UnaryOp};

#[derive(Debug, Default)]
struct Context {
    last: Option<Rc<Step>>,
    error: Option<PathError>,
}

/// Stand-in for the object a recorded closure operates on.
#[derive(Clone)]
pub struct Placeholder {
    step: Rc<Step>,
    context: Rc<RefCell<Context>>,
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Placeholder").field(&self.step.to_string()).finish()
    }
}

impl Placeholder {
    fn root(context: Rc<RefCell<Context>>) -> Self {
        Self {
            step: Rc::new(Step::root()),
            context,
        }
    }

    /// The step this placeholder stands for.
    pub fn step(&self) -> &Rc<Step> {
        &self.step
    }

    fn record(&self, kind: StepKind) -> Placeholder {
        let step = Rc::new(Step::new(kind, Rc::clone(&self.step)));
        trace!(step = %step, "recorded step");
        self.context.borrow_mut().last = Some(Rc::clone(&step));
        Placeholder {
            step,
            context: Rc::clone(&self.context),
        }
    }

    /// Keep the first validation failure; later ones are noise.
    fn check(&self, result: PathResult<()>) {
        if let Err(err) = result {
            let mut context = self.context.borrow_mut();
            if context.error.is_none() {
                context.error = Some(err);
            }
        }
    }

    /// Indexes become a path segment in their rendered form, so `-1` or
    /// `1.5` are rejected just like a text index `"a-b"`.
    fn check_indexes(&self, indexes: &[Value]) {
        self.check(validate_member_name(&step::join(indexes)));
    }

    /// Member read: `it.name`.
    pub fn get(&self, name: &str) -> Placeholder {
        self.check(validate_member_name(name));
        self.record(StepKind::Get {
            name: name.to_string(),
        })
    }

    /// Member assignment: `it.name = value`.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Placeholder {
        self.check(validate_member_name(name));
        self.record(StepKind::Set {
            name: name.to_string(),
            value: value.into(),
        })
    }

    /// Index read: `it[index]`.
    pub fn index(&self, index: impl Into<Value>) -> Placeholder {
        self.index_many([index])
    }

    /// Multi-index read: `it[i, j]`.
    pub fn index_many<I, V>(&self, indexes: I) -> Placeholder
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let indexes: Vec<Value> = indexes.into_iter().map(Into::into).collect();
        self.check_indexes(&indexes);
        self.record(StepKind::GetIndex { indexes })
    }

    /// Index assignment: `it[index] = value`.
    pub fn set_index(&self, index: impl Into<Value>, value: impl Into<Value>) -> Placeholder {
        let indexes = vec![index.into()];
        self.check_indexes(&indexes);
        self.record(StepKind::SetIndex {
            indexes,
            value: value.into(),
        })
    }

    /// Method call: `it.name(args)`.
    pub fn call<I, V>(&self, name: &str, args: I) -> Placeholder
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.check(validate_member_name(name));
        self.record(StepKind::Call {
            name: name.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Direct invocation: `it(args)`.
    pub fn invoke<I, V>(&self, args: I) -> Placeholder
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.record(StepKind::Invoke {
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Conversion to `T`.
    pub fn convert<T: ?Sized>(&self) -> Placeholder {
        self.record(StepKind::Convert {
            target: std::any::type_name::<T>(),
        })
    }

    pub fn unary(&self, op: UnaryOp) -> Placeholder {
        self.record(StepKind::Unary { op })
    }

    pub fn binary(&self, op: BinaryOp, rhs: impl IntoOperand) -> Placeholder {
        self.record(StepKind::Binary {
            op,
            rhs: rhs.into_operand(),
        })
    }
}

/// Right operands accepted by [`Placeholder::binary`] and the operator
/// overloads.
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl IntoOperand for Placeholder {
    fn into_operand(self) -> Operand {
        Operand::Step(self.step)
    }
}

impl IntoOperand for &Placeholder {
    fn into_operand(self) -> Operand {
        Operand::Step(Rc::clone(&self.step))
    }
}

impl IntoOperand for &str {
    fn into_operand(self) -> Operand {
        Operand::Value(Value::from(self))
    }
}

macro_rules! value_operand {
    ($($ty:ty),*) => {$(
        impl IntoOperand for $ty {
            fn into_operand(self) -> Operand {
                Operand::Value(Value::from(self))
            }
        }
    )*};
}

value_operand!(bool, i32, i64, u32, u64, usize, f32, f64, String, Value);

macro_rules! binary_operator {
    ($($trait:ident :: $method:ident => $op:expr),* $(,)?) => {$(
        impl<R: IntoOperand> $trait<R> for Placeholder {
            type Output = Placeholder;

            fn $method(self, rhs: R) -> Placeholder {
                self.binary($op, rhs)
            }
        }

        impl<R: IntoOperand> $trait<R> for &Placeholder {
            type Output = Placeholder;

            fn $method(self, rhs: R) -> Placeholder {
                self.binary($op, rhs)
            }
        }
    )*};
}

binary_operator! {
    Add::add => BinaryOp::Add,
    Sub::sub => BinaryOp::Subtract,
    Mul::mul => BinaryOp::Multiply,
    Div::div => BinaryOp::Divide,
    Rem::rem => BinaryOp::Remainder,
}

impl Neg for Placeholder {
    type Output = Placeholder;

    fn neg(self) -> Placeholder {
        self.unary(UnaryOp::Negate)
    }
}

impl Not for Placeholder {
    type Output = Placeholder;

    fn not(self) -> Placeholder {
        self.unary(UnaryOp::Not)
    }
}

/// The outcome of [`parse`]: the terminal step and its ancestry.
#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    terminal: Rc<Step>,
}

impl Recording {
    /// The last step the closure produced.
    pub fn terminal(&self) -> &Step {
        &self.terminal
    }

    /// Every step from the root to the terminal.
    pub fn steps(&self) -> Vec<Rc<Step>> {
        let mut steps = Vec::new();
        let mut current = Some(Rc::clone(&self.terminal));
        while let Some(step) = current {
            current = step.parent.clone();
            steps.push(step);
        }
        steps.reverse();
        steps
    }

    /// Path segments from the root outwards; steps without a name or index
    /// are skipped.
    pub fn segments(&self) -> Vec<String> {
        self.steps()
            .iter()
            .filter_map(|step| step.path_segment())
            .collect()
    }

    /// The dotted path, e.g. `a.b.c`.
    pub fn path(&self) -> String {
        self.segments().join(".")
    }

    /// The segments as a validated [`Path`].
    pub fn to_path(&self) -> PathResult<Path> {
        Path::new(self.segments())
    }

    /// The assigned value when the terminal step is a set or set-index.
    pub fn value(&self) -> Option<&Value> {
        self.terminal.value()
    }
}

impl fmt::Display for Recording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terminal)
    }
}

/// Run `f` against a recording placeholder and return what it did.
///
/// Fails with [`PathError::InvalidName`] if any recorded member name was
/// invalid, and with [`PathError::UnsupportedExpression`] if the closure
/// never touched its argument.
///
/// ```
/// let recording = duck_path::parse(|p| p.get("a").get("b").set("c", 42)).unwrap();
/// assert_eq!(recording.path(), "a.b.c");
/// assert_eq!(recording.value(), Some(&duck_store::Value::Int(42)));
/// ```
pub fn parse<F, R>(f: F) -> PathResult<Recording>
where
    F: FnOnce(Placeholder) -> R,
{
    let context = Rc::new(RefCell::new(Context::default()));
    drop(f(Placeholder::root(Rc::clone(&context))));

    let Context { last, error } = context.take();
    if let Some(err) = error {
        return Err(err);
    }
    let terminal = last.ok_or_else(|| {
        PathError::UnsupportedExpression(
            "the closure performed no operation on its argument".to_string(),
        )
    })?;
    let recording = Recording { terminal };
    debug!(expression = %recording, path = %recording.path(), "parsed recording");
    Ok(recording)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_assignment() {
        let recording = parse(|p| p.get("a").get("b").set("c", 42)).unwrap();
        assert_eq!(recording.path(), "a.b.c");
        assert_eq!(recording.value(), Some(&Value::Int(42)));
        assert_eq!(recording.to_string(), "(it.a.b.c=42)");
        assert_eq!(recording.steps().len(), 4);
        assert!(recording.steps()[0].is_root());
    }

    #[test]
    fn read_only_chain_has_no_value() {
        let recording = parse(|p| p.get("office").get("name")).unwrap();
        assert_eq!(recording.path(), "office.name");
        assert_eq!(recording.value(), None);
    }

    #[test]
    fn closure_return_value_is_irrelevant() {
        let recording = parse(|p| {
            p.get("a").set("b", "x");
        })
        .unwrap();
        assert_eq!(recording.path(), "a.b");
        assert_eq!(recording.value(), Some(&Value::from("x")));
    }

    #[test]
    fn index_segments() {
        let recording = parse(|p| p.get("items").index(0).set("name", "first")).unwrap();
        assert_eq!(recording.path(), "items.0.name");

        let recording = parse(|p| p.get("grid").index_many([1, 2])).unwrap();
        assert_eq!(recording.path(), "grid.1,2");
        assert_eq!(recording.to_string(), "it.grid[1,2]");

        let recording = parse(|p| p.get("map").set_index("key", 5)).unwrap();
        assert_eq!(recording.path(), "map.key");
        assert_eq!(recording.value(), Some(&Value::Int(5)));
    }

    #[test]
    fn calls_conversions_and_operators() {
        let recording = parse(|p| p.get("a").call("m", [1, 2])).unwrap();
        assert_eq!(recording.to_string(), "it.a.m(1,2)");
        assert_eq!(recording.path(), "a.m");

        let recording = parse(|p| p.get("a").convert::<i64>()).unwrap();
        assert_eq!(recording.to_string(), "(i64::it.a)");
        assert_eq!(recording.path(), "a");

        let recording = parse(|p| p.get("a") + 1).unwrap();
        assert_eq!(recording.to_string(), "(it.a + 1)");

        let recording = parse(|p| !p.get("flag")).unwrap();
        assert_eq!(recording.to_string(), "(Not::it.flag)");

        let recording = parse(|p| -p.get("n")).unwrap();
        assert_eq!(recording.to_string(), "(Negate::it.n)");

        let recording = parse(|p| p.get("x") * p.get("y")).unwrap();
        assert_eq!(recording.to_string(), "(it.x * it.y)");
        assert_eq!(recording.path(), "x");

        let recording = parse(|p| p.invoke(["arg"])).unwrap();
        assert_eq!(recording.to_string(), "it(arg)");
        assert_eq!(recording.path(), "");
    }

    #[test]
    fn no_operations_is_unsupported() {
        let err = parse(|_p| 42).unwrap_err();
        assert!(matches!(err, PathError::UnsupportedExpression(_)));
    }

    #[test]
    fn first_invalid_name_wins() {
        let err = parse(|p| p.get("bad name").get("also.bad")).unwrap_err();
        match err {
            PathError::InvalidName { name, .. } => assert_eq!(name, "bad name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn text_indexes_are_validated() {
        assert!(parse(|p| p.index("a+b")).is_err());
        assert!(parse(|p| p.index(3)).is_ok());
    }

    #[test]
    fn index_segments_are_validated_as_rendered() {
        for bad in [Value::Int(-1), Value::Float(1.5)] {
            let err = parse(|p| p.get("a").index(bad.clone()).set("b", 1)).unwrap_err();
            assert!(matches!(err, PathError::InvalidName { .. }), "{bad}");
        }
        assert!(parse(|p| p.get("grid").set_index(-3, 0)).is_err());
        assert!(parse(|p| p.get("grid").index_many([Value::Int(1), Value::Float(0.5)])).is_err());

        let recording = parse(|p| p.get("a").index(0).set("b", 1)).unwrap();
        assert_eq!(recording.to_path().unwrap().to_string(), "a.0.b");
    }

    #[test]
    fn to_path_validates_segments() {
        let recording = parse(|p| p.get("a").set("b", 1)).unwrap();
        let path = recording.to_path().unwrap();
        assert_eq!(path.to_string(), "a.b");

        let recording = parse(|p| p.invoke(Vec::<Value>::new())).unwrap();
        assert!(recording.to_path().is_err());
    }
}
