//! The operator catalog: every constructor the enumerator may place into a candidate.
//!
//! An `Operator` is a plain data record -- identifier, arity, a pointwise semantic function,
//! and a source renderer -- rather than a trait object hierarchy, following the "vector of
//! operator records" layout the design notes call for. Each catalog entry below is a free
//! function building one of these records; [`crate::grammar::SearchSpace`] collects the
//! records a given run is allowed to use.

use std::rc::Rc;

use crate::error::{EvalError, EvalResult};
use crate::example::Assignment;
use crate::value::{Integer, Value};

/// What kind of terminal/constructor an operator is. Drives how the CSV/TXT readers and the
/// equivalence manager's canonical-representative tie-break treat it; the evaluation and
/// rendering behavior itself lives entirely in `eval`/`render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Literal,
    Variable,
    Function,
    Generic,
}

type EvalFn = Rc<dyn Fn(&[Value], &Assignment) -> EvalResult<Value>>;
type RenderFn = Rc<dyn Fn(&[String]) -> String>;

/// One entry in the operator catalog.
#[derive(Clone)]
pub struct Operator {
    pub identifier: String,
    pub arity: usize,
    pub kind: OperatorKind,
    eval: EvalFn,
    render: RenderFn,
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("identifier", &self.identifier)
            .field("arity", &self.arity)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Operator {
    /// Evaluates this operator pointwise: given the already-computed child values at one
    /// example index and that example's variable assignment, produce the value at that index.
    pub fn eval(&self, children: &[Value], assignment: &Assignment) -> EvalResult<Value> {
        (self.eval)(children, assignment)
    }

    /// Renders source text given the already-rendered source of each child.
    #[must_use]
    pub fn render(&self, children: &[String]) -> String {
        (self.render)(children)
    }

    fn type_mismatch(op: &'static str, operands: &[&Value]) -> EvalError {
        let rendered = operands.iter().map(|v| v.type_name()).collect::<Vec<_>>().join(", ");
        EvalError::TypeMismatch { op, operands: rendered }
    }

    // ---- Terminals ----------------------------------------------------

    #[must_use]
    pub fn literal(value: Value) -> Self {
        let captured = value.clone();
        Self {
            identifier: value.render_literal(),
            arity: 0,
            kind: OperatorKind::Literal,
            eval: Rc::new(move |_children, _assignment| Ok(captured.clone())),
            render: Rc::new(move |_children| value.render_literal()),
        }
    }

    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        let name = name.into();
        let lookup_name = name.clone();
        let render_name = name.clone();
        Self {
            identifier: name,
            arity: 0,
            kind: OperatorKind::Variable,
            eval: Rc::new(move |_children, assignment| {
                assignment
                    .get(&lookup_name)
                    .cloned()
                    .ok_or_else(|| EvalError::KeyError(lookup_name.clone()))
            }),
            render: Rc::new(move |_children| render_name.clone()),
        }
    }

    // ---- Unary ----------------------------------------------------------

    #[must_use]
    pub fn unary_plus() -> Self {
        Self::unary("+", |v| match v {
            Value::Int(_) | Value::Float(_) => Ok(v.clone()),
            _ => Err(Self::type_mismatch("unary +", &[v])),
        })
        .with_render(|children| format!("+{}", children[0]))
    }

    #[must_use]
    pub fn unary_minus() -> Self {
        Self::unary("-", |v| match v {
            Value::Int(i) => Ok(Value::from(-i.to_big())),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(Self::type_mismatch("unary -", &[v])),
        })
        .with_render(|children| format!("-{}", children[0]))
    }

    #[must_use]
    pub fn logical_not() -> Self {
        Self::unary("not", |v| match v {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            _ => Err(Self::type_mismatch("not", &[v])),
        })
        .with_render(|children| format!("not {}", children[0]))
    }

    #[must_use]
    pub fn bitwise_not() -> Self {
        Self::unary("~", |v| match v {
            Value::Int(Integer::I64(i)) => Ok(Value::from(!i)),
            Value::Int(Integer::Big(b)) => Ok(Value::from(-(b + num_bigint::BigInt::from(1)))),
            _ => Err(Self::type_mismatch("~", &[v])),
        })
        .with_render(|children| format!("~{}", children[0]))
    }

    fn unary(identifier: &str, f: impl Fn(&Value) -> EvalResult<Value> + 'static) -> Self {
        Self {
            identifier: identifier.to_owned(),
            arity: 1,
            kind: OperatorKind::Function,
            eval: Rc::new(move |children, _assignment| f(&children[0])),
            render: Rc::new(|children| format!("({})", children[0])),
        }
    }

    fn with_render(mut self, render: impl Fn(&[String]) -> String + 'static) -> Self {
        self.render = Rc::new(render);
        self
    }

    // ---- Binary arithmetic ----------------------------------------------

    #[must_use]
    pub fn add() -> Self {
        Self::binary_infix("+", |a, b| numeric_or_concat(a, b, "+", |x, y| x + y, |x, y| x + y))
    }

    #[must_use]
    pub fn sub() -> Self {
        Self::binary_infix("-", |a, b| numeric_only(a, b, "-", |x, y| x - y, |x, y| x - y))
    }

    #[must_use]
    pub fn mul() -> Self {
        Self::binary_infix("*", |a, b| match (a, b) {
            (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
                let n = as_usize(n).ok_or_else(|| EvalError::ValueError("negative repeat count".to_owned()))?;
                Ok(Value::List(items.iter().cloned().cycle().take(items.len() * n).collect()))
            }
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                let n = as_usize(n).ok_or_else(|| EvalError::ValueError("negative repeat count".to_owned()))?;
                Ok(Value::Str(s.repeat(n)))
            }
            _ => numeric_or_concat(a, b, "*", |x, y| x * y, |x, y| x * y),
        })
    }

    #[must_use]
    pub fn div() -> Self {
        Self::binary_infix("/", |a, b| match (a, b) {
            (Value::Int(x), Value::Int(y)) => {
                if y.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(x.to_f64() / y.to_f64()))
            }
            (Value::Float(x), Value::Float(y)) => {
                if *y == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(x / y))
            }
            (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => {
                if *y == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(x.to_f64() / y))
            }
            _ => Err(Self::type_mismatch("/", &[a, b])),
        })
    }

    #[must_use]
    pub fn floor_div() -> Self {
        Self::binary_infix("//", |a, b| match (a, b) {
            (Value::Int(x), Value::Int(y)) => {
                if y.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                use num_integer::Integer as _;
                Ok(Value::from(x.to_big().div_floor(&y.to_big())))
            }
            (Value::Float(x), Value::Float(y)) => {
                if *y == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float((x / y).floor()))
            }
            _ => Err(Self::type_mismatch("//", &[a, b])),
        })
    }

    #[must_use]
    pub fn modulo() -> Self {
        Self::binary_infix("%", |a, b| match (a, b) {
            (Value::Int(x), Value::Int(y)) => {
                if y.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                use num_integer::Integer as _;
                Ok(Value::from(x.to_big().mod_floor(&y.to_big())))
            }
            (Value::Float(x), Value::Float(y)) => {
                if *y == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(Value::Float(x.rem_euclid(*y)))
            }
            _ => Err(Self::type_mismatch("%", &[a, b])),
        })
    }

    #[must_use]
    pub fn pow() -> Self {
        Self::binary_infix("**", |a, b| match (a, b) {
            (Value::Int(x), Value::Int(y)) => {
                let exp = as_usize(y).ok_or_else(|| EvalError::ValueError("negative exponent".to_owned()))?;
                let exp = u32::try_from(exp).map_err(|_| EvalError::Overflow)?;
                Ok(Value::from(num_traits::Pow::pow(x.to_big(), exp)))
            }
            (Value::Float(x), Value::Float(y)) => Ok(Value::Float(x.powf(*y))),
            (Value::Int(x), Value::Float(y)) => Ok(Value::Float(x.to_f64().powf(*y))),
            (Value::Float(x), Value::Int(y)) => Ok(Value::Float(x.powf(y.to_f64()))),
            _ => Err(Self::type_mismatch("**", &[a, b])),
        })
    }

    #[must_use]
    pub fn left_shift() -> Self {
        Self::int_binary("<<", |x, y| {
            let shift = u32::try_from(y).map_err(|_| EvalError::ValueError("negative shift".to_owned()))?;
            x.checked_shl(shift).ok_or(EvalError::Overflow)
        })
    }

    #[must_use]
    pub fn right_shift() -> Self {
        Self::int_binary(">>", |x, y| {
            let shift = u32::try_from(y).map_err(|_| EvalError::ValueError("negative shift".to_owned()))?;
            Ok(x.checked_shr(shift).unwrap_or(if x < 0 { -1 } else { 0 }))
        })
    }

    #[must_use]
    pub fn bitwise_or() -> Self {
        Self::int_binary("|", |x, y| Ok(x | y))
    }

    #[must_use]
    pub fn bitwise_xor() -> Self {
        Self::int_binary("^", |x, y| Ok(x ^ y))
    }

    #[must_use]
    pub fn bitwise_and() -> Self {
        Self::int_binary("&", |x, y| Ok(x & y))
    }

    /// Matrix multiplication (`@`). Restricted to the dot product of two equal-length numeric
    /// lists, the one shape that makes sense without a full array library in scope.
    #[must_use]
    pub fn matmul() -> Self {
        Self::binary_infix("@", |a, b| match (a, b) {
            (Value::List(xs), Value::List(ys)) => {
                if xs.len() != ys.len() {
                    return Err(EvalError::ValueError("matmul operands must have equal length".to_owned()));
                }
                let mut total = 0.0_f64;
                for (x, y) in xs.iter().zip(ys.iter()) {
                    let (Some(xf), Some(yf)) = (as_f64(x), as_f64(y)) else {
                        return Err(Self::type_mismatch("@", &[x, y]));
                    };
                    total += xf * yf;
                }
                Ok(Value::Float(total))
            }
            _ => Err(Self::type_mismatch("@", &[a, b])),
        })
    }

    fn binary_infix(identifier: &str, f: impl Fn(&Value, &Value) -> EvalResult<Value> + 'static) -> Self {
        let render_op = identifier.to_owned();
        Self {
            identifier: identifier.to_owned(),
            arity: 2,
            kind: OperatorKind::Function,
            eval: Rc::new(move |children, _assignment| f(&children[0], &children[1])),
            render: Rc::new(move |children| format!("({} {} {})", children[0], render_op, children[1])),
        }
    }

    fn int_binary(identifier: &str, f: impl Fn(i64, i64) -> EvalResult<i64> + 'static) -> Self {
        Self::binary_infix(identifier, move |a, b| match (a, b) {
            (Value::Int(Integer::I64(x)), Value::Int(Integer::I64(y))) => Ok(Value::from(f(*x, *y)?)),
            _ => Err(EvalError::TypeMismatch {
                op: "int bitwise op",
                operands: format!("{}, {}", a.type_name(), b.type_name()),
            }),
        })
    }

    // ---- Boolean (2..=5 operands) -----------------------------------------

    #[must_use]
    pub fn logical_and(arity: usize) -> Self {
        Self::boolean_chain("and", arity, |vals| {
            for v in &vals[..vals.len() - 1] {
                if !truthy(v)? {
                    return Ok(v.clone());
                }
            }
            Ok(vals[vals.len() - 1].clone())
        })
    }

    #[must_use]
    pub fn logical_or(arity: usize) -> Self {
        Self::boolean_chain("or", arity, |vals| {
            for v in &vals[..vals.len() - 1] {
                if truthy(v)? {
                    return Ok(v.clone());
                }
            }
            Ok(vals[vals.len() - 1].clone())
        })
    }

    fn boolean_chain(identifier: &str, arity: usize, f: impl Fn(&[Value]) -> EvalResult<Value> + 'static) -> Self {
        assert!((2..=5).contains(&arity), "boolean operators take 2..=5 operands");
        let render_op = identifier.to_owned();
        Self {
            identifier: identifier.to_owned(),
            arity,
            kind: OperatorKind::Function,
            eval: Rc::new(move |children, _assignment| f(children)),
            render: Rc::new(move |children| format!("({})", children.join(&format!(" {render_op} "))),
            ),
        }
    }

    // ---- List constructor, subscript, slice --------------------------------

    #[must_use]
    pub fn list_literal(arity: usize) -> Self {
        assert!((1..=5).contains(&arity), "list constructor takes 1..=5 elements");
        Self {
            identifier: "[]".to_owned(),
            arity,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| Ok(Value::List(children.to_vec()))),
            render: Rc::new(|children| format!("[{}]", children.join(", "))),
        }
    }

    #[must_use]
    pub fn subscript() -> Self {
        Self {
            identifier: "subscript".to_owned(),
            arity: 2,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| {
                let index = as_index(&children[1])?;
                index_into(&children[0], index)
            }),
            render: Rc::new(|children| format!("{}[{}]", children[0], children[1])),
        }
    }

    /// `a[lo:hi:step]`. All three bound children may evaluate to `Value::Bool(false)` as a
    /// stand-in for Python's `None` bound (see [`crate::value::Value`]'s design notes on
    /// slices), matching the reader-level convention documented in `DESIGN.md`.
    #[must_use]
    pub fn slice() -> Self {
        Self {
            identifier: "slice".to_owned(),
            arity: 4,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| slice_value(&children[0], &children[1], &children[2], &children[3])),
            render: Rc::new(|children| {
                format!(
                    "{}[{}:{}:{}]",
                    children[0],
                    none_or(&children[1]),
                    none_or(&children[2]),
                    none_or(&children[3])
                )
            }),
        }
    }

    // ---- Functions ----------------------------------------------------------

    #[must_use]
    pub fn len_fn() -> Self {
        Self::unary_call("len", |v| match v {
            Value::List(items) => Ok(Value::from(items.len() as i64)),
            Value::Str(s) => Ok(Value::from(s.chars().count() as i64)),
            _ => Err(Self::type_mismatch("len", &[v])),
        })
    }

    #[must_use]
    pub fn abs_fn() -> Self {
        Self::unary_call("abs", |v| match v {
            Value::Int(i) => Ok(Value::from(num_bigint::BigInt::from(i.to_big().magnitude().clone()))),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            _ => Err(Self::type_mismatch("abs", &[v])),
        })
    }

    #[must_use]
    pub fn sorted_fn() -> Self {
        Self::unary_call("sorted", |v| match v {
            Value::List(items) => {
                let mut items = items.clone();
                sort_values(&mut items)?;
                Ok(Value::List(items))
            }
            _ => Err(Self::type_mismatch("sorted", &[v])),
        })
    }

    #[must_use]
    pub fn reversed_fn() -> Self {
        Self {
            identifier: "list(reversed(·))".to_owned(),
            arity: 1,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| match &children[0] {
                Value::List(items) => {
                    let mut items = items.clone();
                    items.reverse();
                    Ok(Value::List(items))
                }
                Value::Str(s) => Ok(Value::Str(s.chars().rev().collect())),
                other => Err(Self::type_mismatch("reversed", &[other])),
            }),
            render: Rc::new(|children| format!("list(reversed({}))", children[0])),
        }
    }

    #[must_use]
    pub fn index_method() -> Self {
        Self {
            identifier: "index".to_owned(),
            arity: 2,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| match &children[0] {
                Value::List(items) => items
                    .iter()
                    .position(|v| v == &children[1])
                    .map(|i| Value::from(i as i64))
                    .ok_or_else(|| EvalError::ValueError(format!("{} is not in list", children[1]))),
                Value::Str(s) => {
                    let Value::Str(needle) = &children[1] else {
                        return Err(Self::type_mismatch("index", &[&children[0], &children[1]]));
                    };
                    s.find(needle.as_str())
                        .map(|byte_idx| Value::from(s[..byte_idx].chars().count() as i64))
                        .ok_or_else(|| EvalError::ValueError(format!("{needle:?} is not in string")))
                }
                other => Err(Self::type_mismatch("index", &[other])),
            }),
            render: Rc::new(|children| format!("{}.index({})", children[0], children[1])),
        }
    }

    #[must_use]
    pub fn count_method() -> Self {
        Self {
            identifier: "count".to_owned(),
            arity: 2,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| match &children[0] {
                Value::List(items) => Ok(Value::from(items.iter().filter(|v| *v == &children[1]).count() as i64)),
                Value::Str(s) => {
                    let Value::Str(needle) = &children[1] else {
                        return Err(Self::type_mismatch("count", &[&children[0], &children[1]]));
                    };
                    if needle.is_empty() {
                        Ok(Value::from((s.chars().count() + 1) as i64))
                    } else {
                        Ok(Value::from(s.matches(needle.as_str()).count() as i64))
                    }
                }
                other => Err(Self::type_mismatch("count", &[other])),
            }),
            render: Rc::new(|children| format!("{}.count({})", children[0], children[1])),
        }
    }

    #[must_use]
    pub fn join_method() -> Self {
        Self {
            identifier: "join".to_owned(),
            arity: 2,
            kind: OperatorKind::Function,
            eval: Rc::new(|children, _assignment| match (&children[0], &children[1]) {
                (Value::Str(sep), Value::List(items)) => {
                    let mut parts = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Str(s) => parts.push(s.clone()),
                            other => return Err(Self::type_mismatch("join", &[other])),
                        }
                    }
                    Ok(Value::Str(parts.join(sep)))
                }
                _ => Err(Self::type_mismatch("join", &[&children[0], &children[1]])),
            }),
            render: Rc::new(|children| format!("{}.join({})", children[0], children[1])),
        }
    }

    #[must_use]
    pub fn capitalize_method() -> Self {
        Self::str_case_method("capitalize", |s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
    }

    #[must_use]
    pub fn casefold_method() -> Self {
        Self::str_case_method("casefold", str::to_lowercase)
    }

    #[must_use]
    pub fn lower_method() -> Self {
        Self::str_case_method("lower", str::to_lowercase)
    }

    #[must_use]
    pub fn upper_method() -> Self {
        Self::str_case_method("upper", str::to_uppercase)
    }

    #[must_use]
    pub fn title_method() -> Self {
        Self::str_case_method("title", |s| {
            let mut out = String::with_capacity(s.len());
            let mut prev_is_alpha = false;
            for c in s.chars() {
                if c.is_alphabetic() {
                    if prev_is_alpha {
                        out.extend(c.to_lowercase());
                    } else {
                        out.extend(c.to_uppercase());
                    }
                    prev_is_alpha = true;
                } else {
                    out.push(c);
                    prev_is_alpha = false;
                }
            }
            out
        })
    }

    fn str_case_method(name: &'static str, f: impl Fn(&str) -> String + 'static) -> Self {
        Self {
            identifier: name.to_owned(),
            arity: 1,
            kind: OperatorKind::Function,
            eval: Rc::new(move |children, _assignment| match &children[0] {
                Value::Str(s) => Ok(Value::Str(f(s))),
                other => Err(Self::type_mismatch(name, &[other])),
            }),
            render: Rc::new(move |children| format!("{}.{}()", children[0], name)),
        }
    }

    fn unary_call(name: &'static str, f: impl Fn(&Value) -> EvalResult<Value> + 'static) -> Self {
        Self {
            identifier: name.to_owned(),
            arity: 1,
            kind: OperatorKind::Function,
            eval: Rc::new(move |children, _assignment| f(&children[0])),
            render: Rc::new(move |children| format!("{name}({})", children[0])),
        }
    }

    // ---- Generic ---------------------------------------------------------

    /// Builds an arbitrary `arity`-ary operator from caller-supplied semantics and a source
    /// renderer. Used by [`crate::grammar`] to turn a user-supplied expression template (read
    /// from a grammar file, with placeholders like `EXP1`) into a catalog entry: the grammar
    /// module compiles the template into these two closures once, up front, rather than
    /// re-parsing the template on every evaluation.
    pub fn generic(
        identifier: impl Into<String>,
        arity: usize,
        eval: impl Fn(&[Value], &Assignment) -> EvalResult<Value> + 'static,
        render: impl Fn(&[String]) -> String + 'static,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            arity,
            kind: OperatorKind::Generic,
            eval: Rc::new(eval),
            render: Rc::new(render),
        }
    }
}

fn none_or(s: &str) -> &str {
    if s == "None" { "" } else { s }
}

fn truthy(v: &Value) -> EvalResult<bool> {
    Ok(match v {
        Value::Bool(b) => *b,
        Value::Int(i) => !i.is_zero(),
        Value::Float(f) => *f != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::List(items) => !items.is_empty(),
    })
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(i.to_f64()),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn as_usize(i: &Integer) -> Option<usize> {
    match i {
        Integer::I64(v) if *v >= 0 => Some(*v as usize),
        _ => None,
    }
}

fn as_index(v: &Value) -> EvalResult<i64> {
    match v {
        Value::Int(Integer::I64(i)) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(Operator::type_mismatch("subscript index", &[other])),
    }
}

fn numeric_or_concat(
    a: &Value,
    b: &Value,
    op: &'static str,
    int_op: impl Fn(num_bigint::BigInt, num_bigint::BigInt) -> num_bigint::BigInt,
    float_op: impl Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::from(int_op(x.to_big(), y.to_big()))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(float_op(*x, *y))),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(float_op(x.to_f64(), *y))),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(float_op(*x, y.to_f64()))),
        (Value::Str(x), Value::Str(y)) if op == "+" => Ok(Value::Str(format!("{x}{y}"))),
        (Value::List(x), Value::List(y)) if op == "+" => {
            let mut out = x.clone();
            out.extend(y.iter().cloned());
            Ok(Value::List(out))
        }
        _ => Err(Operator::type_mismatch(op, &[a, b])),
    }
}

fn numeric_only(
    a: &Value,
    b: &Value,
    op: &'static str,
    int_op: impl Fn(num_bigint::BigInt, num_bigint::BigInt) -> num_bigint::BigInt,
    float_op: impl Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::from(int_op(x.to_big(), y.to_big()))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(float_op(*x, *y))),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(float_op(x.to_f64(), *y))),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(float_op(*x, y.to_f64()))),
        _ => Err(Operator::type_mismatch(op, &[a, b])),
    }
}

fn index_into(container: &Value, index: i64) -> EvalResult<Value> {
    match container {
        Value::List(items) => {
            let len = items.len() as i64;
            let real = if index < 0 { index + len } else { index };
            if real < 0 || real >= len {
                return Err(EvalError::IndexOutOfRange);
            }
            Ok(items[real as usize].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let real = if index < 0 { index + len } else { index };
            if real < 0 || real >= len {
                return Err(EvalError::IndexOutOfRange);
            }
            Ok(Value::Str(chars[real as usize].to_string()))
        }
        other => Err(Operator::type_mismatch("subscript", &[other])),
    }
}

fn slice_value(container: &Value, lo: &Value, hi: &Value, step: &Value) -> EvalResult<Value> {
    let len = match container {
        Value::List(items) => items.len(),
        Value::Str(s) => s.chars().count(),
        other => return Err(Operator::type_mismatch("slice", &[other])),
    } as i64;
    let step = match step {
        Value::Bool(false) => 1,
        Value::Int(Integer::I64(s)) => *s,
        other => return Err(Operator::type_mismatch("slice step", &[other])),
    };
    if step == 0 {
        return Err(EvalError::ValueError("slice step cannot be zero".to_owned()));
    }
    let resolve = |bound: &Value, default_forward: i64, default_backward: i64| -> EvalResult<i64> {
        match bound {
            Value::Bool(false) => Ok(if step > 0 { default_forward } else { default_backward }),
            Value::Int(Integer::I64(i)) => {
                let real = if *i < 0 { i + len } else { *i };
                Ok(real.clamp(if step > 0 { 0 } else { -1 }, len))
            }
            other => Err(Operator::type_mismatch("slice bound", &[other])),
        }
    };
    let start = resolve(lo, 0, len - 1)?;
    let stop = resolve(hi, len, -1)?;

    let mut indices = Vec::new();
    if step > 0 {
        let mut i = start;
        while i < stop && i < len {
            if i >= 0 {
                indices.push(i as usize);
            }
            i += step;
        }
    } else {
        let mut i = start;
        while i > stop && i >= 0 {
            if i < len {
                indices.push(i as usize);
            }
            i += step;
        }
    }

    match container {
        Value::List(items) => Ok(Value::List(indices.into_iter().map(|i| items[i].clone()).collect())),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::Str(indices.into_iter().map(|i| chars[i]).collect()))
        }
        _ => unreachable!("checked above"),
    }
}

/// Sorts list elements using the same "distance sums to 1 => type error" philosophy as the
/// rest of the catalog: mixed-type lists raise a recoverable value error instead of panicking.
fn sort_values(items: &mut [Value]) -> EvalResult<()> {
    let mut err = None;
    items.sort_by(|a, b| match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.to_big().cmp(&y.to_big()),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => {
            err = Some(EvalError::ValueError("cannot sort mixed-type list".to_owned()));
            std::cmp::Ordering::Equal
        }
    });
    match err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn env() -> Assignment {
        IndexMap::new()
    }

    #[test]
    fn add_promotes_mixed_int_float() {
        let op = Operator::add();
        let result = op.eval(&[Value::from(1_i64), Value::from(2.5_f64)], &env()).unwrap();
        assert_eq!(result, Value::Float(3.5));
    }

    #[test]
    fn floor_div_by_zero_is_recoverable() {
        let op = Operator::floor_div();
        let err = op.eval(&[Value::from(1_i64), Value::from(0_i64)], &env()).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn subscript_supports_negative_index() {
        let op = Operator::subscript();
        let list = Value::List(vec![Value::from(1_i64), Value::from(2_i64), Value::from(3_i64)]);
        let result = op.eval(&[list, Value::from(-1_i64)], &env()).unwrap();
        assert_eq!(result, Value::from(3_i64));
    }

    #[test]
    fn slice_default_bounds_with_step_two() {
        let op = Operator::slice();
        let list = Value::List((0..6).map(Value::from).collect());
        let result = op
            .eval(&[list, Value::Bool(false), Value::Bool(false), Value::from(2_i64)], &env())
            .unwrap();
        assert_eq!(result, Value::List(vec![Value::from(0_i64), Value::from(2_i64), Value::from(4_i64)]));
    }

    #[test]
    fn variable_looks_up_assignment() {
        let op = Operator::variable("x");
        let mut a = env();
        a.insert("x".to_owned(), Value::from(42_i64));
        assert_eq!(op.eval(&[], &a).unwrap(), Value::from(42_i64));
    }

    #[test]
    fn variable_missing_is_recoverable() {
        let op = Operator::variable("missing");
        assert!(op.eval(&[], &env()).is_err());
    }
}
