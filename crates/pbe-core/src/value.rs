//! The dynamic runtime value type shared by every layer of the synthesizer.
//!
//! Values are produced pointwise by [`crate::operator::Operator`] semantics, compared
//! structurally by metrics, and hashed into an [`crate::equivalence::EquivalenceManager`]
//! signature. Equality and hashing must be deterministic across runs: floats are
//! compared and hashed by their IEEE-754 bit pattern rather than `PartialEq`'s NaN-unequal
//! semantics, since two candidates producing the same NaN bit pattern on every example are
//! observationally equivalent for our purposes.

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;

/// A dynamically typed value flowing through example evaluation.
///
/// Mirrors the runtime-value sum types common to small interpreters: one variant per
/// supported type, structural equality, and no implicit coercions beyond what individual
/// operators choose to perform.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(Integer),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Bool(bool),
}

/// An integer value, promoted to an arbitrary-precision [`BigInt`] on overflow of `i64`.
///
/// Literals and most arithmetic stay in the `I64` fast path; [`Integer::checked_op`] helpers
/// promote to `Big` only when an operation would overflow, matching the "Int(i64-or-bigint)"
/// variant called for in the value model.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Integer {
    I64(i64),
    Big(BigInt),
}

impl Integer {
    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Integer::I64(value)
    }

    #[must_use]
    pub fn to_big(&self) -> BigInt {
        match self {
            Integer::I64(v) => BigInt::from(*v),
            Integer::Big(b) => b.clone(),
        }
    }

    /// Demotes a `BigInt` back to `I64` when it fits, keeping the fast path canonical.
    #[must_use]
    pub fn normalize(big: BigInt) -> Self {
        match i64::try_from(&big) {
            Ok(v) => Integer::I64(v),
            Err(_) => Integer::Big(big),
        }
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Integer::I64(v) => *v as f64,
            Integer::Big(b) => {
                use num_traits::ToPrimitive;
                b.to_f64().unwrap_or(f64::INFINITY)
            }
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Integer::I64(v) => *v == 0,
            Integer::Big(b) => b == &BigInt::from(0),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::I64(v) => write!(f, "{v}"),
            Integer::Big(b) => write!(f, "{b}"),
        }
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.to_big() == other.to_big()
    }
}
impl Eq for Integer {}

impl Hash for Integer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash through the canonical BigInt form so I64(5) and Big(5) collide.
        self.to_big().hash(state);
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(Integer::I64(v))
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(Integer::normalize(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Bool(_) => "bool",
        }
    }

    #[must_use]
    pub fn same_variant(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Renders the value the way the generic-operator template evaluator and the unparse
    /// layer expect Python literals to look.
    #[must_use]
    pub fn render_literal(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.1}")
                } else {
                    format!("{f}")
                }
            }
            Value::Str(s) => format!("{s:?}"),
            Value::Bool(b) => {
                if *b {
                    "True".to_owned()
                } else {
                    "False".to_owned()
                }
            }
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::render_literal).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_literal())
    }
}

/// Structural equality. Floats compare by bit pattern so that `NaN == NaN` holds and two
/// candidates which both produce `NaN` on an example are correctly treated as equivalent.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::List(items) => {
                for item in items {
                    item.hash(state);
                }
            }
            Value::Bool(b) => b.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_nan_is_reflexively_equal_by_bits() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
    }

    #[test]
    fn int_and_bigint_forms_compare_equal() {
        let a = Value::Int(Integer::I64(5));
        let b = Value::Int(Integer::Big(BigInt::from(5)));
        assert_eq!(a, b);
    }

    #[test]
    fn list_hash_is_elementwise() {
        use std::collections::hash_map::DefaultHasher;
        let a = Value::List(vec![Value::from(1_i64), Value::from(2_i64)]);
        let b = Value::List(vec![Value::from(1_i64), Value::from(2_i64)]);
        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn different_variants_are_unequal() {
        assert_ne!(Value::from(1_i64), Value::from(1.0_f64));
    }
}
