#![doc = include_str!("../../../README.md")]

pub mod arena;
pub mod catalog;
pub mod enumerator;
pub mod equivalence;
pub mod error;
pub mod example;
pub mod expression;
pub mod grammar;
pub mod io;
pub mod metric;
pub mod operator;
pub mod settings;
pub mod strategy;
pub mod template;
pub mod value;

pub use crate::arena::{ExprArena, ExprId};
pub use crate::enumerator::{CancelToken, Enumerator};
pub use crate::equivalence::EquivalenceManager;
pub use crate::error::{EvalError, EvalResult, SynthError, SynthResult};
pub use crate::example::{Assignment, ExampleSet};
pub use crate::expression::Expression;
pub use crate::grammar::SearchSpace;
pub use crate::metric::Metric;
pub use crate::operator::{Operator, OperatorKind};
pub use crate::settings::BenchmarkSettings;
pub use crate::value::{Integer, Value};
