//! Error kinds for the synthesizer core.
//!
//! Two error families exist, matching the propagation policy: [`EvalError`] is always
//! recoverable -- the enumerator swallows it and skips the candidate that raised it -- while
//! [`SynthError`] is fatal and aborts a run with a single diagnostic line.

use strum::Display;

/// Failure while computing a candidate's value vector. Always recoverable: the enumerator
/// catches these and treats the candidate as [`InvalidExpression`](EvalError), never
/// propagating them past `enumerate`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EvalError {
    #[strum(to_string = "division by zero")]
    DivisionByZero,
    #[strum(to_string = "numeric overflow")]
    Overflow,
    #[strum(to_string = "index out of range")]
    IndexOutOfRange,
    #[strum(to_string = "key not found: {0}")]
    KeyError(String),
    #[strum(to_string = "type mismatch: {op} does not accept ({operands})")]
    TypeMismatch { op: &'static str, operands: String },
    #[strum(to_string = "{0}")]
    ValueError(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Fatal errors from parsing external inputs (grammars, example sets, settings files) or
/// from a grammar referencing an operator the catalog doesn't know.
#[derive(Debug, Display)]
pub enum SynthError {
    #[strum(to_string = "input parse error: {0}")]
    InputParse(String),
    #[strum(to_string = "unknown operator '{identifier}' at arity {arity}")]
    UnknownOperator { identifier: String, arity: usize },
    #[strum(to_string = "io error: {0}")]
    Io(String),
}

impl std::error::Error for SynthError {}

impl From<std::io::Error> for SynthError {
    fn from(err: std::io::Error) -> Self {
        SynthError::Io(err.to_string())
    }
}

impl From<csv::Error> for SynthError {
    fn from(err: csv::Error) -> Self {
        SynthError::InputParse(err.to_string())
    }
}

pub type SynthResult<T> = Result<T, SynthError>;
