//! Readers that materialize a grammar and an example set from external files.
//!
//! These are deliberately thin: they parse a textual format into the core's own
//! [`crate::grammar::SearchSpace`] and [`crate::example::ExampleSet`] types and otherwise hold
//! no state of their own.

pub mod csv;
pub mod literal;
pub mod txt;

pub use literal::parse_literal;
