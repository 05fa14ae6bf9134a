//! The example set the enumerator evaluates candidates against.

use indexmap::IndexMap;

use crate::value::Value;

/// A single example's variable environment: `name -> value`.
///
/// Backed by an `IndexMap` so iteration order matches insertion order, which keeps error
/// messages and generic-operator template evaluation deterministic across examples sharing
/// the same variable domain.
pub type Assignment = IndexMap<String, Value>;

/// An ordered set of input-output pairs. Order is significant: every per-example vector in
/// the rest of the crate (value vectors, assignments) aligns positionally with this order.
#[derive(Debug, Clone, Default)]
pub struct ExampleSet {
    assignments: Vec<Assignment>,
    expected: Vec<Value>,
}

impl ExampleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, assignment: Assignment, expected: Value) {
        self.assignments.push(assignment);
        self.expected.push(expected);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    #[must_use]
    pub fn expected(&self) -> &[Value] {
        &self.expected
    }

    /// Variable names shared by every assignment, in the order first seen.
    #[must_use]
    pub fn variable_domain(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(first) = self.assignments.first() {
            names.extend(first.keys().cloned());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_examples_in_insertion_order() {
        let mut set = ExampleSet::new();
        let mut a1 = Assignment::new();
        a1.insert("x".to_owned(), Value::from(1_i64));
        set.push(a1, Value::from(1_i64));
        let mut a2 = Assignment::new();
        a2.insert("x".to_owned(), Value::from(2_i64));
        set.push(a2, Value::from(2_i64));
        assert_eq!(set.len(), 2);
        assert_eq!(set.variable_domain(), vec!["x".to_owned()]);
    }
}
