//! Candidate program nodes.
//!
//! An `Expression` pairs an [`Operator`] with its children and the value vector that operator
//! produces across every example. The value vector is computed eagerly, at construction time,
//! because the enumerator needs it immediately to intern the node into the equivalence
//! manager's signature table. The node's *source text* is the opposite: most candidates the
//! enumerator builds are pruned as observationally equivalent to something already seen and
//! never get printed, so rendering is deferred into a one-shot memoized cell and only paid for
//! by the handful of candidates a strategy actually keeps.

use std::cell::OnceCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::arena::{ExprArena, ExprId};
use crate::operator::Operator;
use crate::value::Value;

/// A candidate expression node living in an [`ExprArena`].
#[derive(Debug)]
pub struct Expression {
    operator: Rc<Operator>,
    children: SmallVec<[ExprId; 5]>,
    values: Vec<Value>,
    height: u32,
    source: OnceCell<String>,
}

impl Expression {
    /// Builds a height-0 node: a literal or a variable reference, with no children.
    #[must_use]
    pub fn new_terminal(operator: Rc<Operator>, values: Vec<Value>) -> Self {
        debug_assert_eq!(operator.arity, 0, "terminal operator must have arity 0");
        Self { operator, children: SmallVec::new(), values, height: 0, source: OnceCell::new() }
    }

    /// Builds a node with children, whose height is one more than its tallest child.
    #[must_use]
    pub fn new(operator: Rc<Operator>, children: SmallVec<[ExprId; 5]>, values: Vec<Value>, height: u32) -> Self {
        debug_assert_eq!(operator.arity, children.len(), "operator arity must match child count");
        Self { operator, children, values, height, source: OnceCell::new() }
    }

    #[must_use]
    pub fn operator(&self) -> &Rc<Operator> {
        &self.operator
    }

    #[must_use]
    pub fn children(&self) -> &[ExprId] {
        &self.children
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Renders this node's source text, recursing into children through `arena`. Memoized: the
    /// first call does the work, every later call on the same node is a cache hit.
    #[must_use]
    pub fn render(&self, arena: &ExprArena) -> String {
        self.source
            .get_or_init(|| {
                let child_source: Vec<String> =
                    self.children.iter().map(|&id| arena.get(id).render(arena)).collect();
                self.operator.render(&child_source)
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ExprArena;

    #[test]
    fn terminal_has_height_zero_and_no_children() {
        let op = Rc::new(Operator::literal(Value::from(1_i64)));
        let expr = Expression::new_terminal(op, vec![Value::from(1_i64)]);
        assert_eq!(expr.height(), 0);
        assert!(expr.children().is_empty());
    }

    #[test]
    fn non_terminal_height_is_one_plus_tallest_child() {
        let mut arena = ExprArena::new();
        let x = Rc::new(Operator::variable("x"));
        let leaf_id = arena.push(Expression::new_terminal(x, vec![Value::from(2_i64)]));
        let neg = Rc::new(Operator::unary_minus());
        let node = Expression::new(neg, smallvec::smallvec![leaf_id], vec![Value::from(-2_i64)], 1);
        assert_eq!(node.height(), 1);
        let id = arena.push(node);
        assert_eq!(arena.get(id).render(&arena), "-x");
    }

    #[test]
    fn render_is_memoized_across_calls() {
        let mut arena = ExprArena::new();
        let op = Rc::new(Operator::literal(Value::from(7_i64)));
        let id = arena.push(Expression::new_terminal(op, vec![Value::from(7_i64)]));
        assert_eq!(arena.get(id).render(&arena), "7");
        assert_eq!(arena.get(id).render(&arena), "7");
    }
}
