//! Bottom-up, iterative-deepening enumeration over a [`SearchSpace`].

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use smallvec::SmallVec;

use crate::arena::{ExprArena, ExprId};
use crate::equivalence::EquivalenceManager;
use crate::example::ExampleSet;
use crate::grammar::SearchSpace;
use crate::operator::Operator;
use crate::value::Value;

/// Cooperative cancellation flag a strategy can set from outside the enumeration loop (there
/// is no concurrency here -- it is polled at candidate boundaries, e.g. from a signal handler
/// installed by the CLI before starting search).
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Produces every candidate expression over `grammar`, in order of non-decreasing height, up
/// to `max_height`, skipping anything observationally equivalent to an earlier candidate.
///
/// Not an `Iterator` in the std sense: yielding requires mutable access to the arena that owns
/// the node just produced, and threading that arena through `Iterator::next` without interior
/// mutability would fight the borrow checker for no benefit, since the sole consumer is the
/// strategy layer's own driving loop. [`Self::run`] instead takes a visitor closure, matching
/// how the reference design treats `enumerate` as a generator driven to exhaustion or early
/// return by its single caller.
pub struct Enumerator<'a> {
    grammar: &'a SearchSpace,
    max_height: u32,
    current_height: u32,
    program_counter: u64,
    cancel: CancelToken,
}

impl<'a> Enumerator<'a> {
    #[must_use]
    pub fn new(grammar: &'a SearchSpace, max_height: u32) -> Self {
        Self { grammar, max_height, current_height: 0, program_counter: 0, cancel: CancelToken::new() }
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn current_height(&self) -> u32 {
        self.current_height
    }

    #[must_use]
    pub fn program_counter(&self) -> u64 {
        self.program_counter
    }

    /// Drives enumeration to completion (or to cancellation), calling `visit` for every
    /// accepted candidate. `visit` returns `true` to keep going, `false` to stop early -- the
    /// strategy layer uses this for strategies that only need the first match.
    pub fn run(
        &mut self,
        arena: &mut ExprArena,
        examples: &ExampleSet,
        mut visit: impl FnMut(&mut Self, &mut ExprArena, ExprId) -> bool,
    ) {
        let mut equivalence = EquivalenceManager::new();

        for op in self.grammar.terminals() {
            if self.cancel.is_cancelled() {
                return;
            }
            let id = self.build_terminal(arena, op, examples);
            if self.accept(arena, &mut equivalence, id) && !visit(self, arena, id) {
                return;
            }
        }
        equivalence.advance_height();

        for height in 1..=self.max_height {
            self.current_height = height;
            for (arity, operators) in self.grammar.functions() {
                for op in operators {
                    if self.cancel.is_cancelled() {
                        return;
                    }
                    let last = equivalence.last_height_programs().to_vec();
                    let prev = equivalence.previous_height_programs();
                    for children in child_tuples(arity, &last, &prev) {
                        if self.cancel.is_cancelled() {
                            return;
                        }
                        self.program_counter += 1;
                        let Some(id) = self.build_nonterminal(arena, Rc::clone(op), &children, examples, height)
                        else {
                            continue;
                        };
                        if self.accept(arena, &mut equivalence, id) && !visit(self, arena, id) {
                            return;
                        }
                    }
                }
            }
            equivalence.advance_height();
        }
    }

    fn accept(&self, arena: &ExprArena, equivalence: &mut EquivalenceManager, id: ExprId) -> bool {
        let values = arena.get(id).values();
        if equivalence.is_equivalent(values) {
            return false;
        }
        equivalence.intern(values.to_vec(), id);
        true
    }

    fn build_terminal(&mut self, arena: &mut ExprArena, op: &Rc<Operator>, examples: &ExampleSet) -> ExprId {
        let values = examples
            .assignments()
            .iter()
            .map(|a| op.eval(&[], a).expect("terminal evaluation is infallible"))
            .collect();
        arena.push(crate::expression::Expression::new_terminal(Rc::clone(op), values))
    }

    fn build_nonterminal(
        &mut self,
        arena: &mut ExprArena,
        op: Rc<Operator>,
        children: &[ExprId],
        examples: &ExampleSet,
        height: u32,
    ) -> Option<ExprId> {
        let mut values = Vec::with_capacity(examples.len());
        for (i, assignment) in examples.assignments().iter().enumerate() {
            let child_values: Vec<Value> = children.iter().map(|&c| arena.get(c).value_at(i).clone()).collect();
            match op.eval(&child_values, assignment) {
                Ok(v) => values.push(v),
                Err(_recoverable) => return None,
            }
        }
        let children: SmallVec<[ExprId; 5]> = children.iter().copied().collect();
        Some(arena.push(crate::expression::Expression::new(op, children, values, height)))
    }
}

/// Generates every children-tuple of length `arity` that contains at least one element from
/// `last`, with the remaining positions drawn from the Cartesian product of `prev`. Iterates
/// position `i` ascending, then `last` ascending, then the product over `prev` in lexicographic
/// order, matching the deterministic ordering required for reproducible output.
fn child_tuples(arity: usize, last: &[ExprId], prev: &[ExprId]) -> Vec<Vec<ExprId>> {
    let mut out = Vec::new();
    for i in 0..arity {
        for &pivot in last {
            for combo in cartesian_power(prev, arity - 1) {
                let mut tuple = Vec::with_capacity(arity);
                tuple.extend_from_slice(&combo[..i]);
                tuple.push(pivot);
                tuple.extend_from_slice(&combo[i..]);
                out.push(tuple);
            }
        }
    }
    out
}

/// The Cartesian product of `items` with itself `power` times, in lexicographic order (the
/// last factor varies fastest), as repeated by the reference enumerator's own
/// `itertools.product(prev, repeat=arity-1)` call.
fn cartesian_power(items: &[ExprId], power: usize) -> Vec<Vec<ExprId>> {
    if power == 0 {
        return vec![Vec::new()];
    }
    let mut out = vec![Vec::new()];
    for _ in 0..power {
        let mut next = Vec::with_capacity(out.len() * items.len().max(1));
        for prefix in &out {
            for &item in items {
                let mut extended = prefix.clone();
                extended.push(item);
                next.push(extended);
            }
        }
        out = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn examples_xyz() -> ExampleSet {
        let mut set = ExampleSet::new();
        let rows = [(1_i64, 2_i64, 3_i64, 6_i64), (2, 4, 5, 11), (11, 22, 3, 36)];
        for (x, y, z, out) in rows {
            let mut a = IndexMap::new();
            a.insert("x".to_owned(), Value::from(x));
            a.insert("y".to_owned(), Value::from(y));
            a.insert("z".to_owned(), Value::from(z));
            set.push(a, Value::from(out));
        }
        set
    }

    #[test]
    fn enumerates_terminals_before_taller_programs() {
        let mut grammar = SearchSpace::new();
        grammar.add_variables(["x", "y", "z"]);
        grammar.add_function(Operator::add());
        let examples = examples_xyz();
        let mut arena = ExprArena::new();
        let mut heights = Vec::new();
        Enumerator::new(&grammar, 2).run(&mut arena, &examples, |_enumerator, arena, id| {
            heights.push(arena.get(id).height());
            true
        });
        assert!(heights.windows(2).all(|w| w[0] <= w[1]), "heights must be non-decreasing: {heights:?}");
    }

    #[test]
    fn finds_sum_of_three_variables() {
        let mut grammar = SearchSpace::new();
        grammar.add_variables(["x", "y", "z"]);
        grammar.add_function(Operator::add());
        let examples = examples_xyz();
        let mut arena = ExprArena::new();
        let mut found = None;
        Enumerator::new(&grammar, 3).run(&mut arena, &examples, |_enumerator, arena, id| {
            if arena.get(id).values() == examples.expected() {
                found = Some(id);
                false
            } else {
                true
            }
        });
        let id = found.expect("x + y + z is within height 3");
        assert_eq!(arena.get(id).render(&arena), "((x + y) + z)");
    }

    #[test]
    fn prunes_commutative_duplicate() {
        let mut grammar = SearchSpace::new();
        grammar.add_variables(["x", "y"]);
        grammar.add_function(Operator::add());
        let mut set = ExampleSet::new();
        for (x, y) in [(1_i64, 2_i64), (3, 4)] {
            let mut a = IndexMap::new();
            a.insert("x".to_owned(), Value::from(x));
            a.insert("y".to_owned(), Value::from(y));
            set.push(a, Value::from(x + y));
        }
        let mut arena = ExprArena::new();
        let mut renders = Vec::new();
        Enumerator::new(&grammar, 2).run(&mut arena, &set, |_enumerator, arena, id| {
            if arena.get(id).height() == 1 {
                renders.push(arena.get(id).render(arena));
            }
            true
        });
        assert!(renders.contains(&"(x + y)".to_owned()));
        assert!(!renders.contains(&"(y + x)".to_owned()));
    }
}
