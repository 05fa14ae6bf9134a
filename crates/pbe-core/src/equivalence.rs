//! Observational-equivalence pruning.
//!
//! Interns expressions by their value-vector signature, keeping exactly one representative per
//! equivalence class, and partitions the accepted representatives into per-height buckets so
//! the enumerator can ask for "everything at the previous height" and "everything at exactly
//! the last height" separately. Grounded in the same signature-table idea as an interning
//! table keyed by structural hash, generalized from interning syntax to interning behavior.

use ahash::AHashMap;

use crate::arena::ExprId;
use crate::value::Value;

/// A value vector is its own signature: [`Value`]'s `Hash`/`Eq` impls already flatten lists
/// element-wise and compare floats by bit pattern, so two candidates that behave identically
/// on every example hash and compare equal here with no extra canonicalization step.
type Signature = Vec<Value>;

#[derive(Debug, Default)]
pub struct EquivalenceManager {
    classes: AHashMap<Signature, ExprId>,
    height_buckets: Vec<Vec<ExprId>>,
}

impl EquivalenceManager {
    #[must_use]
    pub fn new() -> Self {
        Self { classes: AHashMap::new(), height_buckets: vec![Vec::new()] }
    }

    #[must_use]
    pub fn is_equivalent(&self, values: &[Value]) -> bool {
        self.classes.contains_key(values)
    }

    /// Records `id` as the canonical representative of `values`'s equivalence class and adds
    /// it to the current height bucket. Panics if `values` is already interned -- callers must
    /// check [`Self::is_equivalent`] first, matching the `assert` in the reference
    /// implementation this mirrors.
    pub fn intern(&mut self, values: Vec<Value>, id: ExprId) {
        assert!(!self.is_equivalent(&values), "value vector already has a canonical representative");
        self.classes.insert(values, id);
        self.height_buckets.last_mut().expect("at least one bucket always exists").push(id);
    }

    /// Every canonical id from a height strictly below the current bucket.
    #[must_use]
    pub fn previous_height_programs(&self) -> Vec<ExprId> {
        let current = self.height_buckets.len() - 1;
        self.height_buckets[..current].iter().flatten().copied().collect()
    }

    /// The bucket immediately below the current one; empty before the second `advance_height`.
    #[must_use]
    pub fn last_height_programs(&self) -> &[ExprId] {
        let current = self.height_buckets.len() - 1;
        if current == 0 {
            &[]
        } else {
            &self.height_buckets[current - 1]
        }
    }

    pub fn advance_height(&mut self) {
        self.height_buckets.push(Vec::new());
    }

    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ExprId;

    fn id(n: u32) -> ExprId {
        // ExprId has no public constructor outside the arena; tests in this module only
        // compare ids for identity, so any arena-assigned sequence of ids works.
        let mut arena = crate::arena::ExprArena::new();
        for _ in 0..n {
            arena.push(crate::expression::Expression::new_terminal(
                std::rc::Rc::new(crate::operator::Operator::literal(Value::from(0_i64))),
                vec![],
            ));
        }
        arena.push(crate::expression::Expression::new_terminal(
            std::rc::Rc::new(crate::operator::Operator::literal(Value::from(0_i64))),
            vec![],
        ))
    }

    #[test]
    fn duplicate_signature_is_rejected() {
        let mut mgr = EquivalenceManager::new();
        let sig = vec![Value::from(1_i64)];
        mgr.intern(sig.clone(), id(0));
        assert!(mgr.is_equivalent(&sig));
    }

    #[test]
    fn buckets_separate_last_from_previous() {
        let mut mgr = EquivalenceManager::new();
        mgr.intern(vec![Value::from(1_i64)], id(0));
        mgr.advance_height();
        mgr.intern(vec![Value::from(2_i64)], id(1));
        assert_eq!(mgr.previous_height_programs().len(), 1);
        assert_eq!(mgr.last_height_programs().len(), 1);
        mgr.advance_height();
        assert_eq!(mgr.previous_height_programs().len(), 2);
        assert!(mgr.last_height_programs().is_empty() || mgr.last_height_programs().len() == 1);
    }
}
