//! Selection policies over the enumerator's lazy stream.
//!
//! Every strategy drives the same [`Enumerator::run`] loop and scores each candidate with
//! `Σ metric.distance(candidate.value[i], expected[i])`; they differ only in their stopping
//! rule and what they keep. None of them hold onto candidates the caller doesn't ask for --
//! `top_k` and `best_by_height` are the two that accumulate more than one winner, and both
//! bound what they keep by a size the caller supplies up front.

use crate::arena::{ExprArena, ExprId};
use crate::enumerator::{CancelToken, Enumerator};
use crate::example::ExampleSet;
use crate::grammar::SearchSpace;
use crate::metric::Metric;

/// Bookkeeping every strategy reports alongside its result, for `--statistics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub programs_searched: u64,
    pub max_height_reached: u32,
}

impl SearchStats {
    fn from_enumerator(enumerator: &Enumerator<'_>) -> Self {
        Self { programs_searched: enumerator.program_counter(), max_height_reached: enumerator.current_height() }
    }
}

fn score(arena: &ExprArena, id: ExprId, expected: &[crate::value::Value], metric: &dyn Metric) -> f64 {
    arena.get(id).values().iter().zip(expected).map(|(actual, expected)| metric.distance(actual, expected)).sum()
}

/// First program whose value vector matches `expected` exactly, if any appears within
/// `max_height`.
#[must_use]
pub fn find_exact(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
) -> (Option<ExprId>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let mut found = None;
    let mut enumerator = Enumerator::new(grammar, max_height);
    enumerator.run(&mut arena, examples, |_e, arena, id| {
        if arena.get(id).values() == examples.expected() {
            found = Some(id);
            false
        } else {
            true
        }
    });
    (found, arena, SearchStats::from_enumerator(&enumerator))
}

/// First program scoring at or under `error_sum`.
#[must_use]
pub fn find_within_error_sum(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
    error_sum: f64,
) -> (Option<ExprId>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let mut found = None;
    let mut enumerator = Enumerator::new(grammar, max_height);
    enumerator.run(&mut arena, examples, |_e, arena, id| {
        if score(arena, id, examples.expected(), metric) <= error_sum {
            found = Some(id);
            false
        } else {
            true
        }
    });
    (found, arena, SearchStats::from_enumerator(&enumerator))
}

/// First program scoring at or under `error_rate * example_count`.
#[must_use]
pub fn find_within_error_rate(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
    error_rate: f64,
) -> (Option<ExprId>, ExprArena, SearchStats) {
    find_within_error_sum(grammar, examples, max_height, metric, error_rate * examples.len() as f64)
}

/// After exhausting the stream, the single program minimizing score; ties keep the
/// earliest-discovered program.
#[must_use]
pub fn find_best_by_height(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
) -> (Option<ExprId>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let mut best: Option<(ExprId, f64)> = None;
    let initial = examples.len() as f64 + 1.0;
    let mut enumerator = Enumerator::new(grammar, max_height);
    enumerator.run(&mut arena, examples, |_e, arena, id| {
        let curr = score(arena, id, examples.expected(), metric);
        let best_so_far = best.as_ref().map_or(initial, |(_, s)| *s);
        if curr < best_so_far {
            best = Some((id, curr));
        }
        true
    });
    (best.map(|(id, _)| id), arena, SearchStats::from_enumerator(&enumerator))
}

/// The `k` lowest-scoring programs, sorted ascending, stable on ties.
#[must_use]
pub fn find_top_k(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
    k: usize,
) -> (Vec<ExprId>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let mut best: Vec<(ExprId, f64)> = Vec::new();
    let mut enumerator = Enumerator::new(grammar, max_height);
    enumerator.run(&mut arena, examples, |_e, arena, id| {
        let curr = score(arena, id, examples.expected(), metric);
        if best.len() < k || best.last().is_some_and(|(_, s)| *s > curr) {
            best.push((id, curr));
            best.sort_by(|a, b| a.1.total_cmp(&b.1));
            best.truncate(k);
        }
        true
    });
    (best.into_iter().map(|(id, _)| id).collect(), arena, SearchStats::from_enumerator(&enumerator))
}

/// One winner per height bucket `0..=max_height`; a bucket with no candidate at all stays
/// `None`.
#[must_use]
pub fn find_best_by_height_per_height(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
) -> (Vec<Option<ExprId>>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let initial = examples.len() as f64 + 1.0;
    let mut best_programs: Vec<Option<ExprId>> = vec![None; max_height as usize + 1];
    let mut best_scores: Vec<f64> = vec![initial; max_height as usize + 1];
    let mut enumerator = Enumerator::new(grammar, max_height);
    enumerator.run(&mut arena, examples, |enumerator, arena, id| {
        let height = enumerator.current_height() as usize;
        let curr = score(arena, id, examples.expected(), metric);
        if curr < best_scores[height] {
            best_programs[height] = Some(id);
            best_scores[height] = curr;
        }
        true
    });
    (best_programs, arena, SearchStats::from_enumerator(&enumerator))
}

/// Minimizes `score(p) * penalty^height(p)`, favoring shorter programs over deeper ones with
/// similar raw accuracy. `penalty == 1.0` degenerates to plain [`find_best_by_height`].
#[must_use]
pub fn find_penalized_by_height(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
    penalty: f64,
) -> (Option<ExprId>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let initial = (examples.len() as f64 + 1.0) * penalty.powi(max_height as i32);
    let mut best: Option<(ExprId, f64)> = None;
    let mut best_score = initial;
    let mut enumerator = Enumerator::new(grammar, max_height);
    enumerator.run(&mut arena, examples, |enumerator, arena, id| {
        let raw = score(arena, id, examples.expected(), metric);
        let curr = raw * penalty.powi(enumerator.current_height() as i32);
        if curr < best_score {
            best = Some((id, curr));
            best_score = curr;
        }
        true
    });
    (best.map(|(id, _)| id), arena, SearchStats::from_enumerator(&enumerator))
}

/// As [`find_best_by_height`], but polls `cancel` between candidates and returns the
/// best-so-far instead of propagating the interruption.
#[must_use]
pub fn find_best_until_interrupt(
    grammar: &SearchSpace,
    examples: &ExampleSet,
    max_height: u32,
    metric: &dyn Metric,
    cancel: CancelToken,
) -> (Option<ExprId>, ExprArena, SearchStats) {
    let mut arena = ExprArena::new();
    let mut best: Option<(ExprId, f64)> = None;
    let initial = examples.len() as f64 + 1.0;
    let mut enumerator = Enumerator::new(grammar, max_height).with_cancel_token(cancel);
    enumerator.run(&mut arena, examples, |_e, arena, id| {
        let curr = score(arena, id, examples.expected(), metric);
        let best_so_far = best.as_ref().map_or(initial, |(_, s)| *s);
        if curr < best_so_far {
            best = Some((id, curr));
        }
        true
    });
    (best.map(|(id, _)| id), arena, SearchStats::from_enumerator(&enumerator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::DefaultMetric;
    use crate::operator::Operator;
    use crate::value::Value;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn grammar_and_examples() -> (SearchSpace, ExampleSet) {
        let mut grammar = SearchSpace::new();
        grammar.add_variables(["x", "y", "z"]);
        grammar.add_function(Operator::add());
        let mut examples = ExampleSet::new();
        for (x, y, z, out) in [(1_i64, 2_i64, 3_i64, 6_i64), (2, 4, 5, 11), (11, 22, 3, 36)] {
            let mut a = IndexMap::new();
            a.insert("x".to_owned(), Value::from(x));
            a.insert("y".to_owned(), Value::from(y));
            a.insert("z".to_owned(), Value::from(z));
            examples.push(a, Value::from(out));
        }
        (grammar, examples)
    }

    #[test]
    fn exact_finds_sum() {
        let (grammar, examples) = grammar_and_examples();
        let (found, arena, stats) = find_exact(&grammar, &examples, 3);
        let id = found.expect("x + y + z exists within height 3");
        assert_eq!(arena.get(id).values(), examples.expected());
        assert!(stats.programs_searched > 0);
    }

    #[test]
    fn top_k_is_sorted_ascending() {
        let (grammar, examples) = grammar_and_examples();
        let metric = DefaultMetric;
        let (ids, arena, _stats) = find_top_k(&grammar, &examples, 1, &metric, 3);
        assert_eq!(ids.len(), 3);
        let scores: Vec<f64> = ids.iter().map(|&id| score(&arena, id, examples.expected(), &metric)).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn penalty_one_matches_plain_best_by_height() {
        let (grammar, examples) = grammar_and_examples();
        let metric = DefaultMetric;
        let (penalized, arena_p, _) = find_penalized_by_height(&grammar, &examples, 3, &metric, 1.0);
        let (plain, arena_b, _) = find_best_by_height(&grammar, &examples, 3, &metric);
        let penalized_values = penalized.map(|id| arena_p.get(id).values().to_vec());
        let plain_values = plain.map(|id| arena_b.get(id).values().to_vec());
        assert_eq!(penalized_values, plain_values);
    }

    #[test]
    fn interrupt_before_any_candidate_returns_none() {
        let (grammar, examples) = grammar_and_examples();
        let metric = DefaultMetric;
        let cancel = CancelToken::new();
        cancel.cancel();
        let (found, _arena, _stats) = find_best_until_interrupt(&grammar, &examples, 3, &metric, cancel);
        assert!(found.is_none());
    }
}
