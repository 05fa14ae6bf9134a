use super::Metric;
use crate::value::Value;

/// Lists equal as multisets score 0; anything else scores 1. Scalars fall back to the shared
/// defaults ([`Metric`]'s equality/EPS rules).
#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationMetric;

impl Metric for PermutationMetric {
    fn list_distance(&self, actual: &[Value], expected: &[Value]) -> f64 {
        if actual.len() != expected.len() {
            return 1.0;
        }
        let mut sorted_actual = actual.to_vec();
        let mut sorted_expected = expected.to_vec();
        sorted_actual.sort_by(value_cmp);
        sorted_expected.sort_by(value_cmp);
        if sorted_actual == sorted_expected { 0.0 } else { 1.0 }
    }
}

/// An arbitrary but total order over [`Value`], needed only to bring equal multisets into the
/// same sorted order; not a meaningful magnitude comparison across variants.
fn value_cmp(a: &Value, b: &Value) -> std::cmp::Ordering {
    format!("{a:?}").cmp(&format!("{b:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reordered_list_is_equivalent() {
        let metric = PermutationMetric;
        let a = vec![Value::from(1_i64), Value::from(2_i64)];
        let b = vec![Value::from(2_i64), Value::from(1_i64)];
        assert_eq!(metric.list_distance(&a, &b), 0.0);
    }

    #[test]
    fn different_multiset_scores_one() {
        let metric = PermutationMetric;
        let a = vec![Value::from(1_i64), Value::from(2_i64)];
        let b = vec![Value::from(1_i64), Value::from(3_i64)];
        assert_eq!(metric.list_distance(&a, &b), 1.0);
    }
}
