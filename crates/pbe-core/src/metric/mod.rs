//! The distance metric family.
//!
//! Every metric implements the same four pointwise functions plus a dispatcher, [`Metric::distance`],
//! that routes on the runtime variant of its two arguments and falls back to 1.0 (maximal distance)
//! when the variants differ. Each concrete metric overrides only the pointwise functions where its
//! behavior differs from the shared baseline in this module's default trait methods -- the same
//! "override what's different, inherit the rest" shape the reference metric hierarchy uses, expressed
//! here as default trait methods instead of single inheritance.

mod calculation;
mod combined;
mod default;
mod homophone;
mod keyboard;
mod levenshtein;
mod normal;
mod permutation;
mod vector;

pub use calculation::CalculationMetric;
pub use combined::CombinedMetric;
pub use default::DefaultMetric;
pub use homophone::HomophoneMetric;
pub use keyboard::KeyboardMetric;
pub use levenshtein::LevenshteinMetric;
pub use normal::NormalMetric;
pub use permutation::PermutationMetric;
pub use vector::{HammingMetric, VectorFunction, VectorMetric};

use crate::value::{Integer, Value};

/// Shared baseline semantics every metric inherits unless it overrides a specific function.
pub trait Metric {
    fn int_distance(&self, actual: &Integer, expected: &Integer) -> f64 {
        if actual == expected { 0.0 } else { 1.0 }
    }

    fn float_distance(&self, actual: f64, expected: f64) -> f64 {
        const EPS: f64 = 1e-3;
        if (actual - expected).abs() <= EPS { 0.0 } else { 1.0 }
    }

    fn str_distance(&self, actual: &str, expected: &str) -> f64 {
        if actual == expected { 0.0 } else { 1.0 }
    }

    fn bool_distance(&self, actual: bool, expected: bool) -> f64 {
        if actual == expected { 0.0 } else { 1.0 }
    }

    /// Unequal lengths score 1.0; otherwise the capped sum of pointwise [`Metric::distance`]
    /// over the zipped elements. Most metrics keep this baseline; [`VectorMetric`] and
    /// [`PermutationMetric`] replace it with a length-aware or order-insensitive rule.
    fn list_distance(&self, actual: &[Value], expected: &[Value]) -> f64 {
        if actual.len() != expected.len() {
            return 1.0;
        }
        let total: f64 = actual.iter().zip(expected).map(|(a, b)| self.distance(a, b)).sum();
        total.min(1.0)
    }

    /// Routes on the runtime variant of `actual`/`expected`; a variant mismatch scores the
    /// maximal distance of 1.0.
    fn distance(&self, actual: &Value, expected: &Value) -> f64 {
        match (actual, expected) {
            (Value::Int(a), Value::Int(b)) => self.int_distance(a, b),
            (Value::Float(a), Value::Float(b)) => self.float_distance(*a, *b),
            (Value::Str(a), Value::Str(b)) => self.str_distance(a, b),
            (Value::List(a), Value::List(b)) => self.list_distance(a, b),
            (Value::Bool(a), Value::Bool(b)) => self.bool_distance(*a, *b),
            _ => 1.0,
        }
    }
}

/// Builds the configured metric from its CLI name and a free-form parameter string, the same
/// pairing the `--metric`/`--metric-parameter` flags carry.
pub fn from_name(name: &str, parameter: &str) -> Result<Box<dyn Metric>, crate::error::SynthError> {
    let metric: Box<dyn Metric> = match name {
        "default" | "" => Box::new(DefaultMetric),
        "normal" => Box::new(NormalMetric::new(parse_f64_or(parameter, 1.0))),
        "calculation" => Box::new(CalculationMetric),
        "vector" => Box::new(VectorMetric::new(VectorFunction::parse(parameter)?)),
        "hamming" => Box::new(HammingMetric),
        "levenshtein" => Box::new(LevenshteinMetric::new(parameter == "recursive")),
        "permutation" => Box::new(PermutationMetric),
        "keyboard" => Box::new(KeyboardMetric),
        "homophone" => Box::new(HomophoneMetric),
        "combined" => Box::new(CombinedMetric::parse(parameter)?),
        other => {
            return Err(crate::error::SynthError::InputParse(format!("unknown metric '{other}'")));
        }
    };
    Ok(metric)
}

fn parse_f64_or(raw: &str, default: f64) -> f64 {
    if raw.is_empty() {
        default
    } else {
        raw.parse().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_metric_name_is_rejected() {
        assert!(from_name("not-a-metric", "").is_err());
    }

    #[test]
    fn default_metric_is_reflexive() {
        let metric = DefaultMetric;
        assert_eq!(metric.distance(&Value::from(1_i64), &Value::from(1_i64)), 0.0);
    }

    #[test]
    fn mismatched_variants_score_one() {
        let metric = DefaultMetric;
        assert_eq!(metric.distance(&Value::from(1_i64), &Value::from(1.0_f64)), 1.0);
    }
}
