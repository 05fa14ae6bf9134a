use super::{
    CalculationMetric, DefaultMetric, HammingMetric, HomophoneMetric, KeyboardMetric,
    LevenshteinMetric, Metric, NormalMetric, PermutationMetric,
};
use crate::error::SynthError;
use crate::value::{Integer, Value};

/// Dispatches each of `int`/`float`/`str`/`list` distance to an independently chosen
/// sub-metric, selected by name. `--metric-parameter` for `combined` is a
/// `int:float:str:list` quadruple, e.g. `calculation:normal:levenshtein:permutation`.
pub struct CombinedMetric {
    int_metric: Box<dyn Metric>,
    float_metric: Box<dyn Metric>,
    str_metric: Box<dyn Metric>,
    list_metric: Box<dyn Metric>,
}

impl CombinedMetric {
    pub fn parse(parameter: &str) -> Result<Self, SynthError> {
        let parts: Vec<&str> = if parameter.is_empty() {
            vec!["default", "default", "default", "default"]
        } else {
            parameter.split(':').collect()
        };
        let [int_name, float_name, str_name, list_name] = parts.as_slice() else {
            return Err(SynthError::InputParse(
                "combined metric parameter must be 'int:float:str:list'".to_owned(),
            ));
        };
        Ok(Self {
            int_metric: sub_metric(int_name)?,
            float_metric: sub_metric(float_name)?,
            str_metric: sub_metric(str_name)?,
            list_metric: sub_metric(list_name)?,
        })
    }
}

fn sub_metric(name: &str) -> Result<Box<dyn Metric>, SynthError> {
    Ok(match name {
        "default" | "" => Box::new(DefaultMetric),
        "normal" => Box::new(NormalMetric::new(1.0)),
        "calculation" => Box::new(CalculationMetric),
        "hamming" => Box::new(HammingMetric),
        "levenshtein" => Box::new(LevenshteinMetric::new(false)),
        "permutation" => Box::new(PermutationMetric),
        "keyboard" => Box::new(KeyboardMetric),
        "homophone" => Box::new(HomophoneMetric),
        other => return Err(SynthError::InputParse(format!("unknown combined sub-metric '{other}'"))),
    })
}

impl Metric for CombinedMetric {
    fn int_distance(&self, actual: &Integer, expected: &Integer) -> f64 {
        self.int_metric.int_distance(actual, expected)
    }

    fn float_distance(&self, actual: f64, expected: f64) -> f64 {
        self.float_metric.float_distance(actual, expected)
    }

    fn str_distance(&self, actual: &str, expected: &str) -> f64 {
        self.str_metric.str_distance(actual, expected)
    }

    fn list_distance(&self, actual: &[Value], expected: &[Value]) -> f64 {
        self.list_metric.list_distance(actual, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_each_variant_independently() {
        let metric = CombinedMetric::parse("calculation:normal:levenshtein:permutation").unwrap();
        assert_eq!(metric.int_distance(&Integer::I64(10), &Integer::I64(11)), 0.5);
        let a = vec![Value::from(1_i64), Value::from(2_i64)];
        let b = vec![Value::from(2_i64), Value::from(1_i64)];
        assert_eq!(metric.list_distance(&a, &b), 0.0);
    }

    #[test]
    fn rejects_malformed_parameter() {
        assert!(CombinedMetric::parse("only-one-part").is_err());
    }
}
