use super::Metric;
use crate::value::Integer;

const PENALTY_OFF_BY_ONE: f64 = 0.25;
const PENALTY_UNITS: f64 = 0.5;

/// Models a mental-arithmetic slip: scores two numbers by comparing their decimal digit
/// strings position by position. The units digit (rightmost) is cheapest to get wrong by one
/// (`PENALTY_UNITS`); any other digit off by one costs `PENALTY_OFF_BY_ONE`; any digit pair
/// differing by more than one, or the numbers having different signs, scores the maximum 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculationMetric;

impl Metric for CalculationMetric {
    fn int_distance(&self, actual: &Integer, expected: &Integer) -> f64 {
        digit_distance(&actual.to_big().to_string(), &expected.to_big().to_string())
    }

    fn float_distance(&self, actual: f64, expected: f64) -> f64 {
        let (actual_whole, actual_frac) = split_decimal(actual);
        let (expected_whole, expected_frac) = split_decimal(expected);
        if actual.is_sign_negative() != expected.is_sign_negative() {
            return 1.0;
        }
        let max_frac = actual_frac.len().max(expected_frac.len());
        let combined_actual =
            format!("{actual_whole}{actual_frac:0<width$}", width = max_frac);
        let combined_expected =
            format!("{expected_whole}{expected_frac:0<width$}", width = max_frac);
        digit_distance(&combined_actual, &combined_expected)
    }
}

/// Splits a float's absolute value into its whole-part and fractional-part digit strings.
fn split_decimal(value: f64) -> (String, String) {
    let text = format!("{:.6}", value.abs());
    let mut parts = text.splitn(2, '.');
    let whole = parts.next().unwrap_or("0").to_owned();
    let frac = parts.next().unwrap_or("0").trim_end_matches('0');
    let frac = if frac.is_empty() { "0".to_owned() } else { frac.to_owned() };
    (whole, frac)
}

fn digit_distance(actual: &str, expected: &str) -> f64 {
    let (actual, expected) = (strip_sign(actual), strip_sign(expected));
    if sign_of(actual.0) != sign_of(expected.0) {
        return 1.0;
    }
    let (actual_digits, expected_digits) = (actual.1, expected.1);
    let max_len = actual_digits.len().max(expected_digits.len());
    let actual_padded = pad_left(actual_digits, max_len);
    let expected_padded = pad_left(expected_digits, max_len);

    let mut score = 0.0_f64;
    let last = max_len - 1;
    if actual_padded[last] != expected_padded[last] {
        let diff = digit_value(actual_padded[last]).abs_diff(digit_value(expected_padded[last]));
        if diff == 1 {
            score += PENALTY_UNITS;
        } else {
            return 1.0;
        }
    }
    for i in 0..last {
        if actual_padded[i] != expected_padded[i] {
            let diff = digit_value(actual_padded[i]).abs_diff(digit_value(expected_padded[i]));
            if diff == 1 {
                score = (score + PENALTY_OFF_BY_ONE).min(1.0);
            } else {
                return 1.0;
            }
        }
    }
    score.min(1.0)
}

fn strip_sign(raw: &str) -> (bool, &str) {
    raw.strip_prefix('-').map_or((false, raw), |rest| (true, rest))
}

fn sign_of(negative: bool) -> bool {
    negative
}

fn pad_left(digits: &str, width: usize) -> Vec<u8> {
    let mut out = vec![b'0'; width - digits.len()];
    out.extend_from_slice(digits.as_bytes());
    out
}

fn digit_value(byte: u8) -> i64 {
    i64::from(byte - b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_zero() {
        let metric = CalculationMetric;
        assert_eq!(metric.int_distance(&Integer::I64(0), &Integer::I64(0)), 0.0);
    }

    #[test]
    fn units_off_by_one_is_half_penalty() {
        let metric = CalculationMetric;
        assert_eq!(metric.int_distance(&Integer::I64(10), &Integer::I64(11)), 0.5);
    }

    #[test]
    fn non_adjacent_digit_difference_is_one() {
        let metric = CalculationMetric;
        assert_eq!(metric.int_distance(&Integer::I64(0), &Integer::I64(5)), 1.0);
    }

    #[test]
    fn opposite_signs_is_one() {
        let metric = CalculationMetric;
        assert_eq!(metric.int_distance(&Integer::I64(-1), &Integer::I64(1)), 1.0);
    }
}
