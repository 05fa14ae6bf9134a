use super::Metric;

const PENALTY: f64 = 0.25;
const SCALE: f64 = 1.0 / 36.0;

/// Reference ordering used to derive each keyboard character's physical row/column. See
/// <https://codegolf.stackexchange.com/a/233633>: a character's position in this 27-character
/// string, read through the formula in [`coordinates`], reconstructs its (column, row) on a
/// QWERTY keyboard without hand-writing a 46-entry coordinate table.
const REFERENCE_ORDER: &str = ".lo,kimjunhybgtvfrcdexswzaq";

/// Every lowercase character this metric knows a physical position for.
const KEYBOARD_CHARS: &str = "1234567890-=qwertyuiop[]\\asdfghjkl;'zxcvbnm,./";

/// Returns `(column, row)` for `c`, or `None` if `c` has no physical key in this layout.
fn coordinates(c: char) -> Option<(f64, f64)> {
    if !KEYBOARD_CHARS.contains(c) {
        return None;
    }
    let index = i64::try_from(REFERENCE_ORDER.find(c)?).ok()?;
    let column = (index - (-index).div_euclid(3)) as f64;
    let row = index.rem_euclid(3) as f64 * 4.0;
    Some((column, row))
}

fn letter_distance(a: char, b: char) -> f64 {
    match (coordinates(a), coordinates(b)) {
        (Some((ax, ay)), Some((bx, by))) => ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt() * SCALE,
        _ => 1.0 / SCALE,
    }
}

/// Scores two equal-length strings by the summed physical-key distance between mismatched
/// characters, capped at 1.0. Different lengths always score 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardMetric;

impl Metric for KeyboardMetric {
    fn str_distance(&self, actual: &str, expected: &str) -> f64 {
        let (a, b): (Vec<char>, Vec<char>) =
            (actual.to_lowercase().chars().collect(), expected.to_lowercase().chars().collect());
        if a.len() != b.len() {
            return 1.0;
        }
        let mut score = 0.0_f64;
        for (&ca, &cb) in a.iter().zip(&b) {
            if ca == cb {
                continue;
            }
            score += PENALTY * letter_distance(ca, cb);
            if score >= 1.0 {
                return 1.0;
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_zero() {
        let metric = KeyboardMetric;
        assert_eq!(metric.str_distance("abc", "abc"), 0.0);
    }

    #[test]
    fn adjacent_keys_score_less_than_distant_keys() {
        let metric = KeyboardMetric;
        let adjacent = metric.str_distance("a", "s");
        let distant = metric.str_distance("a", "p");
        assert!(adjacent < distant);
    }

    #[test]
    fn mismatched_length_is_one() {
        let metric = KeyboardMetric;
        assert_eq!(metric.str_distance("ab", "abc"), 1.0);
    }
}
