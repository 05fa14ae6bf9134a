//! Maps an operator identifier + arity, as it appears in a grammar file, to the catalog
//! constructor that builds it. This is the one place the CSV and TXT grammar readers share:
//! both need to turn a bare name like `"+"` or `"sorted"` into an [`Operator`] record.

use crate::operator::Operator;

/// Looks up a named catalog operator at a specific arity. Returns `None` for identifiers the
/// catalog doesn't recognize at that arity, which callers treat as "not a known operator" --
/// either an error ([`crate::io::csv`]) or a cue to fall back to a [`crate::template`] (the TXT
/// reader).
#[must_use]
pub fn lookup(identifier: &str, arity: usize) -> Option<Operator> {
    Some(match (identifier, arity) {
        ("+", 1) => Operator::unary_plus(),
        ("-", 1) => Operator::unary_minus(),
        ("not", 1) => Operator::logical_not(),
        ("~", 1) => Operator::bitwise_not(),
        ("+", 2) => Operator::add(),
        ("-", 2) => Operator::sub(),
        ("*", 2) => Operator::mul(),
        ("/", 2) => Operator::div(),
        ("//", 2) => Operator::floor_div(),
        ("%", 2) => Operator::modulo(),
        ("**", 2) => Operator::pow(),
        ("<<", 2) => Operator::left_shift(),
        (">>", 2) => Operator::right_shift(),
        ("|", 2) => Operator::bitwise_or(),
        ("^", 2) => Operator::bitwise_xor(),
        ("&", 2) => Operator::bitwise_and(),
        ("@", 2) => Operator::matmul(),
        ("subscript", 2) => Operator::subscript(),
        ("index", 2) => Operator::index_method(),
        ("count", 2) => Operator::count_method(),
        ("join", 2) => Operator::join_method(),
        ("slice", 4) => Operator::slice(),
        ("and", n) if (2..=5).contains(&n) => Operator::logical_and(n),
        ("or", n) if (2..=5).contains(&n) => Operator::logical_or(n),
        ("[]", n) if (1..=5).contains(&n) => Operator::list_literal(n),
        ("len", 1) => Operator::len_fn(),
        ("abs", 1) => Operator::abs_fn(),
        ("sorted", 1) => Operator::sorted_fn(),
        ("reversed", 1) => Operator::reversed_fn(),
        ("capitalize", 1) => Operator::capitalize_method(),
        ("casefold", 1) => Operator::casefold_method(),
        ("lower", 1) => Operator::lower_method(),
        ("upper", 1) => Operator::upper_method(),
        ("title", 1) => Operator::title_method(),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_binary_operator() {
        let op = lookup("+", 2).unwrap();
        assert_eq!(op.arity, 2);
    }

    #[test]
    fn rejects_unknown_identifier() {
        assert!(lookup("frobnicate", 1).is_none());
    }

    #[test]
    fn arity_mismatch_is_unknown() {
        assert!(lookup("+", 3).is_none());
    }
}
