//! The TXT grammar variant: one `EXP ::= <expr>` per line.
//!
//! `<expr>` is either a literal, a bare variable identifier, or a template containing
//! placeholders `EXP1..EXPk`. Arity is the highest `k` referenced in the template (default 1
//! for a line with no placeholder at all, e.g. a literal or variable line contributes a
//! terminal, arity 0). A template that renders exactly like a catalog entry registers as that
//! operator; anything else becomes a [`crate::operator::Operator::generic`] built from the
//! compiled [`crate::template::Template`].

use std::path::Path;

use crate::catalog;
use crate::error::{SynthError, SynthResult};
use crate::grammar::SearchSpace;
use crate::io::literal::parse_literal;
use crate::operator::Operator;
use crate::template::Template;

const CATALOG_TEMPLATES: &[(&str, &str)] = &[
    ("+", "EXP1 + EXP2"),
    ("-", "EXP1 - EXP2"),
    ("*", "EXP1 * EXP2"),
    ("/", "EXP1 / EXP2"),
    ("//", "EXP1 // EXP2"),
    ("%", "EXP1 % EXP2"),
    ("**", "EXP1 ** EXP2"),
    ("len", "len(EXP1)"),
    ("abs", "abs(EXP1)"),
    ("sorted", "sorted(EXP1)"),
];

pub fn read_grammar(path: impl AsRef<Path>) -> SynthResult<SearchSpace> {
    let text = std::fs::read_to_string(path)?;
    let mut grammar = SearchSpace::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((lhs, rhs)) = line.split_once("::=") else {
            return Err(SynthError::InputParse(format!("line {}: expected 'EXP ::= <expr>'", line_no + 1)));
        };
        if lhs.trim() != "EXP" {
            return Err(SynthError::InputParse(format!("line {}: left-hand side must be 'EXP'", line_no + 1)));
        }
        register_rule(&mut grammar, rhs.trim())?;
    }
    Ok(grammar)
}

fn register_rule(grammar: &mut SearchSpace, rhs: &str) -> SynthResult<()> {
    if !rhs.contains("EXP") {
        // Resolves the reader's open question: a bare right-hand side is a literal if it
        // parses as one, otherwise a variable identifier.
        return match parse_literal(rhs) {
            Ok(value) => {
                grammar.add_literals([value]);
                Ok(())
            }
            Err(_) => {
                grammar.add_variables([rhs.to_owned()]);
                Ok(())
            }
        };
    }

    let template = Template::parse(rhs)?;
    let arity = template.highest_placeholder();
    if let Some((identifier, _)) =
        CATALOG_TEMPLATES.iter().find(|(_, pattern)| same_template_shape(pattern, rhs))
    {
        if let Some(op) = catalog::lookup(identifier, arity) {
            grammar.add_function(op);
            return Ok(());
        }
    }
    let source = rhs.to_owned();
    let eval_template = template.clone();
    let render_template = template;
    let op = Operator::generic(
        source,
        arity,
        move |children, assignment| eval_template.eval(children, assignment),
        move |children| render_template.render(children),
    );
    grammar.add_function(op);
    Ok(())
}

/// Two templates have the same "shape" if they're equal once internal whitespace is collapsed,
/// so `"EXP1+EXP2"` and `"EXP1 + EXP2"` both register as the catalog's `+`.
fn same_template_shape(a: &str, b: &str) -> bool {
    let collapse = |s: &str| s.split_whitespace().collect::<String>();
    collapse(a) == collapse(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn literal_line_registers_as_literal() {
        let file = temp_file("EXP ::= 0\n");
        let grammar = read_grammar(file.path()).unwrap();
        assert_eq!(grammar.terminals().len(), 1);
    }

    #[test]
    fn bare_identifier_registers_as_variable() {
        let file = temp_file("EXP ::= x\n");
        let grammar = read_grammar(file.path()).unwrap();
        assert_eq!(grammar.terminals()[0].identifier, "x");
    }

    #[test]
    fn catalog_shaped_template_becomes_named_operator() {
        let file = temp_file("EXP ::= EXP1 + EXP2\n");
        let grammar = read_grammar(file.path()).unwrap();
        let (_, ops) = grammar.functions().next().unwrap();
        assert_eq!(ops[0].identifier, "+");
    }

    #[test]
    fn unrecognized_template_becomes_generic() {
        let file = temp_file("EXP ::= EXP1[EXP2]\n");
        let grammar = read_grammar(file.path()).unwrap();
        let (arity, ops) = grammar.functions().next().unwrap();
        assert_eq!(arity, 2);
        assert_eq!(ops[0].kind, crate::operator::OperatorKind::Generic);
    }

    #[test]
    fn malformed_line_is_rejected() {
        let file = temp_file("not a rule\n");
        assert!(read_grammar(file.path()).is_err());
    }
}
