//! CSV readers for the example set and the CSV grammar variant.
//!
//! Examples file: header row of variable names followed by a trailing `output` column; each
//! subsequent row is a tuple of literals. Grammar file: row 1 literals, row 2 variables, row
//! `r >= 3` operator identifiers at arity `r - 2`.

use std::path::Path;

use crate::catalog;
use crate::example::{Assignment, ExampleSet};
use crate::error::{SynthError, SynthResult};
use crate::grammar::SearchSpace;
use crate::io::literal::parse_literal;

pub fn read_examples(path: impl AsRef<Path>) -> SynthResult<ExampleSet> {
    let mut reader = ::csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let Some((output_name, variable_names)) = headers.split_last() else {
        return Err(SynthError::InputParse("examples file has no columns".to_owned()));
    };
    if output_name != "output" {
        return Err(SynthError::InputParse(format!(
            "examples file's trailing column must be named 'output', found '{output_name}'"
        )));
    }
    let mut examples = ExampleSet::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != variable_names.len() + 1 {
            return Err(SynthError::InputParse(format!(
                "row has {} columns, expected {}",
                record.len(),
                variable_names.len() + 1
            )));
        }
        let mut assignment = Assignment::new();
        for (name, cell) in variable_names.iter().zip(record.iter()) {
            assignment.insert(name.clone(), parse_literal(cell)?);
        }
        let expected = parse_literal(&record[variable_names.len()])?;
        examples.push(assignment, expected);
    }
    Ok(examples)
}

pub fn read_grammar(path: impl AsRef<Path>) -> SynthResult<SearchSpace> {
    let mut reader = ::csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(path)?;
    let rows: Vec<::csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    let mut grammar = SearchSpace::new();

    if let Some(literal_row) = rows.first() {
        let mut literals = Vec::new();
        let mut bare_identifiers = Vec::new();
        for cell in literal_row {
            match parse_literal(cell) {
                Ok(value) => literals.push(value),
                // An identifier that isn't a valid literal (e.g. `x`) is treated as a variable,
                // the same rule the TXT grammar reader applies -- see DESIGN.md.
                Err(_) => bare_identifiers.push(cell.to_owned()),
            }
        }
        grammar.add_literals(literals);
        grammar.add_variables(bare_identifiers);
    }
    if let Some(variable_row) = rows.get(1) {
        grammar.add_variables(variable_row.iter().map(str::to_owned));
    }
    for (offset, row) in rows.iter().enumerate().skip(2) {
        let arity = offset - 1;
        for identifier in row {
            match catalog::lookup(identifier, arity) {
                Some(op) => grammar.add_function(op),
                None => {
                    return Err(SynthError::UnknownOperator { identifier: identifier.to_owned(), arity });
                }
            }
        }
    }
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn temp_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn reads_examples_with_variable_and_output_columns() {
        let file = temp_file("x,y,output\n1,2,3\n4,5,9\n");
        let examples = read_examples(file.path()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples.variable_domain(), vec!["x".to_owned(), "y".to_owned()]);
    }

    #[test]
    fn rejects_examples_without_output_column() {
        let file = temp_file("x,y\n1,2\n");
        assert!(read_examples(file.path()).is_err());
    }

    #[test]
    fn reads_grammar_rows_into_search_space() {
        let file = temp_file("0,1\nx,y\n+,-\n");
        let grammar = read_grammar(file.path()).unwrap();
        assert_eq!(grammar.max_arity(), 2);
        assert_eq!(grammar.terminals().len(), 4);
    }

    #[test]
    fn unknown_operator_identifier_is_an_error() {
        let file = temp_file("0\nx\nfrobnicate\n");
        let err = read_grammar(file.path()).unwrap_err();
        assert!(matches!(err, SynthError::UnknownOperator { .. }));
    }
}
