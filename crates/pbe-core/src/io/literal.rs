//! Parses the small literal syntax examples and grammar files embed: integers, floats,
//! single- or double-quoted strings, booleans, and bracketed lists thereof (nesting
//! permitted). Stands in for the reference reader's `eval(text)` call, restricted to the
//! literal subset of Python's grammar -- no arbitrary expressions are ever evaluated.

use crate::error::SynthError;
use crate::value::Value;

pub fn parse_literal(text: &str) -> Result<Value, SynthError> {
    let mut chars = text.trim().chars().peekable();
    let value = parse_value(&mut chars)?;
    skip_whitespace(&mut chars);
    if chars.next().is_some() {
        return Err(SynthError::InputParse(format!("trailing characters after literal '{text}'")));
    }
    Ok(value)
}

fn parse_value(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Value, SynthError> {
    skip_whitespace(chars);
    match chars.peek().copied() {
        Some('[') => parse_list(chars),
        Some('\'' | '"') => parse_string(chars),
        Some(c) if c == '-' || c.is_ascii_digit() => parse_number(chars),
        Some('T') if starts_with(chars, "True") => {
            advance_by(chars, 4);
            Ok(Value::Bool(true))
        }
        Some('F') if starts_with(chars, "False") => {
            advance_by(chars, 5);
            Ok(Value::Bool(false))
        }
        Some(other) => Err(SynthError::InputParse(format!("unexpected character '{other}' in literal"))),
        None => Err(SynthError::InputParse("empty literal".to_owned())),
    }
}

fn parse_list(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Value, SynthError> {
    chars.next();
    let mut items = Vec::new();
    skip_whitespace(chars);
    if chars.peek() == Some(&']') {
        chars.next();
        return Ok(Value::List(items));
    }
    loop {
        items.push(parse_value(chars)?);
        skip_whitespace(chars);
        match chars.next() {
            Some(',') => continue,
            Some(']') => break,
            other => return Err(SynthError::InputParse(format!("expected ',' or ']', found {other:?}"))),
        }
    }
    Ok(Value::List(items))
}

fn parse_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Value, SynthError> {
    let quote = chars.next().expect("caller checked peek");
    let mut out = String::new();
    loop {
        match chars.next() {
            Some(c) if c == quote => break,
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => return Err(SynthError::InputParse("unterminated escape in string literal".to_owned())),
            },
            Some(c) => out.push(c),
            None => return Err(SynthError::InputParse("unterminated string literal".to_owned())),
        }
    }
    Ok(Value::Str(out))
}

fn parse_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Value, SynthError> {
    let mut raw = String::new();
    if chars.peek() == Some(&'-') {
        raw.push(chars.next().unwrap());
    }
    let mut is_float = false;
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            raw.push(c);
            chars.next();
        } else if c == '.' && !is_float {
            is_float = true;
            raw.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if is_float {
        raw.parse::<f64>().map(Value::Float).map_err(|e| SynthError::InputParse(e.to_string()))
    } else {
        match raw.parse::<i64>() {
            Ok(v) => Ok(Value::from(v)),
            Err(_) => raw
                .parse::<num_bigint::BigInt>()
                .map(Value::from)
                .map_err(|e| SynthError::InputParse(e.to_string())),
        }
    }
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn starts_with(chars: &std::iter::Peekable<std::str::Chars<'_>>, prefix: &str) -> bool {
    chars.clone().take(prefix.chars().count()).eq(prefix.chars())
}

fn advance_by(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, n: usize) {
    for _ in 0..n {
        chars.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer() {
        assert_eq!(parse_literal("42").unwrap(), Value::from(42_i64));
    }

    #[test]
    fn parses_negative_float() {
        assert_eq!(parse_literal("-3.5").unwrap(), Value::Float(-3.5));
    }

    #[test]
    fn parses_quoted_string() {
        assert_eq!(parse_literal("\"hi\"").unwrap(), Value::Str("hi".to_owned()));
        assert_eq!(parse_literal("'hi'").unwrap(), Value::Str("hi".to_owned()));
    }

    #[test]
    fn parses_nested_list() {
        let value = parse_literal("[1, [2, 3], 4]").unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::from(1_i64),
                Value::List(vec![Value::from(2_i64), Value::from(3_i64)]),
                Value::from(4_i64),
            ])
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse_literal("42 43").is_err());
    }
}
