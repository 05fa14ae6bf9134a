//! A small embedded expression evaluator for `Generic` operator templates.
//!
//! Grammar templates may introduce arbitrary expression text with placeholders
//! `EXP1..EXPk` standing in for the operator's children. Rather than shell out to the
//! catalog's full evaluator indirectly, this module parses the template once (at grammar-load
//! time) into a small AST and evaluates it by delegating every operator it recognizes to the
//! very [`crate::operator::Operator`] constructors the rest of the catalog uses -- so a
//! template's `+` behaves exactly like the catalog's `+`, with no duplicated semantics.

use crate::error::{EvalError, EvalResult, SynthError};
use crate::example::Assignment;
use crate::operator::Operator;
use crate::value::Value;

#[derive(Debug, Clone)]
enum Expr {
    Literal(Value),
    Placeholder(usize),
    Ident(String),
    Unary(char, Box<Expr>),
    Binary(String, Box<Expr>, Box<Expr>),
    BoolChain(String, Vec<Expr>),
    Call(String, Vec<Expr>),
    Method(Box<Expr>, String, Vec<Expr>),
    Subscript(Box<Expr>, Box<Expr>),
    Slice(Box<Expr>, Option<Box<Expr>>, Option<Box<Expr>>, Option<Box<Expr>>),
}

/// A parsed template, ready to be evaluated once per example or rendered once per printed
/// program.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    expr: Expr,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, SynthError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(SynthError::InputParse(format!("trailing tokens in template '{source}'")));
        }
        Ok(Self { source: source.to_owned(), expr })
    }

    #[must_use]
    pub fn highest_placeholder(&self) -> usize {
        fn walk(expr: &Expr, max: &mut usize) {
            match expr {
                Expr::Placeholder(n) => *max = (*max).max(*n),
                Expr::Unary(_, a) => walk(a, max),
                Expr::Binary(_, a, b) => {
                    walk(a, max);
                    walk(b, max);
                }
                Expr::BoolChain(_, items) | Expr::Call(_, items) => items.iter().for_each(|e| walk(e, max)),
                Expr::Method(base, _, args) => {
                    walk(base, max);
                    args.iter().for_each(|e| walk(e, max));
                }
                Expr::Subscript(base, index) => {
                    walk(base, max);
                    walk(index, max);
                }
                Expr::Slice(base, lo, hi, step) => {
                    walk(base, max);
                    for b in [lo, hi, step].into_iter().flatten() {
                        walk(b, max);
                    }
                }
                Expr::Literal(_) | Expr::Ident(_) => {}
            }
        }
        let mut max = 0;
        walk(&self.expr, &mut max);
        max
    }

    pub fn eval(&self, children: &[Value], assignment: &Assignment) -> EvalResult<Value> {
        eval_expr(&self.expr, children, assignment)
    }

    /// Substitutes each `EXPi` with the already-rendered source of child `i`, leaving the rest
    /// of the template text untouched.
    #[must_use]
    pub fn render(&self, children: &[String]) -> String {
        let mut out = String::new();
        let mut rest = self.source.as_str();
        while let Some(idx) = rest.find("EXP") {
            out.push_str(&rest[..idx]);
            let after = &rest[idx + 3..];
            let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
            if let Ok(n) = digits.parse::<usize>() {
                if n >= 1 && n <= children.len() {
                    out.push_str(&children[n - 1]);
                    rest = &after[digits.len()..];
                    continue;
                }
            }
            out.push_str("EXP");
            rest = after;
        }
        out.push_str(rest);
        out
    }
}

fn eval_expr(expr: &Expr, children: &[Value], assignment: &Assignment) -> EvalResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Placeholder(n) => children
            .get(n - 1)
            .cloned()
            .ok_or_else(|| EvalError::ValueError(format!("template references EXP{n} beyond arity"))),
        Expr::Ident(name) => {
            assignment.get(name).cloned().ok_or_else(|| EvalError::KeyError(name.clone()))
        }
        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, children, assignment)?;
            let op = match op {
                '-' => Operator::unary_minus(),
                '+' => Operator::unary_plus(),
                '~' => Operator::bitwise_not(),
                _ => unreachable!("tokenizer only emits known unary ops"),
            };
            op.eval(&[v], assignment)
        }
        Expr::Binary(sym, lhs, rhs) => {
            let a = eval_expr(lhs, children, assignment)?;
            let b = eval_expr(rhs, children, assignment)?;
            binary_operator(sym)?.eval(&[a, b], assignment)
        }
        Expr::BoolChain(sym, items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, children, assignment)?);
            }
            let op = if sym == "and" { Operator::logical_and(values.len()) } else { Operator::logical_or(values.len()) };
            op.eval(&values, assignment)
        }
        Expr::Call(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, children, assignment)?);
            }
            call_builtin(name, &values, assignment)
        }
        Expr::Method(base, name, args) => {
            let base_val = eval_expr(base, children, assignment)?;
            let mut values = vec![base_val];
            for arg in args {
                values.push(eval_expr(arg, children, assignment)?);
            }
            call_method(name, &values, assignment)
        }
        Expr::Subscript(base, index) => {
            let base_val = eval_expr(base, children, assignment)?;
            let index_val = eval_expr(index, children, assignment)?;
            Operator::subscript().eval(&[base_val, index_val], assignment)
        }
        Expr::Slice(base, lo, hi, step) => {
            let base_val = eval_expr(base, children, assignment)?;
            let bound = |b: &Option<Box<Expr>>| -> EvalResult<Value> {
                match b {
                    Some(e) => eval_expr(e, children, assignment),
                    None => Ok(Value::Bool(false)),
                }
            };
            let lo_val = bound(lo)?;
            let hi_val = bound(hi)?;
            let step_val = bound(step)?;
            Operator::slice().eval(&[base_val, lo_val, hi_val, step_val], assignment)
        }
    }
}

fn binary_operator(sym: &str) -> EvalResult<Operator> {
    Ok(match sym {
        "+" => Operator::add(),
        "-" => Operator::sub(),
        "*" => Operator::mul(),
        "/" => Operator::div(),
        "//" => Operator::floor_div(),
        "%" => Operator::modulo(),
        "**" => Operator::pow(),
        "<<" => Operator::left_shift(),
        ">>" => Operator::right_shift(),
        "|" => Operator::bitwise_or(),
        "^" => Operator::bitwise_xor(),
        "&" => Operator::bitwise_and(),
        "@" => Operator::matmul(),
        other => return Err(EvalError::ValueError(format!("unsupported template operator '{other}'"))),
    })
}

fn call_builtin(name: &str, args: &[Value], assignment: &Assignment) -> EvalResult<Value> {
    match (name, args) {
        ("len", [a]) => Operator::len_fn().eval(&[a.clone()], assignment),
        ("abs", [a]) => Operator::abs_fn().eval(&[a.clone()], assignment),
        ("sorted", [a]) => Operator::sorted_fn().eval(&[a.clone()], assignment),
        ("list", [a]) => Ok(a.clone()),
        ("reversed", [a]) => Operator::reversed_fn().eval(&[a.clone()], assignment),
        (other, _) => Err(EvalError::ValueError(format!("unsupported template function '{other}'"))),
    }
}

fn call_method(name: &str, args: &[Value], assignment: &Assignment) -> EvalResult<Value> {
    match name {
        "index" => Operator::index_method().eval(args, assignment),
        "count" => Operator::count_method().eval(args, assignment),
        "join" => Operator::join_method().eval(args, assignment),
        "capitalize" => Operator::capitalize_method().eval(args, assignment),
        "casefold" => Operator::casefold_method().eval(args, assignment),
        "lower" => Operator::lower_method().eval(args, assignment),
        "title" => Operator::title_method().eval(args, assignment),
        "upper" => Operator::upper_method().eval(args, assignment),
        other => Err(EvalError::ValueError(format!("unsupported template method '{other}'"))),
    }
}

// ---- Tokenizer & parser -------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Str(String),
    Ident(String),
    Placeholder(usize),
    Symbol(String),
}

fn tokenize(source: &str) -> Result<Vec<Token>, SynthError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() {
            let mut raw = String::new();
            while chars.peek().is_some_and(|c| c.is_ascii_digit() || *c == '.') {
                raw.push(chars.next().unwrap());
            }
            tokens.push(Token::Number(raw));
        } else if c == '\'' || c == '"' {
            let quote = chars.next().unwrap();
            let mut raw = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == quote => break,
                    Some(c) => raw.push(c),
                    None => return Err(SynthError::InputParse("unterminated string in template".to_owned())),
                }
            }
            tokens.push(Token::Str(raw));
        } else if c.is_alphabetic() || c == '_' {
            let mut raw = String::new();
            while chars.peek().is_some_and(|c| c.is_alphanumeric() || *c == '_') {
                raw.push(chars.next().unwrap());
            }
            if let Some(rest) = raw.strip_prefix("EXP") {
                if let Ok(n) = rest.parse::<usize>() {
                    tokens.push(Token::Placeholder(n));
                    continue;
                }
            }
            tokens.push(Token::Ident(raw));
        } else {
            let two: String = chars.clone().take(2).collect();
            let symbol = match two.as_str() {
                "**" | "//" | "<<" | ">>" => {
                    chars.next();
                    chars.next();
                    two
                }
                _ => {
                    let one = chars.next().unwrap();
                    one.to_string()
                }
            };
            tokens.push(Token::Symbol(symbol));
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn eat_symbol(&mut self, sym: &str) -> bool {
        if matches!(self.peek(), Some(Token::Symbol(s)) if s == sym) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if s == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, SynthError> {
        self.parse_bool_or()
    }

    fn parse_bool_or(&mut self) -> Result<Expr, SynthError> {
        let mut items = vec![self.parse_bool_and()?];
        while self.eat_ident("or") {
            items.push(self.parse_bool_and()?);
        }
        Ok(if items.len() == 1 { items.pop().unwrap() } else { Expr::BoolChain("or".to_owned(), items) })
    }

    fn parse_bool_and(&mut self) -> Result<Expr, SynthError> {
        let mut items = vec![self.parse_bitwise()?];
        while self.eat_ident("and") {
            items.push(self.parse_bitwise()?);
        }
        Ok(if items.len() == 1 { items.pop().unwrap() } else { Expr::BoolChain("and".to_owned(), items) })
    }

    fn parse_bitwise(&mut self) -> Result<Expr, SynthError> {
        let mut lhs = self.parse_shift()?;
        loop {
            let sym = match self.peek() {
                Some(Token::Symbol(s)) if s == "|" || s == "^" || s == "&" => s.clone(),
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_shift()?;
            lhs = Expr::Binary(sym, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_shift(&mut self) -> Result<Expr, SynthError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let sym = match self.peek() {
                Some(Token::Symbol(s)) if s == "<<" || s == ">>" => s.clone(),
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(sym, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, SynthError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let sym = match self.peek() {
                Some(Token::Symbol(s)) if s == "+" || s == "-" => s.clone(),
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(sym, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SynthError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let sym = match self.peek() {
                Some(Token::Symbol(s)) if s == "*" || s == "/" || s == "//" || s == "%" || s == "@" => s.clone(),
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(sym, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, SynthError> {
        if self.eat_symbol("-") {
            return Ok(Expr::Unary('-', Box::new(self.parse_unary()?)));
        }
        if self.eat_symbol("+") {
            return Ok(Expr::Unary('+', Box::new(self.parse_unary()?)));
        }
        if self.eat_symbol("~") {
            return Ok(Expr::Unary('~', Box::new(self.parse_unary()?)));
        }
        if self.eat_ident("not") {
            return Ok(Expr::Unary('!', Box::new(self.parse_unary()?)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, SynthError> {
        let base = self.parse_postfix()?;
        if self.eat_symbol("**") {
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary("**".to_owned(), Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, SynthError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_symbol("[") {
                expr = self.parse_subscript_or_slice(expr)?;
            } else if self.eat_symbol(".") {
                let name = match self.advance() {
                    Some(Token::Ident(s)) => s,
                    other => return Err(SynthError::InputParse(format!("expected method name, found {other:?}"))),
                };
                let args = if self.eat_symbol("(") { self.parse_args()? } else { Vec::new() };
                expr = Expr::Method(Box::new(expr), name, args);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_subscript_or_slice(&mut self, base: Expr) -> Result<Expr, SynthError> {
        let lo = if matches!(self.peek(), Some(Token::Symbol(s)) if s == ":") { None } else { Some(Box::new(self.parse_expr()?)) };
        if !self.eat_symbol(":") {
            if !self.eat_symbol("]") {
                return Err(SynthError::InputParse("expected ']' in subscript".to_owned()));
            }
            return Ok(Expr::Subscript(Box::new(base), lo.expect("subscript always has an index")));
        }
        let hi = if matches!(self.peek(), Some(Token::Symbol(s)) if s == ":" || s == "]") { None } else { Some(Box::new(self.parse_expr()?)) };
        let step = if self.eat_symbol(":") {
            if matches!(self.peek(), Some(Token::Symbol(s)) if s == "]") { None } else { Some(Box::new(self.parse_expr()?)) }
        } else {
            None
        };
        if !self.eat_symbol("]") {
            return Err(SynthError::InputParse("expected ']' in slice".to_owned()));
        }
        Ok(Expr::Slice(Box::new(base), lo, hi, step))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SynthError> {
        let mut args = Vec::new();
        if self.eat_symbol(")") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat_symbol(",") {
                continue;
            }
            if self.eat_symbol(")") {
                break;
            }
            return Err(SynthError::InputParse("expected ',' or ')' in argument list".to_owned()));
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, SynthError> {
        match self.advance() {
            Some(Token::Number(raw)) => {
                if raw.contains('.') {
                    raw.parse::<f64>().map(Value::Float).map(Expr::Literal).map_err(|e| SynthError::InputParse(e.to_string()))
                } else {
                    raw.parse::<i64>().map(Value::from).map(Expr::Literal).map_err(|e| SynthError::InputParse(e.to_string()))
                }
            }
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::Placeholder(n)) => Ok(Expr::Placeholder(n)),
            Some(Token::Ident(name)) if name == "True" => Ok(Expr::Literal(Value::Bool(true))),
            Some(Token::Ident(name)) if name == "False" => Ok(Expr::Literal(Value::Bool(false))),
            Some(Token::Ident(name)) => {
                if self.eat_symbol("(") {
                    let args = self.parse_args()?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token::Symbol(s)) if s == "[" => {
                let mut items = Vec::new();
                if !self.eat_symbol("]") {
                    loop {
                        items.push(self.parse_expr()?);
                        if self.eat_symbol(",") {
                            continue;
                        }
                        if self.eat_symbol("]") {
                            break;
                        }
                        return Err(SynthError::InputParse("expected ',' or ']' in list literal".to_owned()));
                    }
                }
                Ok(Expr::Call("list".to_owned(), items))
            }
            Some(Token::Symbol(s)) if s == "(" => {
                let inner = self.parse_expr()?;
                if !self.eat_symbol(")") {
                    return Err(SynthError::InputParse("expected ')'".to_owned()));
                }
                Ok(inner)
            }
            other => Err(SynthError::InputParse(format!("unexpected token {other:?} in template"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn evaluates_addition_of_placeholders() {
        let template = Template::parse("EXP1 + EXP2").unwrap();
        let env = IndexMap::new();
        let result = template.eval(&[Value::from(1_i64), Value::from(2_i64)], &env).unwrap();
        assert_eq!(result, Value::from(3_i64));
    }

    #[test]
    fn render_substitutes_child_source() {
        let template = Template::parse("EXP1 + EXP2").unwrap();
        assert_eq!(template.render(&["x".to_owned(), "y".to_owned()]), "x + y");
    }

    #[test]
    fn evaluates_len_call() {
        let template = Template::parse("len(EXP1)").unwrap();
        let env = IndexMap::new();
        let list = Value::List(vec![Value::from(1_i64), Value::from(2_i64)]);
        assert_eq!(template.eval(&[list], &env).unwrap(), Value::from(2_i64));
    }

    #[test]
    fn evaluates_slice_with_default_bounds() {
        let template = Template::parse("sorted(EXP1)[0::2]").unwrap();
        let env = IndexMap::new();
        let list = Value::List((0..5).rev().map(Value::from).collect());
        let result = template.eval(&[list], &env).unwrap();
        assert_eq!(result, Value::List(vec![Value::from(0_i64), Value::from(2_i64), Value::from(4_i64)]));
    }

    #[test]
    fn highest_placeholder_reports_arity() {
        let template = Template::parse("EXP1 + EXP3").unwrap();
        assert_eq!(template.highest_placeholder(), 3);
    }
}
