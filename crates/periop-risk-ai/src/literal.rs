//! Permissive parser for JSON-like literals.
//!
//! Accepts what models commonly emit instead of strict JSON: single-quoted
//! strings, `True`/`False`/`None`, trailing commas in objects and arrays, and
//! parenthesised tuples. The result is a plain [`serde_json::Value`].

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take},
    character::complete::{anychar, char, multispace0},
    combinator::{all_consuming, map, map_opt, opt, value},
    multi::separated_list0,
    number::complete::recognize_float,
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("literal parse error at byte {position}: {message}")]
pub struct LiteralError {
    pub position: usize,
    pub message: String,
}

pub type LiteralResult<T> = Result<T, LiteralError>;

const MAX_DEPTH: usize = 128;

type Res<'a, T> = IResult<&'a str, T>;

/// Parse a complete literal. Trailing non-whitespace is an error.
pub fn parse_literal(input: &str) -> LiteralResult<Value> {
    if nesting_depth(input) > MAX_DEPTH {
        return Err(LiteralError {
            position: 0,
            message: "nesting too deep".into(),
        });
    }
    match all_consuming(literal_value)(input) {
        Ok((_, v)) => Ok(v),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(LiteralError {
            position: input.len() - e.input.len(),
            message: format!("{:?}", e.code),
        }),
        Err(nom::Err::Incomplete(_)) => Err(LiteralError {
            position: input.len(),
            message: "incomplete input".into(),
        }),
    }
}

/// Upper bound on bracket nesting; brackets inside strings are counted too.
fn nesting_depth(input: &str) -> usize {
    let (mut depth, mut max) = (0usize, 0usize);
    for c in input.chars() {
        match c {
            '{' | '[' | '(' => {
                depth += 1;
                max = max.max(depth);
            }
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> Res<'a, O>
where
    F: FnMut(&'a str) -> Res<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn literal_value(input: &str) -> Res<Value> {
    ws(alt((
        map(object, Value::Object),
        map(bracket_list, Value::Array),
        map(tuple_list, Value::Array),
        map(quoted, Value::String),
        number,
        keyword,
    )))(input)
}

fn object(input: &str) -> Res<Map<String, Value>> {
    map(
        delimited(
            char('{'),
            terminated(
                separated_list0(
                    ws(char(',')),
                    separated_pair(ws(key), char(':'), literal_value),
                ),
                opt(ws(char(','))),
            ),
            ws(char('}')),
        ),
        |pairs| pairs.into_iter().collect(),
    )(input)
}

/// Quoted keys as-is; numbers and keywords stringified.
fn key(input: &str) -> Res<String> {
    alt((
        quoted,
        map(number, |v| v.to_string()),
        map(keyword, |v| v.to_string()),
    ))(input)
}

fn bracket_list(input: &str) -> Res<Vec<Value>> {
    sequence(input, '[', ']')
}

fn tuple_list(input: &str) -> Res<Vec<Value>> {
    sequence(input, '(', ')')
}

fn sequence(input: &str, open: char, close: char) -> Res<Vec<Value>> {
    delimited(
        char(open),
        terminated(
            separated_list0(ws(char(',')), literal_value),
            opt(ws(char(','))),
        ),
        ws(char(close)),
    )(input)
}

fn quoted(input: &str) -> Res<String> {
    alt((double_quoted, single_quoted))(input)
}

fn double_quoted(input: &str) -> Res<String> {
    quoted_body(input, '"', "\"\\")
}

fn single_quoted(input: &str) -> Res<String> {
    quoted_body(input, '\'', "'\\")
}

fn quoted_body<'a>(input: &'a str, quote: char, stop: &'static str) -> Res<'a, String> {
    delimited(
        char(quote),
        map(
            opt(escaped_transform(is_not(stop), '\\', escape)),
            Option::unwrap_or_default,
        ),
        char(quote),
    )(input)
}

fn escape(input: &str) -> Res<char> {
    alt((
        value('\n', char('n')),
        value('\t', char('t')),
        value('\r', char('r')),
        value('\u{8}', char('b')),
        value('\u{c}', char('f')),
        value('\0', char('0')),
        map_opt(preceded(char('u'), take(4usize)), |hex: &str| {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        }),
        anychar,
    ))(input)
}

fn number(input: &str) -> Res<Value> {
    map_opt(recognize_float, |text: &str| {
        text.parse::<i64>().ok().map(Value::from).or_else(|| {
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        })
    })(input)
}

fn keyword(input: &str) -> Res<Value> {
    alt((
        value(Value::Bool(true), alt((tag("True"), tag("true")))),
        value(Value::Bool(false), alt((tag("False"), tag("false")))),
        value(Value::Null, alt((tag("None"), tag("null")))),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json_is_accepted() {
        let v = parse_literal(r#"{"a": [1, 2.5, "x"], "b": null, "c": true}"#).unwrap();
        assert_eq!(v, json!({"a": [1, 2.5, "x"], "b": null, "c": true}));
    }

    #[test]
    fn test_single_quotes_and_capitalised_keywords() {
        let v = parse_literal("{'summary': 'ok', 'flags': [True, False, None],}").unwrap();
        assert_eq!(v, json!({"summary": "ok", "flags": [true, false, null]}));
    }

    #[test]
    fn test_trailing_commas_and_tuples() {
        let v = parse_literal("{'a': (1, 2,), 'b': ['x',], 'c': [ ], 'd': ''}").unwrap();
        assert_eq!(v, json!({"a": [1, 2], "b": ["x"], "c": [], "d": ""}));
    }

    #[test]
    fn test_escapes_and_mixed_quotes() {
        let v = parse_literal(r#"{'q': "it's", 'n': 'a\nb', 'u': 'ç', 's': 'don\'t'}"#).unwrap();
        assert_eq!(v["q"], "it's");
        assert_eq!(v["n"], "a\nb");
        assert_eq!(v["u"], "ç");
        assert_eq!(v["s"], "don't");
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let v = parse_literal("{1: 'one', True: 'yes'}").unwrap();
        assert_eq!(v, json!({"1": "one", "true": "yes"}));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_literal("I cannot help with that.").is_err());
        assert!(parse_literal("{'a': 1").is_err());
        assert!(parse_literal("{'a' 1}").is_err());
        assert!(parse_literal("{'a': 1} extra").is_err());
        assert!(parse_literal("").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = "[".repeat(500) + &"]".repeat(500);
        let err = parse_literal(&deep).unwrap_err();
        assert!(err.message.contains("deep"));
        assert!(parse_literal(&("[".repeat(20) + &"]".repeat(20))).is_ok());
    }
}
