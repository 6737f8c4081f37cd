//! Python-style dictionary literals, `{'key': 'value', 'n': 3, 'ok': True}`.
//!
//! Keys always come out as strings. A quoted value stays a string, an unquoted one is
//! read as a scalar (`True`, `False`, `None`, plain numerals) and falls back to its
//! exact raw text, so `01234`, `+5` or `'x'y` come back as written. Nothing is
//! returned unless the whole input parses.

use collections::Dictionary;
use log::debug;
use serde_json::{Number, Value};

use crate::CodecError;

const QUOTES: [char; 2] = ['\'', '"'];

/// Parses a literal into string keys and untyped values.
///
/// # Errors
///
/// - [`CodecError::MissingBraces`] unless the trimmed input starts with `{` and ends with `}`
/// - [`CodecError::UnterminatedQuote`] for a quote without its closing partner
/// - [`CodecError::InvalidPair`] for a pair without exactly one top-level colon,
///   with an empty key, or with an empty value
pub fn from_literal(input: &str) -> Result<Dictionary<String, Value>, CodecError> {
    let trimmed = input.trim();
    let content = trimmed
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| CodecError::MissingBraces { input: input.into() })?
        .trim();

    let mut dict = Dictionary::new();
    if content.is_empty() {
        return Ok(dict);
    }

    let pairs = split_unquoted(content, ',')?;
    let last = pairs.len() - 1;
    for (i, pair) in pairs.into_iter().enumerate() {
        // a trailing comma is fine, an empty pair anywhere else is not
        if i == last && i > 0 && pair.trim().is_empty() {
            break;
        }
        let (key, value) = parse_pair(pair)?;
        dict.put(key, value);
    }

    debug!(target: "literal", "parsed {} entries", dict.size());
    Ok(dict)
}

/// Writes a literal that [`from_literal`] reads back into the same dictionary.
///
/// Strings, arrays and objects are single-quoted (the latter two as their JSON text),
/// other scalars are written bare.
pub fn to_literal<S>(dict: &Dictionary<String, Value, S>) -> String {
    let parts: Vec<String> = dict
        .iter()
        .map(|(k, v)| format!("{}: {}", quote(k), scalar_text(v)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

// [private]

fn parse_pair(pair: &str) -> Result<(String, Value), CodecError> {
    let invalid = || CodecError::InvalidPair { pair: pair.trim().into() };

    let halves = split_unquoted(pair, ':')?;
    let [key, value] = halves.as_slice() else {
        return Err(invalid());
    };
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(invalid());
    }

    let key = match unquote(key) {
        Some(inner) => unescape(inner),
        None => key.to_string(),
    };
    let value = match unquote(value) {
        Some(inner) => Value::String(unescape(inner)),
        None => bare_scalar(value),
    };
    Ok((key, value))
}

/// Splits on `delim` wherever it is not inside a quoted run.
/// A backslash inside quotes escapes the next character.
fn split_unquoted(s: &str, delim: char) -> Result<Vec<&str>, CodecError> {
    let mut parts = Vec::new();
    let mut open: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match open {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => open = None,
            Some(_) => {}
            None if QUOTES.contains(&c) => open = Some(c),
            None if c == delim => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }

    if open.is_some() {
        return Err(CodecError::UnterminatedQuote { input: s.into() });
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Content between one matching pair of surrounding quotes.
/// Mismatched or lone quotes, as in `'x'y`, give `None` and the text is kept as written.
fn unquote(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if s.len() < 2 || !QUOTES.contains(&first) || !s.ends_with(first) {
        return None;
    }
    Some(&s[1..s.len() - 1])
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

fn bare_scalar(s: &str) -> Value {
    match s {
        "True" | "true" => Value::Bool(true),
        "False" | "false" => Value::Bool(false),
        "None" | "null" => Value::Null,
        _ => match numeral(s) {
            Some(n) => Value::Number(n),
            None => Value::String(s.into()),
        },
    }
}

/// Reads `s` as a number only when it is a plain numeral: an optional `-`, no leading
/// zeros, an optional fraction and exponent. Integers that fit neither `i64` nor `u64`
/// and floats that overflow stay text, as does anything like `01234` or `+5`.
fn numeral(s: &str) -> Option<Number> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let int_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    let (int, rest) = unsigned.split_at(int_len);
    if int.is_empty() || (int.len() > 1 && int.starts_with('0')) {
        return None;
    }

    if rest.is_empty() {
        return match s.parse::<i64>() {
            Ok(n) => Some(n.into()),
            Err(_) => s.parse::<u64>().ok().map(Number::from),
        };
    }

    let rest = match rest.strip_prefix('.') {
        Some(frac) => {
            let frac_len = frac.bytes().take_while(u8::is_ascii_digit).count();
            if frac_len == 0 {
                return None;
            }
            &frac[frac_len..]
        }
        None => rest,
    };
    if !rest.is_empty() {
        let exp = rest.strip_prefix(['e', 'E'])?;
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp.is_empty() || !exp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' | '\'' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::Null => "None".into(),
        Value::Bool(true) => "True".into(),
        Value::Bool(false) => "False".into(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(_) | Value::Object(_) => quote(&v.to_string()),
    }
}
