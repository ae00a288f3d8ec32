//! Parses a transform spec: `name`, `name:arg`, `name: a1 "a 2" 'a3'`.

use harvest_common::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct TransformSpec {
    pub name: String,
    pub args: Vec<Value>,
}

pub fn parse_transform_spec(raw: &str) -> TransformSpec {
    match raw.split_once(':') {
        Some((name, rest)) => TransformSpec {
            name: name.trim().to_string(),
            args: tokenize(rest),
        },
        None => TransformSpec {
            name: raw.trim().to_string(),
            args: Vec::new(),
        },
    }
}

/// Whitespace separated tokens. Quoted tokens are always strings, bare
/// tokens that spell a number, `true`, `false` or `null` become that value.
fn tokenize(input: &str) -> Vec<Value> {
    let mut args = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        if first == '"' || first == '\'' {
            chars.next();
            let mut token = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    c if c == first => break,
                    c => token.push(c),
                }
            }
            args.push(Value::String(token));
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
            args.push(literal(token));
        }
    }
    args
}

fn literal(token: String) -> Value {
    match token.as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => match serde_json::from_str::<serde_json::Value>(&token) {
            Ok(serde_json::Value::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::String(token)),
            _ => Value::String(token),
        },
    }
}
