//! Built-in transform library.
//!
//! Unless noted otherwise a transform maps over array elements and object
//! values, recursing into nested containers, and leaves values it does not
//! understand untouched.

use super::TransformRegistry;
use harvest_common::{Map, TransformError, Value};
use regex::{Regex, RegexBuilder};

pub fn register_all(registry: &mut TransformRegistry) {
    registry.register("replace", replace);
    registry.register("match", match_first);
    registry.register("matchAll", match_all);
    registry.register("split", split);
    registry.register("join", join);
    registry.register("def", def);
    registry.register("empty", empty);
    registry.register("toString", to_string);
    registry.register("str", str_each);
    registry.register("json", json);
    registry.register("del", del);
    registry.register("wrap", wrap);
    registry.register("flat", flat);
    registry.register("unique", unique);
    registry.register("lowercase", lowercase);
    registry.register("uppercase", uppercase);
    registry.register("title", title);
}

type Leaf<'a> = &'a dyn Fn(Value) -> Result<Value, TransformError>;

fn map_leaves(value: Value, f: Leaf<'_>) -> Result<Value, TransformError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| map_leaves(item, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, item)| Ok((key, map_leaves(item, f)?)))
            .collect::<Result<Map, _>>()
            .map(Value::Object),
        other => f(other),
    }
}

/// Applies `f` to each array element or object value, one level deep, or to
/// the value itself.
fn map_shallow(value: Value, f: impl Fn(Value) -> Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(&f).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, f(item)))
                .collect(),
        ),
        other => f(other),
    }
}

fn arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !v.is_null())
}

fn arg_string(args: &[Value], index: usize) -> Option<String> {
    arg(args, index).map(Value::to_display_string)
}

/// JS-style flags: `i`, `m` and `s` are honoured, anything else is ignored.
fn compile(name: &str, pattern: &str, flags: &str) -> Result<Regex, TransformError> {
    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|e| TransformError::new(name, e.to_string()))
}

fn required_pattern(name: &str, args: &[Value]) -> Result<String, TransformError> {
    arg_string(args, 0).ok_or_else(|| TransformError::new(name, "missing pattern argument"))
}

fn replace(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let pattern = required_pattern("replace", args)?;
    let re = compile("replace", &pattern, "g")?;
    let replacement = args.get(1).cloned().unwrap_or_else(|| Value::from(""));
    let target = args[0].clone();

    map_leaves(value, &|leaf| {
        Ok(match leaf {
            Value::String(s) => {
                Value::String(re.replace_all(&s, replacement.to_display_string().as_str()).into_owned())
            }
            other if other == target => replacement.clone(),
            other => other,
        })
    })
}

fn match_first(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let pattern = required_pattern("match", args)?;
    let flags = arg_string(args, 1).unwrap_or_else(|| "g".to_string());
    let re = compile("match", &pattern, &flags)?;
    let fallback = args.get(2).cloned().unwrap_or_default();

    map_leaves(value, &|leaf| {
        Ok(match leaf {
            Value::String(s) => re
                .find(&s)
                .map(|m| Value::from(m.as_str()))
                .unwrap_or_else(|| fallback.clone()),
            other => other,
        })
    })
}

fn match_all(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let pattern = required_pattern("matchAll", args)?;
    let flags = arg_string(args, 1).unwrap_or_else(|| "g".to_string());
    let re = compile("matchAll", &pattern, &flags)?;

    map_leaves(value, &|leaf| {
        Ok(match leaf {
            Value::String(s) => Value::Array(
                re.find_iter(&s)
                    .filter(|m| !m.as_str().is_empty())
                    .map(|m| Value::from(m.as_str()))
                    .collect(),
            ),
            other => other,
        })
    })
}

fn split(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let pattern = arg_string(args, 0).unwrap_or_else(|| ",".to_string());
    let flags = arg_string(args, 1).unwrap_or_default();
    let re = compile("split", &pattern, &flags)?;

    map_leaves(value, &|leaf| {
        Ok(match leaf {
            Value::String(s) => Value::Array(re.split(&s).map(Value::from).collect()),
            other => other,
        })
    })
}

/// Joins an array, or the values of an object. Not mapped.
fn join(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let separator = arg_string(args, 0).unwrap_or_else(|| ",".to_string());
    let parts: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_values().collect(),
        other => return Ok(other),
    };
    let joined = parts
        .iter()
        .map(|part| match part {
            Value::Null => String::new(),
            other => other.to_display_string(),
        })
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::String(joined))
}

fn should_default(value: &Value, mode: &str, extra: &[Value]) -> bool {
    if value.is_null() || extra.contains(value) {
        return true;
    }
    match mode {
        "blank" => value.as_str().is_some_and(|s| s.trim().is_empty()),
        "empty" => value.as_str().is_some_and(str::is_empty),
        "falsy" => !value.is_truthy(),
        _ => false,
    }
}

/// `def: <default> [null|blank|empty|falsy] [values...]`. A null input is
/// replaced outright; otherwise array elements and object values are
/// checked one by one.
fn def(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let fallback = args.first().cloned().unwrap_or_default();
    if value.is_null() {
        return Ok(fallback);
    }
    let mode = args.get(1).and_then(Value::as_str).unwrap_or("null");
    let extra = args.get(2..).unwrap_or(&[]);
    Ok(map_shallow(value, |input| {
        if should_default(&input, mode, extra) {
            fallback.clone()
        } else {
            input
        }
    }))
}

/// `empty: [mode] [values...]`, a `def` whose default is `""` and whose
/// mode defaults to `blank`.
fn empty(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let mut forwarded = vec![Value::from("")];
    forwarded.push(arg(args, 0).cloned().unwrap_or_else(|| Value::from("blank")));
    forwarded.extend(args.iter().skip(1).cloned());
    def(value, &forwarded)
}

/// Display string of the whole value. Not mapped.
fn to_string(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::String(value.to_display_string()))
}

fn str_each(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    map_leaves(value, &|leaf| Ok(Value::String(leaf.to_display_string())))
}

fn json(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::String(value.to_json_string()))
}

fn del(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let target = args.first().cloned().unwrap_or_default();
    Ok(match value {
        Value::Array(items) => Value::Array(items.into_iter().filter(|v| *v != target).collect()),
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| *v != target).collect()),
        other if other == target => Value::Null,
        other => other,
    })
}

fn wrap(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    Ok(match arg_string(args, 0) {
        Some(key) => {
            let mut map = Map::new();
            map.insert(key, value);
            Value::Object(map)
        }
        None => Value::Array(vec![value]),
    })
}

fn flatten_into(items: Vec<Value>, depth: usize, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) if depth > 0 => flatten_into(inner, depth - 1, out),
            other => out.push(other),
        }
    }
}

fn flat(value: Value, args: &[Value]) -> Result<Value, TransformError> {
    let depth = match arg(args, 0) {
        Some(Value::Number(n)) if *n >= 0.0 => *n as usize,
        Some(Value::String(s)) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| TransformError::new("flat", format!("invalid depth '{}'", s)))?,
        Some(other) => {
            return Err(TransformError::new("flat", format!("invalid depth '{}'", other)));
        }
        None => 1,
    };
    Ok(match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            flatten_into(items, depth, &mut out);
            Value::Array(out)
        }
        other => other,
    })
}

fn unique(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    Ok(match value {
        Value::Array(items) => {
            let mut seen: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !seen.contains(&item) {
                    seen.push(item);
                }
            }
            Value::Array(seen)
        }
        other => other,
    })
}

fn map_strings(value: Value, f: fn(&str) -> String) -> Result<Value, TransformError> {
    map_leaves(value, &|leaf| {
        Ok(match leaf {
            Value::String(s) => Value::String(f(&s)),
            other => other,
        })
    })
}

fn lowercase(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    map_strings(value, str::to_lowercase)
}

fn uppercase(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    map_strings(value, str::to_uppercase)
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn title(value: Value, _args: &[Value]) -> Result<Value, TransformError> {
    map_strings(value, title_case)
}
