use harvest_common::{ResolveError, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StringOptions {
    pub default: Option<String>,
    /// Returned instead of an empty string.
    pub default_if_empty: Option<String>,
    /// Keep only the first match of this pattern.
    #[serde(rename = "match")]
    pub pattern: Option<String>,
    pub default_if_no_match: Option<String>,
}

pub fn parse_string(raw: &Value, options: &StringOptions) -> Result<Value, ResolveError> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) => raw.to_display_string(),
        _ => return Ok(Value::from(options.default.clone())),
    };

    if text.is_empty()
        && let Some(fallback) = options.default_if_empty.as_ref().filter(|s| !s.is_empty())
    {
        return Ok(Value::String(fallback.clone()));
    }

    let Some(pattern) = &options.pattern else {
        return Ok(Value::String(text));
    };
    let re = Regex::new(pattern).map_err(|e| ResolveError::InvalidPattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;
    Ok(match re.find(&text) {
        Some(m) => Value::from(m.as_str()),
        None => Value::from(options.default_if_no_match.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_and_scalars() {
        let options = StringOptions::default();
        assert_eq!(parse_string(&Value::from("abc"), &options).unwrap(), Value::from("abc"));
        assert_eq!(parse_string(&Value::Number(1.5), &options).unwrap(), Value::from("1.5"));
        assert_eq!(parse_string(&Value::Bool(true), &options).unwrap(), Value::from("true"));
        assert_eq!(parse_string(&Value::Null, &options).unwrap(), Value::Null);
    }

    #[test]
    fn test_defaults() {
        let options = StringOptions {
            default: Some("missing".into()),
            default_if_empty: Some("blank".into()),
            ..Default::default()
        };
        assert_eq!(parse_string(&Value::Null, &options).unwrap(), Value::from("missing"));
        assert_eq!(parse_string(&Value::from(""), &options).unwrap(), Value::from("blank"));
    }

    #[test]
    fn test_match() {
        let options = StringOptions {
            pattern: Some(r"\d+".into()),
            default_if_no_match: Some("none".into()),
            ..Default::default()
        };
        assert_eq!(parse_string(&Value::from("abc 123"), &options).unwrap(), Value::from("123"));
        assert_eq!(parse_string(&Value::from("abc"), &options).unwrap(), Value::from("none"));

        let strict = StringOptions {
            pattern: Some(r"\d+".into()),
            ..Default::default()
        };
        assert_eq!(parse_string(&Value::from("abc"), &strict).unwrap(), Value::Null);
    }

    #[test]
    fn test_invalid_pattern() {
        let options = StringOptions {
            pattern: Some("(".into()),
            ..Default::default()
        };
        let err = parse_string(&Value::from("x"), &options).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidPattern { .. }));
    }
}
