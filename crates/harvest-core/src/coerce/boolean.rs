use harvest_common::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanOptions {
    pub default: Option<bool>,
    #[serde(deserialize_with = "super::one_or_many")]
    pub truthy: Vec<String>,
    #[serde(deserialize_with = "super::one_or_many")]
    pub falsy: Vec<String>,
}

pub fn parse_boolean(raw: &Value, options: &BooleanOptions) -> Value {
    let fallback = || Value::from(options.default);
    match raw {
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(_) => Value::Bool(raw.is_truthy()),
        Value::String(s) => {
            let truthy = options.truthy.contains(s);
            let falsy = options.falsy.contains(s);
            match (options.truthy.is_empty(), options.falsy.is_empty()) {
                (true, true) => Value::Bool(!s.is_empty()),
                (true, false) => Value::Bool(!falsy),
                (false, true) => Value::Bool(truthy),
                (false, false) if truthy => Value::Bool(true),
                (false, false) if falsy => Value::Bool(false),
                (false, false) => fallback(),
            }
        }
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(truthy: &[&str], falsy: &[&str], default: Option<bool>) -> BooleanOptions {
        BooleanOptions {
            default,
            truthy: truthy.iter().map(|s| s.to_string()).collect(),
            falsy: falsy.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_without_lists() {
        let opts = options(&[], &[], None);
        assert_eq!(parse_boolean(&Value::from("x"), &opts), Value::Bool(true));
        assert_eq!(parse_boolean(&Value::from(""), &opts), Value::Bool(false));
        assert_eq!(parse_boolean(&Value::Number(2.0), &opts), Value::Bool(true));
        assert_eq!(parse_boolean(&Value::Number(0.0), &opts), Value::Bool(false));
        assert_eq!(parse_boolean(&Value::Bool(false), &opts), Value::Bool(false));
        assert_eq!(parse_boolean(&Value::Null, &opts), Value::Null);
    }

    #[test]
    fn test_single_list() {
        let truthy = options(&["true"], &[], None);
        assert_eq!(parse_boolean(&Value::from("true"), &truthy), Value::Bool(true));
        assert_eq!(parse_boolean(&Value::from("blah"), &truthy), Value::Bool(false));

        let falsy = options(&[], &["no"], None);
        assert_eq!(parse_boolean(&Value::from("no"), &falsy), Value::Bool(false));
        assert_eq!(parse_boolean(&Value::from("blah"), &falsy), Value::Bool(true));
    }

    #[test]
    fn test_both_lists_fall_back_to_default() {
        let opts = options(&["true"], &["false", "falsy"], Some(true));
        assert_eq!(parse_boolean(&Value::from("true"), &opts), Value::Bool(true));
        assert_eq!(parse_boolean(&Value::from("falsy"), &opts), Value::Bool(false));
        assert_eq!(parse_boolean(&Value::from("blah"), &opts), Value::Bool(true));
    }

    #[test]
    fn test_lists_accept_a_single_string() {
        let opts: BooleanOptions =
            serde_json::from_value(serde_json::json!({"truthy": "yes", "falsy": ["no"]})).unwrap();
        assert_eq!(opts.truthy, vec!["yes"]);
        assert_eq!(opts.falsy, vec!["no"]);
    }
}
