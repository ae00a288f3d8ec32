use super::{ObjectSchema, Schema, Scope, SelectorOptions, SimpleSelector, ValueKind, ValueSchema};
use crate::transform::Transform;
use harvest_common::SchemaError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

impl Schema {
    /// Normalises a JSON schema document.
    pub fn from_json(value: &JsonValue) -> Result<Schema, SchemaError> {
        normalize(value, "$")
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Schema::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn normalize(value: &JsonValue, path: &str) -> Result<Schema, SchemaError> {
    match value {
        JsonValue::String(query) => Ok(Schema::value(query.as_str(), ValueKind::default())),
        JsonValue::Array(items) => Ok(Schema::value(
            SimpleSelector::All(strings(items, path)?),
            ValueKind::default(),
        )),
        JsonValue::Object(map) => normalize_map(map, path),
        other => Err(SchemaError::new(
            path,
            format!("expected a string, a list or an object, found {}", other),
        )),
    }
}

fn normalize_map(map: &Map<String, JsonValue>, path: &str) -> Result<Schema, SchemaError> {
    let options = selector_options(map, path)?;

    let selector = match map.get("selector") {
        Some(JsonValue::Object(fields)) => {
            let fields = fields
                .iter()
                .map(|(key, child)| Ok((key.clone(), normalize(child, &format!("{}.{}", path, key))?)))
                .collect::<Result<_, SchemaError>>()?;
            return Ok(Schema::Object(ObjectSchema {
                fields,
                options,
                obj_transforms: transform_list(map, "objTransforms", path)?,
                enabled: flag(map, "object", path)?.unwrap_or(true),
            }));
        }
        Some(JsonValue::String(query)) => SimpleSelector::One(query.clone()),
        Some(JsonValue::Array(items)) => SimpleSelector::All(strings(items, path)?),
        None | Some(JsonValue::Null) => SimpleSelector::One(String::new()),
        Some(other) => {
            return Err(SchemaError::new(
                format!("{}.selector", path),
                format!("expected a string, a list or an object, found {}", other),
            ));
        }
    };

    Ok(Schema::Value(ValueSchema {
        selector,
        kind: value_kind(map, path)?,
        options,
    }))
}

/// Type flags are checked in dispatch order: number, boolean, date, string.
fn value_kind(map: &Map<String, JsonValue>, path: &str) -> Result<ValueKind, SchemaError> {
    let kind = if flag(map, "number", path)? == Some(true) {
        ValueKind::Number(typed_options(map, path)?)
    } else if flag(map, "boolean", path)? == Some(true) {
        ValueKind::Boolean(typed_options(map, path)?)
    } else if flag(map, "date", path)? == Some(true) {
        ValueKind::Date(typed_options(map, path)?)
    } else {
        match flag(map, "string", path)? {
            Some(true) => ValueKind::String(typed_options(map, path)?),
            Some(false) => ValueKind::Unclaimed,
            None => ValueKind::Implicit(typed_options(map, path)?),
        }
    };
    Ok(kind)
}

fn typed_options<T: DeserializeOwned>(
    map: &Map<String, JsonValue>,
    path: &str,
) -> Result<T, SchemaError> {
    serde_json::from_value(JsonValue::Object(map.clone()))
        .map_err(|e| SchemaError::new(path, e.to_string()))
}

fn selector_options(
    map: &Map<String, JsonValue>,
    path: &str,
) -> Result<SelectorOptions, SchemaError> {
    let scope = match map.get("scope") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(query)) => Some(Scope::First(query.clone())),
        Some(JsonValue::Array(items)) => Some(Scope::All(strings(items, path)?)),
        Some(other) => {
            return Err(SchemaError::new(
                format!("{}.scope", path),
                format!("expected a string or a list, found {}", other),
            ));
        }
    };

    Ok(SelectorOptions {
        scope,
        trim: flag(map, "trim", path)?,
        transforms: transform_list(map, "transforms", path)?,
        arr_transforms: transform_list(map, "arrTransforms", path)?,
        flat: flag(map, "flat", path)?.unwrap_or(false),
    })
}

fn flag(map: &Map<String, JsonValue>, key: &str, path: &str) -> Result<Option<bool>, SchemaError> {
    match map.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(value)) => Ok(Some(*value)),
        Some(other) => Err(SchemaError::new(
            format!("{}.{}", path, key),
            format!("expected a boolean, found {}", other),
        )),
    }
}

fn transform_list(
    map: &Map<String, JsonValue>,
    key: &str,
    path: &str,
) -> Result<Vec<Transform>, SchemaError> {
    let field = format!("{}.{}", path, key);
    match map.get(key) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::String(spec)) => Ok(vec![Transform::named(spec.as_str())]),
        Some(JsonValue::Array(items)) => Ok(strings(items, &field)?
            .into_iter()
            .map(Transform::Named)
            .collect()),
        Some(other) => Err(SchemaError::new(
            field,
            format!("expected a transform name or a list of names, found {}", other),
        )),
    }
}

fn strings(items: &[JsonValue], path: &str) -> Result<Vec<String>, SchemaError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::String(s) => Ok(s.clone()),
            other => Err(SchemaError::new(
                format!("{}[{}]", path, i),
                format!("expected a string, found {}", other),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::RoundMode;
    use serde_json::json;

    fn load(value: JsonValue) -> Schema {
        Schema::from_json(&value).unwrap()
    }

    #[test]
    fn test_bare_string_and_list() {
        match load(json!("h1")) {
            Schema::Value(v) => {
                assert_eq!(v.selector, SimpleSelector::One("h1".into()));
                assert_eq!(v.kind, ValueKind::default());
            }
            other => panic!("unexpected {:?}", other),
        }
        match load(json!(["li"])) {
            Schema::Value(v) => assert!(v.selector.is_all()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_typed_selector() {
        let schema = load(json!({
            "selector": "span.price",
            "number": true,
            "int": true,
            "roundMode": "floor",
            "scope": [".item"],
            "trim": false,
            "transforms": "uppercase",
        }));
        let Schema::Value(value) = schema else {
            panic!("expected a value schema");
        };
        match &value.kind {
            ValueKind::Number(options) => {
                assert!(options.int);
                assert_eq!(options.round_mode, RoundMode::Floor);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(value.options.scope, Some(Scope::all(".item")));
        assert_eq!(value.options.trim, Some(false));
        assert_eq!(value.options.transforms.len(), 1);
    }

    #[test]
    fn test_flag_precedence() {
        let schema = load(json!({"selector": "a", "string": true, "date": true}));
        let Schema::Value(value) = schema else {
            panic!("expected a value schema");
        };
        assert!(matches!(value.kind, ValueKind::Date(_)));

        let schema = load(json!({"selector": "a", "string": false}));
        let Schema::Value(value) = schema else {
            panic!("expected a value schema");
        };
        assert_eq!(value.kind, ValueKind::Unclaimed);

        // another type flag still wins over the opt-out
        let schema = load(json!({"selector": "a", "string": false, "number": true}));
        let Schema::Value(value) = schema else {
            panic!("expected a value schema");
        };
        assert!(matches!(value.kind, ValueKind::Number(_)));
    }

    #[test]
    fn test_object_keeps_field_order() {
        let schema = load(json!({
            "selector": {"zeta": "h1", "alpha": {"selector": {"inner": "p"}}, "mid": ["li"]},
            "objTransforms": ["json"],
            "flat": true,
        }));
        let Schema::Object(object) = schema else {
            panic!("expected an object schema");
        };
        let keys: Vec<_> = object.fields.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert!(matches!(object.fields["alpha"], Schema::Object(_)));
        assert_eq!(object.obj_transforms.len(), 1);
        assert!(object.options.flat);
        assert!(object.enabled);
    }

    #[test]
    fn test_missing_selector_is_empty() {
        let Schema::Value(value) = load(json!({"trim": true})) else {
            panic!("expected a value schema");
        };
        assert_eq!(value.selector.active(), Some(""));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let err = Schema::from_json(&json!(42)).unwrap_err();
        assert_eq!(err.path, "$");

        let err = Schema::from_json(&json!({"selector": {"a": {"selector": [1]}}})).unwrap_err();
        assert_eq!(err.path, "$.a[0]");

        let err = Schema::from_json(&json!({"selector": "a", "transforms": [1]})).unwrap_err();
        assert_eq!(err.path, "$.transforms[0]");

        let err = Schema::from_json(&json!({"selector": "a", "number": "yes"})).unwrap_err();
        assert_eq!(err.path, "$.number");
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let schema: Schema = serde_yaml::from_str(
            "selector:\n  title: h1\n  links:\n    selector: ['a@href']\n    scope: nav\n",
        )
        .unwrap();
        let Schema::Object(object) = schema else {
            panic!("expected an object schema");
        };
        assert_eq!(object.fields.len(), 2);
        assert_eq!(object.fields["links"].options().scope, Some(Scope::from("nav")));
    }
}
