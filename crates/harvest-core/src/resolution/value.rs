//! Resolvers for single values: extraction, trimming, transforms, coercion.

use super::context::ResolutionContext;
use super::resolver::{ResolverSetup, SchemaResolver};
use crate::coerce::{parse_boolean, parse_date, parse_number, parse_string};
use crate::schema::{Schema, ValueKind};
use crate::selector::parse_selector_string;
use crate::transform::{Pipeline, Registries, Transform};
use async_trait::async_trait;
use harvest_common::{ConfigError, Node, ResolveError, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// The coercion step of a value resolver, and the schemas it claims.
pub trait Coercion {
    const NAME: &'static str;

    fn claims(kind: &ValueKind) -> bool;

    fn coerce(raw: &Value, kind: &ValueKind) -> Result<Value, ResolveError>;
}

pub struct StringCoercion;
pub struct NumberCoercion;
pub struct BooleanCoercion;
pub struct DateCoercion;
/// Claims untyped selectors as well as explicit strings.
pub struct DefaultCoercion;

impl Coercion for StringCoercion {
    const NAME: &'static str = "string";

    fn claims(kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::String(_))
    }

    fn coerce(raw: &Value, kind: &ValueKind) -> Result<Value, ResolveError> {
        DefaultCoercion::coerce(raw, kind)
    }
}

impl Coercion for DefaultCoercion {
    const NAME: &'static str = "default";

    fn claims(kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::String(_) | ValueKind::Implicit(_))
    }

    fn coerce(raw: &Value, kind: &ValueKind) -> Result<Value, ResolveError> {
        match kind {
            ValueKind::String(options) | ValueKind::Implicit(options) => {
                parse_string(raw, options)
            }
            _ => Ok(raw.clone()),
        }
    }
}

impl Coercion for NumberCoercion {
    const NAME: &'static str = "number";

    fn claims(kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::Number(_))
    }

    fn coerce(raw: &Value, kind: &ValueKind) -> Result<Value, ResolveError> {
        match kind {
            ValueKind::Number(options) => Ok(parse_number(raw, options)),
            _ => Ok(raw.clone()),
        }
    }
}

impl Coercion for BooleanCoercion {
    const NAME: &'static str = "boolean";

    fn claims(kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::Boolean(_))
    }

    fn coerce(raw: &Value, kind: &ValueKind) -> Result<Value, ResolveError> {
        match kind {
            ValueKind::Boolean(options) => Ok(parse_boolean(raw, options)),
            _ => Ok(raw.clone()),
        }
    }
}

impl Coercion for DateCoercion {
    const NAME: &'static str = "date";

    fn claims(kind: &ValueKind) -> bool {
        matches!(kind, ValueKind::Date(_))
    }

    fn coerce(raw: &Value, kind: &ValueKind) -> Result<Value, ResolveError> {
        match kind {
            ValueKind::Date(options) => Ok(parse_date(raw, options)),
            _ => Ok(raw.clone()),
        }
    }
}

/// Extracts a value from the selector's match (or every match, for list
/// selectors) and runs it through trim, transforms and coercion `C`.
pub struct ValueResolver<C> {
    registries: Arc<Registries>,
    _coercion: PhantomData<fn() -> C>,
}

pub type StringResolver = ValueResolver<StringCoercion>;
pub type NumberResolver = ValueResolver<NumberCoercion>;
pub type BooleanResolver = ValueResolver<BooleanCoercion>;
pub type DateResolver = ValueResolver<DateCoercion>;
pub type DefaultResolver = ValueResolver<DefaultCoercion>;

impl<C> ValueResolver<C> {
    pub fn new() -> Self {
        Self {
            registries: Arc::new(Registries::default()),
            _coercion: PhantomData,
        }
    }
}

impl<C> Default for ValueResolver<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl<C: Coercion> SchemaResolver for ValueResolver<C> {
    fn name(&self) -> &str {
        C::NAME
    }

    fn matches(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Value(value) if C::claims(&value.kind))
    }

    fn configure(&mut self, setup: &ResolverSetup) -> Result<(), ConfigError> {
        self.registries = Arc::clone(&setup.registries);
        Ok(())
    }

    async fn resolve_node(
        &self,
        node: &Node,
        schema: &Schema,
        _ctx: &ResolutionContext<'_>,
    ) -> Result<Value, ResolveError> {
        let Schema::Value(schema) = schema else {
            return Ok(Value::Null);
        };

        let raw = schema
            .selector
            .active()
            .filter(|raw| !raw.is_empty())
            .ok_or(ResolveError::EmptySelector)?;
        let parsed = parse_selector_string(raw);
        let query = parsed.query().ok_or(ResolveError::EmptySelector)?;

        let transforms: Vec<Transform> = parsed
            .transforms
            .iter()
            .map(|spec| Transform::named(spec.as_str()))
            .chain(schema.options.transforms.iter().cloned())
            .collect();
        let pipeline = Pipeline::build(&transforms, &self.registries.transforms);
        let trim = schema.options.trim != Some(false);
        let attribute = parsed.attribute.as_deref();

        let finish = |found: Option<&Node>| -> Result<Value, ResolveError> {
            let mut value = extract(found, attribute);
            if trim && let Value::String(text) = &value {
                value = Value::String(text.trim().to_string());
            }
            let value = pipeline.apply(value)?;
            C::coerce(&value, &schema.kind)
        };

        if schema.selector.is_all() {
            let values = node
                .find_all(query)?
                .iter()
                .map(|found| finish(Some(found)))
                .collect::<Result<Vec<_>, _>>()?;
            let arr_pipeline =
                Pipeline::build(&schema.options.arr_transforms, &self.registries.arr_transforms);
            Ok(arr_pipeline.apply(Value::Array(values))?)
        } else {
            let found = node.find_first(query)?;
            finish(found.as_ref())
        }
    }
}

/// Reads `attribute` from the node: text by default, `html`/`innerHTML`,
/// `outerHTML`, or a named attribute.
fn extract(node: Option<&Node>, attribute: Option<&str>) -> Value {
    let Some(node) = node else {
        return Value::Null;
    };
    match attribute {
        None | Some("text") => Value::String(node.text()),
        Some("html") | Some("innerHTML") => Value::String(node.inner_html()),
        Some("outerHTML") => Value::String(node.outer_html()),
        Some(name) => node.attribute(name).map(Value::String).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build::{number, text};

    #[test]
    fn test_claims() {
        let implicit = text("h1");
        let numeric = number("h1");
        assert!(DefaultResolver::new().matches(&implicit));
        assert!(!StringResolver::new().matches(&implicit));
        assert!(NumberResolver::new().matches(&numeric));
        assert!(!DefaultResolver::new().matches(&numeric));
        assert!(!BooleanResolver::new().matches(&numeric));
    }

    #[test]
    fn test_string_opt_out_is_not_claimed() {
        let opted_out = Schema::value("h1", ValueKind::Unclaimed);
        assert!(!DefaultResolver::new().matches(&opted_out));
        assert!(!StringResolver::new().matches(&opted_out));
        assert!(!NumberResolver::new().matches(&opted_out));
    }

    #[test]
    fn test_object_schemas_are_not_claimed() {
        let object = Schema::object([("a", "h1")]);
        assert!(!DefaultResolver::new().matches(&object));
        assert!(!DateResolver::new().matches(&object));
    }
}
