use super::context::ResolutionContext;
use super::resolver::{ResolverSetup, SchemaResolver};
use crate::schema::Schema;
use crate::transform::{Pipeline, Registries};
use async_trait::async_trait;
use futures::future::try_join_all;
use harvest_common::{ConfigError, Map, Node, ResolveError, Value};
use std::sync::Arc;
use tracing::trace;

/// Resolves object schemas by dispatching every field back through the
/// extractor, so objects nest to any depth.
#[derive(Default)]
pub struct ObjectResolver {
    registries: Arc<Registries>,
}

impl ObjectResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl SchemaResolver for ObjectResolver {
    fn name(&self) -> &str {
        "object"
    }

    fn is_object(&self) -> bool {
        true
    }

    fn matches(&self, schema: &Schema) -> bool {
        matches!(schema, Schema::Object(object) if object.enabled)
    }

    fn configure(&mut self, setup: &ResolverSetup) -> Result<(), ConfigError> {
        if !setup.has_delegate {
            return Err(ConfigError::MissingDelegate);
        }
        self.registries = Arc::clone(&setup.registries);
        Ok(())
    }

    async fn resolve_node(
        &self,
        node: &Node,
        schema: &Schema,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Value, ResolveError> {
        let Schema::Object(object) = schema else {
            return Ok(Value::Null);
        };

        let fields: Vec<(&String, Schema)> = object
            .fields
            .iter()
            .map(|(key, field)| (key, field.inherit(&object.options)))
            .collect();

        let values = try_join_all(fields.iter().map(|(key, field)| async move {
            let field_ctx = ctx.field(key);
            ctx.engine().resolve(Some(node), field, &field_ctx).await
        }))
        .await?;

        let mut parsed = Map::new();
        let mut flattened = Map::new();
        for ((key, field), value) in fields.iter().zip(values) {
            match value {
                Value::Object(map) if field.options().flat => flattened.extend(map),
                value => {
                    parsed.insert((*key).clone(), value);
                }
            }
        }
        if !flattened.is_empty() {
            trace!(path = ctx.path(), keys = flattened.len(), "Merging flattened fields");
        }
        // flattened keys win on collision
        parsed.extend(flattened);

        let pipeline = Pipeline::build(&object.obj_transforms, &self.registries.obj_transforms);
        Ok(pipeline.apply(Value::Object(parsed))?)
    }
}
