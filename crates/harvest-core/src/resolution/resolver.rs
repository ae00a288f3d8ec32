use super::context::ResolutionContext;
use crate::schema::{Schema, Scope};
use crate::selector::parse_selector_string;
use crate::transform::Registries;
use async_trait::async_trait;
use futures::future::try_join_all;
use harvest_common::{ConfigError, Node, ResolveError, Value};
use std::sync::Arc;
use tracing::trace;

/// Shared configuration handed to every resolver when an extractor is built.
#[derive(Debug, Clone)]
pub struct ResolverSetup {
    pub registries: Arc<Registries>,
    /// Whether at least one non-object resolver is registered.
    pub has_delegate: bool,
}

/// A dispatchable unit that claims and resolves one shape of schema.
///
/// Implementors provide single-node resolution; scope handling is shared and
/// lives in the provided [`SchemaResolver::resolve`].
#[async_trait(?Send)]
pub trait SchemaResolver {
    fn name(&self) -> &str;

    fn is_object(&self) -> bool {
        false
    }

    fn matches(&self, schema: &Schema) -> bool;

    fn configure(&mut self, _setup: &ResolverSetup) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Resolve `schema` against exactly `node`, ignoring its scope.
    async fn resolve_node(
        &self,
        node: &Node,
        schema: &Schema,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Value, ResolveError>;

    async fn resolve(
        &self,
        node: Option<&Node>,
        schema: &Schema,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Value, ResolveError> {
        resolve_scoped(self, node, schema, ctx).await
    }
}

/// Applies the schema's scope, then resolves per scoped node.
///
/// * no node: `null`
/// * no scope, or an empty scope string: the node itself
/// * a scope string: its first match, `null` when nothing matches
/// * a scope list: every match of its first query, collected in document
///   order with `null` results dropped; an empty list or empty first query
///   scopes to the distinct parents of the selector's matches
pub async fn resolve_scoped<R: SchemaResolver + ?Sized>(
    resolver: &R,
    node: Option<&Node>,
    schema: &Schema,
    ctx: &ResolutionContext<'_>,
) -> Result<Value, ResolveError> {
    // an empty selector is rejected even when the scope matches nothing
    if let Schema::Value(value) = schema
        && value
            .selector
            .active()
            .is_none_or(|raw| parse_selector_string(raw).query().is_none())
    {
        return Err(ResolveError::EmptySelector);
    }

    let Some(node) = node else {
        return Ok(Value::Null);
    };

    match &schema.options().scope {
        None => resolver.resolve_node(node, schema, ctx).await,
        Some(Scope::First(query)) if query.is_empty() => {
            resolver.resolve_node(node, schema, ctx).await
        }
        Some(Scope::First(query)) => match node.find_first(query)? {
            Some(scoped) => resolver.resolve_node(&scoped, schema, ctx).await,
            None => {
                trace!(path = ctx.path(), scope = %query, "Scope matched nothing");
                Ok(Value::Null)
            }
        },
        Some(Scope::All(queries)) => {
            let nodes = match queries.first().filter(|query| !query.is_empty()) {
                Some(query) => node.find_all(query)?,
                None => auto_scope(node, schema)?,
            };
            resolve_each(resolver, &nodes, schema, ctx).await
        }
    }
}

async fn resolve_each<R: SchemaResolver + ?Sized>(
    resolver: &R,
    nodes: &[Node],
    schema: &Schema,
    ctx: &ResolutionContext<'_>,
) -> Result<Value, ResolveError> {
    if nodes.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let results = try_join_all(
        nodes
            .iter()
            .map(|scoped| resolver.resolve_node(scoped, schema, ctx)),
    )
    .await?;
    Ok(Value::Array(
        results.into_iter().filter(|value| !value.is_null()).collect(),
    ))
}

/// Distinct parents of the selector's matches, in first-seen order.
fn auto_scope(node: &Node, schema: &Schema) -> Result<Vec<Node>, ResolveError> {
    let raw = match schema {
        Schema::Value(value) => value.selector.active().unwrap_or_default(),
        Schema::Object(_) => {
            return Err(ResolveError::InvalidAutoScope {
                found: "an object selector".to_string(),
            });
        }
    };
    if raw.is_empty() {
        return Err(ResolveError::EmptySelector);
    }
    let parsed = parse_selector_string(raw);
    let query = parsed.query().ok_or(ResolveError::EmptySelector)?;

    let mut parents: Vec<Node> = Vec::new();
    for matched in node.find_all(query)? {
        if let Some(parent) = matched.parent()
            && !parents.iter().any(|seen| seen.same_node(parent.as_ref()))
        {
            parents.push(parent);
        }
    }
    trace!(query, parents = parents.len(), "Auto scoped");
    Ok(parents)
}
