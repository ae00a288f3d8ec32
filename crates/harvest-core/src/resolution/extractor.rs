use super::context::ResolutionContext;
use super::resolver::{ResolverSetup, SchemaResolver};
use crate::schema::Schema;
use crate::transform::{Registries, TransformRegistry};
use harvest_common::{ConfigError, DocumentFactory, Node, ResolveError, TransformError, Value};
use std::sync::Arc;
use tracing::debug;

/// Dispatches schemas to the first resolver that claims them.
///
/// Resolvers are tried in registration order, so the order given to the
/// builder decides which resolver wins when several could apply.
pub struct Extractor {
    resolvers: Vec<Box<dyn SchemaResolver>>,
    registries: Arc<Registries>,
    factory: Box<dyn DocumentFactory>,
}

impl Extractor {
    pub fn builder(factory: impl DocumentFactory + 'static) -> ExtractorBuilder {
        ExtractorBuilder::new(Box::new(factory))
    }

    /// Loads `html` with the document factory and resolves `schema` against
    /// its root.
    pub async fn resolve_from_html(&self, html: &str, schema: &Schema) -> Result<Value, ResolveError> {
        let root = self.factory.load(html)?;
        self.resolve_from_node(&root, schema).await
    }

    pub async fn resolve_from_node(&self, node: &Node, schema: &Schema) -> Result<Value, ResolveError> {
        let ctx = ResolutionContext::new(self);
        self.resolve(Some(node), schema, &ctx).await
    }

    /// Dispatch one schema. Returns `null` when no resolver claims it.
    pub async fn resolve(
        &self,
        node: Option<&Node>,
        schema: &Schema,
        ctx: &ResolutionContext<'_>,
    ) -> Result<Value, ResolveError> {
        match self.resolvers.iter().find(|resolver| resolver.matches(schema)) {
            Some(resolver) => {
                debug!(resolver = resolver.name(), path = ctx.path(), "Resolving");
                resolver.resolve(node, schema, ctx).await
            }
            None => {
                debug!(path = ctx.path(), "No resolver matched schema");
                Ok(Value::Null)
            }
        }
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|resolver| resolver.name()).collect()
    }
}

pub struct ExtractorBuilder {
    factory: Box<dyn DocumentFactory>,
    resolvers: Vec<Box<dyn SchemaResolver>>,
    registries: Registries,
}

impl ExtractorBuilder {
    pub fn new(factory: Box<dyn DocumentFactory>) -> Self {
        Self {
            factory,
            resolvers: Vec::new(),
            registries: Registries::default(),
        }
    }

    pub fn resolver(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn boxed_resolver(mut self, resolver: Box<dyn SchemaResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Register `resolver` ahead of every resolver added so far, so it is
    /// consulted before preset resolvers.
    pub fn resolver_first(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolvers.insert(0, Box::new(resolver));
        self
    }

    /// Register the built-in transform library in all three registries.
    /// Names registered afterwards replace built-ins of the same name.
    pub fn with_builtins(mut self) -> Self {
        let builtins = Registries::with_builtins();
        self.registries.transforms.extend(&builtins.transforms);
        self.registries.arr_transforms.extend(&builtins.arr_transforms);
        self.registries.obj_transforms.extend(&builtins.obj_transforms);
        self
    }

    pub fn transform<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.registries.transforms.register(name, f);
        self
    }

    pub fn arr_transform<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.registries.arr_transforms.register(name, f);
        self
    }

    pub fn obj_transform<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.registries.obj_transforms.register(name, f);
        self
    }

    /// Merge a whole registry into the named-transform registry.
    pub fn transforms(mut self, registry: &TransformRegistry) -> Self {
        self.registries.transforms.extend(registry);
        self
    }

    pub fn build(self) -> Result<Extractor, ConfigError> {
        let Self {
            factory,
            mut resolvers,
            registries,
        } = self;

        if resolvers.is_empty() {
            return Err(ConfigError::NoResolvers);
        }

        let setup = ResolverSetup {
            registries: Arc::new(registries),
            has_delegate: resolvers.iter().any(|resolver| !resolver.is_object()),
        };
        for resolver in resolvers.iter_mut() {
            resolver.configure(&setup)?;
        }

        debug!(
            resolvers = ?resolvers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            "Extractor ready"
        );

        Ok(Extractor {
            resolvers,
            registries: setup.registries,
            factory,
        })
    }
}
