//! Ready-made extractors backed by the `scraper` document adapter.

pub mod config;

pub use config::{ConfigLoader, HarvestConfig, LoadError, OutputConfig};
pub use harvest_core::{
    ConfigError, EngineConfig, Extractor, ExtractorBuilder, ResolveError, ResolverKind, Schema,
    Value, schema::build,
};

use harvest_scraper::ScraperFactory;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

fn preset(kinds: &[ResolverKind]) -> ExtractorBuilder {
    kinds
        .iter()
        .fold(
            ExtractorBuilder::new(Box::new(ScraperFactory::new())),
            |builder, kind| builder.boxed_resolver(kind.build()),
        )
        .with_builtins()
}

/// Object, number and default resolvers with the built-in transforms.
///
/// Use [`ExtractorBuilder::resolver_first`] for custom resolvers that must
/// win over the preset ones.
pub fn basic() -> ExtractorBuilder {
    preset(&[ResolverKind::Object, ResolverKind::Number, ResolverKind::Default])
}

/// Every typed resolver with the built-in transforms.
pub fn full() -> ExtractorBuilder {
    preset(&[
        ResolverKind::Object,
        ResolverKind::Number,
        ResolverKind::Boolean,
        ResolverKind::Date,
        ResolverKind::Default,
    ])
}

pub fn from_config(config: &HarvestConfig) -> Result<ExtractorBuilder, ConfigError> {
    let factory = if config.output.fragment {
        ScraperFactory::fragment()
    } else {
        ScraperFactory::new()
    };
    config.engine.builder(Box::new(factory))
}

/// Resolves `schema` against `html` with an extractor assembled from
/// `config`, returning plain JSON.
pub async fn extract(
    html: &str,
    schema: &Schema,
    config: &HarvestConfig,
) -> Result<serde_json::Value, HarvestError> {
    let extractor = from_config(config)?.build()?;
    debug!(resolvers = ?extractor.resolver_names(), "Extracting");
    let value = extractor.resolve_from_html(html, schema).await?;
    Ok(value.into())
}
