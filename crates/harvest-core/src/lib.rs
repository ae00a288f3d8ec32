pub mod coerce;
pub mod config;
pub mod resolution;
pub mod schema;
pub mod selector;
pub mod transform;

pub use config::{EngineConfig, ResolverKind};
pub use resolution::{Extractor, ExtractorBuilder, ObjectResolver, SchemaResolver};
pub use schema::{Schema, Scope, SelectorOptions, SimpleSelector, ValueKind};
pub use selector::{ParsedSelector, parse_selector_string};
pub use transform::{Pipeline, Registries, Transform, TransformRegistry, build_pipeline};

pub use harvest_common::{
    ConfigError, DocumentError, DocumentFactory, DocumentNode, Map, Node, ResolveError,
    SchemaError, TransformError, Value,
};
