pub mod context;
pub mod extractor;
pub mod object;
pub mod resolver;
pub mod value;

pub use context::ResolutionContext;
pub use extractor::{Extractor, ExtractorBuilder};
pub use object::ObjectResolver;
pub use resolver::{ResolverSetup, SchemaResolver};
pub use value::{
    BooleanResolver, DateResolver, DefaultResolver, NumberResolver, StringResolver, ValueResolver,
};
