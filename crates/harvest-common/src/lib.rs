pub mod error;
pub mod node;
pub mod value;

pub use error::{ConfigError, DocumentError, ResolveError, SchemaError, TransformError};
pub use node::{DocumentFactory, DocumentNode, Node};
pub use value::{Map, Value};
