use thiserror::Error;

/// Errors reported by a document adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("Failed to load document: {0}")]
    Load(String),
}

/// A named transform rejected its input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Transform '{name}' failed: {reason}")]
pub struct TransformError {
    pub name: String,
    pub reason: String,
}

impl TransformError {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that reject a single resolution call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("Empty selector. Please check your selector schema syntax")]
    EmptySelector,

    #[error(
        "Invalid scope: []. Auto scoping only supports a simple string selector, found {found}"
    )]
    InvalidAutoScope { found: String },

    #[error("Invalid match pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Errors raised while assembling an extractor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("No resolver provided. At least one resolver is required")]
    NoResolvers,

    #[error("Object resolver cannot work without another resolver to delegate fields to")]
    MissingDelegate,

    #[error("Unknown resolver '{0}'")]
    UnknownResolver(String),
}

/// A schema document has the wrong shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid schema at '{path}': {reason}")]
pub struct SchemaError {
    pub path: String,
    pub reason: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
