use super::extractor::Extractor;

/// Per-call state handed down the resolution tree.
#[derive(Clone)]
pub struct ResolutionContext<'a> {
    engine: &'a Extractor,
    /// Dotted field path from the root schema, for diagnostics.
    path: String,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(engine: &'a Extractor) -> Self {
        Self {
            engine,
            path: String::from("$"),
        }
    }

    pub fn engine(&self) -> &'a Extractor {
        self.engine
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Context for the object field `key`.
    pub fn field(&self, key: &str) -> ResolutionContext<'a> {
        ResolutionContext {
            engine: self.engine,
            path: format!("{}.{}", self.path, key),
        }
    }
}
