use crate::resolution::{
    BooleanResolver, DateResolver, DefaultResolver, ExtractorBuilder, NumberResolver,
    ObjectResolver, SchemaResolver, StringResolver,
};
use harvest_common::{ConfigError, DocumentFactory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The resolvers an extractor can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    Object,
    Number,
    Boolean,
    Date,
    String,
    Default,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverKind::Object => "object",
            ResolverKind::Number => "number",
            ResolverKind::Boolean => "boolean",
            ResolverKind::Date => "date",
            ResolverKind::String => "string",
            ResolverKind::Default => "default",
        }
    }

    pub fn build(&self) -> Box<dyn SchemaResolver> {
        match self {
            ResolverKind::Object => Box::new(ObjectResolver::new()),
            ResolverKind::Number => Box::new(NumberResolver::new()),
            ResolverKind::Boolean => Box::new(BooleanResolver::new()),
            ResolverKind::Date => Box::new(DateResolver::new()),
            ResolverKind::String => Box::new(StringResolver::new()),
            ResolverKind::Default => Box::new(DefaultResolver::new()),
        }
    }
}

impl FromStr for ResolverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "object" => Ok(ResolverKind::Object),
            "number" => Ok(ResolverKind::Number),
            "boolean" => Ok(ResolverKind::Boolean),
            "date" => Ok(ResolverKind::Date),
            "string" => Ok(ResolverKind::String),
            "default" => Ok(ResolverKind::Default),
            _ => Err(ConfigError::UnknownResolver(s.to_string())),
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extractor assembly options, usually read from `harvest.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Resolver names in dispatch order.
    #[serde(default = "default_resolvers")]
    pub resolvers: Vec<String>,
    #[serde(default = "default_builtin_transforms")]
    pub builtin_transforms: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolvers: default_resolvers(),
            builtin_transforms: default_builtin_transforms(),
        }
    }
}

fn default_resolvers() -> Vec<String> {
    ["object", "number", "boolean", "date", "default"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_builtin_transforms() -> bool {
    true
}

impl EngineConfig {
    /// Object, number and default resolvers only.
    pub fn basic() -> Self {
        Self {
            resolvers: ["object", "number", "default"]
                .into_iter()
                .map(String::from)
                .collect(),
            builtin_transforms: true,
        }
    }

    pub fn resolver_kinds(&self) -> Result<Vec<ResolverKind>, ConfigError> {
        self.resolvers.iter().map(|name| name.parse()).collect()
    }

    /// A builder carrying the configured resolvers and, when enabled, the
    /// built-in transforms. Callers may register more before building.
    pub fn builder(&self, factory: Box<dyn DocumentFactory>) -> Result<ExtractorBuilder, ConfigError> {
        let mut builder = ExtractorBuilder::new(factory);
        for kind in self.resolver_kinds()? {
            builder = builder.boxed_resolver(kind.build());
        }
        if self.builtin_transforms {
            builder = builder.with_builtins();
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        let kinds = config.resolver_kinds().unwrap();
        assert_eq!(
            kinds,
            vec![
                ResolverKind::Object,
                ResolverKind::Number,
                ResolverKind::Boolean,
                ResolverKind::Date,
                ResolverKind::Default,
            ]
        );
        assert!(config.builtin_transforms);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: EngineConfig = serde_yaml::from_str("builtin_transforms: false\n").unwrap();
        assert_eq!(config.resolvers, EngineConfig::default().resolvers);
        assert!(!config.builtin_transforms);
    }

    #[test]
    fn test_basic_config() {
        assert_eq!(
            EngineConfig::basic().resolver_kinds().unwrap(),
            vec![ResolverKind::Object, ResolverKind::Number, ResolverKind::Default]
        );
    }

    #[test]
    fn test_unknown_resolver() {
        let config = EngineConfig {
            resolvers: vec!["object".into(), "regex".into()],
            builtin_transforms: true,
        };
        assert_eq!(
            config.resolver_kinds().unwrap_err(),
            ConfigError::UnknownResolver("regex".into())
        );
    }

    #[test]
    fn test_resolver_names_round_trip() {
        for kind in [
            ResolverKind::Object,
            ResolverKind::Number,
            ResolverKind::Boolean,
            ResolverKind::Date,
            ResolverKind::String,
            ResolverKind::Default,
        ] {
            assert_eq!(kind.to_string().parse::<ResolverKind>().unwrap(), kind);
            assert_eq!(kind.build().name(), kind.as_str());
        }
    }
}
