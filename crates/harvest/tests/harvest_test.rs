use harvest::build::{date, number, object, string, text};
use harvest::{ConfigError, ConfigLoader, EngineConfig, HarvestConfig, HarvestError, Value};
use harvest_core::resolution::StringResolver;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const PAGE: &str = r#"<html><body>
<article><h2>First</h2><span class="votes">1.2k</span><time>2023-07-01</time></article>
<article><h2>Second</h2><span class="votes">87</span><time>2023-07-02</time></article>
</body></html>"#;

#[tokio::test]
async fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
engine:
  resolvers: [object, string]
  builtin_transforms: false
output:
  compact: true
"#
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path())
        .await
        .expect("Failed to load config from file");

    assert_eq!(config.engine.resolvers, vec!["object", "string"]);
    assert!(!config.engine.builtin_transforms);
    assert!(config.output.compact);
    assert!(!config.output.fragment);
}

#[tokio::test]
async fn test_load_from_nonexistent_file() {
    let result =
        ConfigLoader::load_from(std::path::Path::new("/nonexistent/path/config.yaml")).await;
    assert!(result.is_err());
}

#[test]
fn test_search_paths_start_with_working_directory() {
    let paths = ConfigLoader::search_paths();
    assert_eq!(paths[0], std::path::Path::new(".").join("harvest.yaml"));
    assert!(paths.iter().skip(1).all(|p| p.ends_with(".harvest/config.yaml")));
}

#[tokio::test]
async fn test_load_schema_json_and_yaml() {
    let mut json_file = NamedTempFile::new().unwrap();
    writeln!(json_file, r#"{{"selector": {{"title": "h2"}}, "scope": ["article"]}}"#).unwrap();
    let mut yaml_file = NamedTempFile::new().unwrap();
    writeln!(yaml_file, "selector:\n  title: h2\nscope: [article]").unwrap();

    for file in [&json_file, &yaml_file] {
        let schema = ConfigLoader::load_schema(file.path()).await.unwrap();
        let result = harvest::extract(PAGE, &schema, &HarvestConfig::default())
            .await
            .unwrap();
        assert_eq!(result, json!([{"title": "First"}, {"title": "Second"}]));
    }
}

#[tokio::test]
async fn test_load_schema_rejects_bad_shape() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "selector: 42").unwrap();
    assert!(ConfigLoader::load_schema(file.path()).await.is_err());
}

#[tokio::test]
async fn test_extract_with_default_config() {
    let schema: harvest::Schema = serde_yaml::from_str(
        r#"
scope: [article]
selector:
  title: h2 | uppercase
  votes:
    selector: .votes
    number: true
  posted:
    selector: time
    date: true
    format: DD/MM/YYYY
"#,
    )
    .unwrap();
    let result = harvest::extract(PAGE, &schema, &HarvestConfig::default())
        .await
        .unwrap();
    assert_eq!(
        result,
        json!([
            {"title": "FIRST", "votes": 1200, "posted": "01/07/2023"},
            {"title": "SECOND", "votes": 87, "posted": "02/07/2023"},
        ])
    );
}

#[tokio::test]
async fn test_extract_with_unknown_resolver() {
    let config = HarvestConfig {
        engine: EngineConfig {
            resolvers: vec!["object".into(), "xpath".into()],
            builtin_transforms: true,
        },
        ..Default::default()
    };
    let err = harvest::extract(PAGE, &harvest::Schema::from("h2"), &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HarvestError::Config(ConfigError::UnknownResolver(name)) if name == "xpath"
    ));
}

#[tokio::test]
async fn test_fragment_input() {
    let mut config = HarvestConfig::default();
    config.output.fragment = true;
    let schema = harvest::Schema::from(vec!["li"]);
    let result = harvest::extract("<li>x</li><li>y</li>", &schema, &config)
        .await
        .unwrap();
    assert_eq!(result, json!(["x", "y"]));
}

#[tokio::test]
async fn test_basic_preset_resolves_numbers() {
    let extractor = harvest::basic().build().unwrap();
    assert_eq!(extractor.resolver_names(), vec!["object", "number", "default"]);

    let schema = object([("title", text("h2")), ("votes", number(".votes"))]);
    let result = extractor.resolve_from_html(PAGE, &schema).await.unwrap();
    assert_eq!(
        serde_json::Value::from(result),
        json!({"title": "First", "votes": 1200})
    );
}

#[tokio::test]
async fn test_basic_preset_leaves_dates_unresolved() {
    let extractor = harvest::basic().build().unwrap();
    let schema = object([("posted", date("time", None))]);
    let result = extractor.resolve_from_html(PAGE, &schema).await.unwrap();
    assert_eq!(serde_json::Value::from(result), json!({"posted": null}));
}

#[tokio::test]
async fn test_resolver_first_runs_before_preset_resolvers() {
    let extractor = harvest::basic()
        .resolver_first(StringResolver::new())
        .build()
        .unwrap();
    assert_eq!(
        extractor.resolver_names(),
        vec!["string", "object", "number", "default"]
    );
    let result = extractor
        .resolve_from_html(PAGE, &string("h2"))
        .await
        .unwrap();
    assert_eq!(result, Value::from("First"));
}

#[tokio::test]
async fn test_full_preset_with_custom_transform() {
    let extractor = harvest::full()
        .transform("uppercase", |_, _| Ok(Value::from("overridden")))
        .build()
        .unwrap();
    let result = extractor
        .resolve_from_html(PAGE, &text("h2 | uppercase"))
        .await
        .unwrap();
    assert_eq!(result, Value::from("overridden"));
}
