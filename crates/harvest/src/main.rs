use anyhow::Context;
use clap::Parser;
use harvest::ConfigLoader;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "harvest", version, about = "Extract structured data from HTML")]
struct Args {
    /// Selector schema (YAML or JSON)
    #[arg(short, long)]
    schema: PathBuf,

    /// Config file, instead of ./harvest.yaml or ~/.harvest/config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Parse the input as an HTML fragment
    #[arg(long)]
    fragment: bool,

    /// HTML file to read. Reads stdin when omitted.
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    config.output.compact |= args.compact;
    config.output.fragment |= args.fragment;

    let schema = ConfigLoader::load_schema(&args.schema)
        .await
        .with_context(|| format!("Failed to load schema {}", args.schema.display()))?;

    let html = match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    let value = harvest::extract(&html, &schema, &config).await?;
    let output = if config.output.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{}", output);
    Ok(())
}
