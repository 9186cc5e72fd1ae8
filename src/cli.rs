//! Command-line surface for manifest generation.

use clap::Parser;
use skiff_config::Settings;
use skiff_manifest::{GenerateRequest, generate};
use skiff_storage::{BackendHandle, backend::S3Backend};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Build an indexd manifest TSV from a file containing one S3 URI per line.
#[derive(Debug, Parser)]
#[command(name = "skiff", version)]
pub struct Cli {
    /// Path to text file containing one S3 URI per line.
    #[arg(long)]
    pub input: PathBuf,
    /// Path where the manifest TSV will be written.
    #[arg(long)]
    pub output: PathBuf,
    /// Authz value for every row, e.g. /programs/MMRF/projects/DISCOVERY.
    #[arg(long)]
    pub authz: String,
    /// Optional AWS profile name.
    #[arg(long)]
    pub profile: Option<String>,
    /// Optional AWS region override.
    #[arg(long)]
    pub region: Option<String>,
    /// Parallel workers for S3 metadata/MD5 fetch.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Skip the first non-empty input line if it is a header.
    #[arg(long)]
    pub skip_header: bool,
    /// Settings file to use instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn run(cli: Cli) -> Result<String, Box<dyn Error>> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(path.clone()))?,
        None => Settings::load()?,
    };
    let profile = cli.profile.or(settings.profile);
    let region = cli.region.or(settings.region);
    tracing::debug!(?profile, ?region, "connecting storage backend");
    let backend: BackendHandle = Arc::new(S3Backend::connect("s3", profile.as_deref(), region.as_deref()).await);
    let request = GenerateRequest {
        input: cli.input,
        output: cli.output,
        authz: cli.authz,
        workers: cli.workers.unwrap_or(settings.workers),
        skip_header: cli.skip_header || settings.skip_header,
    };
    let rows = generate(&backend, &request).await?;
    Ok(format!("Wrote {rows} manifest rows to {}", request.output.display()))
}
