//! Data Hub Puller - pull STS vocabularies into storage

use anyhow::Result;
use clap::Parser;
use datahub_common::logging::{init_logging, LogConfig, LogLevel};
use datahub_puller::{pull_pv_lists, store::open_store, PullerConfig, PullerError};
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "datahub-puller")]
#[command(author, version, about = "Pull property PVs, synonyms and concept codes from STS")]
struct Cli {
    /// Puller config file (YAML with a top-level `Config` key)
    #[arg(short, long, env = "DATAHUB_PULLER_CONFIG")]
    config: PathBuf,

    /// Only pull property PVs, skip synonyms and concept codes
    #[arg(long)]
    properties_only: bool,

    /// Write JSON dumps to this directory, overrides `dump_dir`
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .log_file_prefix("datahub-puller")
        .build();

    // Environment variables take precedence over flags
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);
    let _guard = init_logging(&log_config)?;

    let mut config = PullerConfig::load(&cli.config)?;
    if cli.properties_only {
        config.properties_only = true;
    }
    if let Some(dir) = cli.dump_dir {
        config.dump_dir = Some(dir);
    }

    let store = open_store(&config).await?;

    match pull_pv_lists(config, store).await {
        Ok(summary) if summary.is_complete() => {
            info!(
                properties = summary.properties,
                synonyms = summary.synonyms,
                concept_codes = summary.concept_codes,
                skipped = summary.skipped,
                "Pull complete"
            );
            Ok(())
        },
        Ok(summary) => {
            let failed: Vec<String> = summary.failed_stages.iter().map(|s| s.to_string()).collect();
            anyhow::bail!("Failed to save {}", failed.join(", "))
        },
        Err(PullerError::Cancelled) => {
            println!("Task is stopped...");
            process::exit(130);
        },
        Err(e) => Err(e.into()),
    }
}
