//! Data Hub Uploader - main entry point

use clap::Parser;
use datahub_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use datahub_uploader::{Cli, Commands};
use std::process;
use tracing::error;

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .output(LogOutput::Console)
        .log_file_prefix("datahub-uploader")
        .build();

    // Environment variables take precedence over flags
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);

    // The uploader still works without logging, only quieter
    let _guard = init_logging(&log_config).ok();

    match execute_command(&cli) {
        Ok(true) => {},
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        },
    }
}

/// Run the command, returning whether the manifest passed
fn execute_command(cli: &Cli) -> datahub_uploader::Result<bool> {
    match &cli.command {
        Commands::Validate {
            config,
            manifest,
            file_dir,
            names_only,
        } => {
            let report = datahub_uploader::commands::validate::run(
                config.clone(),
                manifest.clone(),
                file_dir.clone(),
                *names_only,
            )?;
            Ok(report.is_valid())
        },
    }
}
