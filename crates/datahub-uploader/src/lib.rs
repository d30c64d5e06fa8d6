//! Data Hub Uploader Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Prepares file uploads for the data commons by validating the pre-upload
//! manifest before anything leaves the user's machine.
//!
//! - **Configuration**: YAML config with environment overrides ([`config`])
//! - **Manifest loading**: tab-separated manifests ([`manifest`])
//! - **Validation**: file name rules, sizes and MD5s ([`validator`])

pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod validator;

pub use config::UploaderConfig;
pub use error::{Result, UploaderError};
pub use manifest::{Manifest, ManifestRow};
pub use validator::FileValidator;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Data Hub uploader - prepare and validate file uploads
#[derive(Parser, Debug)]
#[command(name = "datahub-uploader")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a pre-upload manifest and the files it lists
    Validate {
        /// Uploader config file (YAML with a top-level `Config` key)
        #[arg(short, long, env = "DATAHUB_UPLOADER_CONFIG")]
        config: PathBuf,

        /// Manifest to validate, overrides `pre_manifest`
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Directory holding the files, overrides `file_dir`
        #[arg(short, long)]
        file_dir: Option<PathBuf>,

        /// Only check file names, skip sizes and MD5s
        #[arg(long)]
        names_only: bool,
    },
}
