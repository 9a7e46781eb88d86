//! Command line arguments and how they override the configuration file.

use clap::Parser;
use orderlens_config::Config;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Order table to read (.csv or .parquet)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Directory the report pages are written to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Log level or filter directive
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Skip the boundary geometry download
    #[arg(long)]
    pub offline: bool,
}

impl Args {
    /// Applies the values given on the command line over `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(directory) = &self.output_dir {
            config.output.directory = directory.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.offline {
            config.geometry.enabled = false;
        }
    }
}
