pub mod toml_config;

pub use crate::core::extractor::DEFAULT_MARKER;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// 每個專案底下的目的地子目錄
pub const DEFAULT_DESTINATION_DIR: &str = "PZIMG";

pub const DEFAULT_EXTENSIONS: &[&str] = &["xlsx"];

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "voucher-copy")]
#[command(about = "Copies voucher folders listed in project spreadsheets into each project's PZIMG folder")]
pub struct CliConfig {
    /// Folder whose subdirectories are projects (repeatable)
    #[arg(short = 'p', long = "project-root", value_delimiter = ',')]
    pub project_roots: Vec<PathBuf>,

    /// Folder holding one subdirectory per identifier; earlier roots win (repeatable)
    #[arg(short = 's', long = "source-root", value_delimiter = ',')]
    pub source_roots: Vec<PathBuf>,

    #[arg(long, default_value = DEFAULT_MARKER, help = "Header text marking the identifier column")]
    pub marker: String,

    #[arg(long, default_value = DEFAULT_DESTINATION_DIR)]
    pub destination_dir: String,

    #[arg(long, value_delimiter = ',', default_value = "xlsx")]
    pub extensions: Vec<String>,

    #[arg(long, help = "Write the audit log to this file or directory")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Resolve identifiers without copying anything")]
    pub dry_run: bool,

    #[arg(long, help = "Print the run report as JSON on stdout")]
    pub json_report: bool,

    #[arg(long, help = "Emit tracing output as JSON")]
    pub json_log: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn has_custom_marker(&self) -> bool {
        self.marker != DEFAULT_MARKER
    }

    pub fn has_custom_destination(&self) -> bool {
        self.destination_dir != DEFAULT_DESTINATION_DIR
    }

    pub fn has_custom_extensions(&self) -> bool {
        self.extensions != default_extensions()
    }
}
