pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::toml_config::TomlConfig;
pub use core::{
    engine::BatchEngine,
    extractor::{ExtractError, IdentifierExtractor},
    resolver::SourceRoots,
};
pub use domain::model::{CopyOutcome, LogLine, LogStatus, Progress, ProjectUnit, RunReport};
pub use domain::ports::{ConfigProvider, ProgressObserver, SilentObserver};
pub use utils::error::{Result, VoucherError};
