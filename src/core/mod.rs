pub mod engine;
pub mod extractor;
pub mod resolver;

pub use crate::domain::model::{CopyOutcome, LogLine, LogStatus, Progress, RunReport};
pub use crate::domain::ports::{ConfigProvider, ProgressObserver};
pub use crate::utils::error::Result;
pub use engine::BatchEngine;
pub use extractor::{ExtractError, IdentifierExtractor};
pub use resolver::SourceRoots;
