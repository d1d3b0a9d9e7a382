use crate::domain::model::{LogLine, Progress, ProjectUnit};
use std::path::{Path, PathBuf};

pub trait ConfigProvider {
    fn project_roots(&self) -> &[PathBuf];
    fn source_roots(&self) -> &[PathBuf];
    fn identifier_marker(&self) -> &str;
    fn destination_dir_name(&self) -> &str;
    fn spreadsheet_extensions(&self) -> &[String];
    fn log_file(&self) -> Option<&Path>;
}

/// Receives progress and audit lines while a batch runs.
///
/// Every method has an empty default so observers only implement what they render.
pub trait ProgressObserver {
    fn run_started(&mut self, _overall: Progress) {}

    fn project_started(&mut self, _project: &ProjectUnit) {}

    fn project_progress(&mut self, _progress: Progress) {}

    fn overall_progress(&mut self, _progress: Progress) {}

    fn log_line(&mut self, _line: &LogLine) {}
}

/// 不輸出任何東西的觀察者
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl ProgressObserver for SilentObserver {}
