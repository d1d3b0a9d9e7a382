use crate::domain::model::LogLine;
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// `日志_20240131_093005.txt`
pub fn default_log_file_name(at: DateTime<Local>) -> String {
    format!("日志_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Writes the audit lines to `target`, one per line, UTF-8.
///
/// When `target` is an existing directory the file gets the default timestamped
/// name inside it. An empty log writes nothing and returns `None`.
pub fn export_log(lines: &[LogLine], target: &Path) -> Result<Option<PathBuf>> {
    if lines.is_empty() {
        tracing::info!("📭 Log is empty, nothing exported");
        return Ok(None);
    }

    let path = if target.is_dir() {
        target.join(default_log_file_name(Local::now()))
    } else {
        target.to_path_buf()
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut content = String::new();
    for line in lines {
        content.push_str(&line.to_string());
        content.push('\n');
    }
    fs::write(&path, content)?;

    tracing::info!("💾 Log saved to {}", path.display());
    Ok(Some(path))
}
