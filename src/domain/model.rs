use crate::utils::error::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 一個專案資料夾（專案根目錄底下的一個子目錄）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectUnit {
    pub root: PathBuf,
    pub name: String,
}

impl ProjectUnit {
    pub fn new(root: PathBuf) -> Self {
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());
        Self { root, name }
    }

    /// 目的地子目錄，例如 `<project>/PZIMG`
    pub fn destination(&self, dir_name: &str) -> PathBuf {
        self.root.join(dir_name)
    }
}

/// Result of resolving one identifier against the source roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Success { source: PathBuf },
    Skipped,
    NotFound,
    CopyError { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Skipped,
    Failed,
    Error,
}

impl LogStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LogStatus::Success => "成功",
            LogStatus::Skipped => "跳过",
            LogStatus::Failed => "失败",
            LogStatus::Error => "错误",
        }
    }
}

/// One audit record, rendered as `[<status>] <project> - <detail>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub status: LogStatus,
    pub project: String,
    pub detail: String,
}

impl LogLine {
    pub fn new(status: LogStatus, project: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            project: project.into(),
            detail: detail.into(),
        }
    }

    pub fn no_spreadsheet(project: &str) -> Self {
        Self::new(LogStatus::Failed, project, "未找到 Excel 文件")
    }

    pub fn from_outcome(project: &str, identifier: &str, outcome: &CopyOutcome) -> Self {
        match outcome {
            CopyOutcome::Success { source } => Self::new(
                LogStatus::Success,
                project,
                format!("{} ← {}", identifier, source.display()),
            ),
            CopyOutcome::Skipped => Self::new(
                LogStatus::Skipped,
                project,
                format!("{} 已存在，跳过复制", identifier),
            ),
            CopyOutcome::NotFound => Self::new(
                LogStatus::Failed,
                project,
                format!("{} 未在任一源目录中找到", identifier),
            ),
            CopyOutcome::CopyError { reason } => Self::new(
                LogStatus::Error,
                project,
                format!("{} 复制失败：{}", identifier, reason),
            ),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.status.label(), self.project, self.detail)
    }
}

/// A (current, maximum) progress pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub maximum: usize,
}

impl Progress {
    pub fn new(maximum: usize) -> Self {
        Self { current: 0, maximum }
    }

    pub fn advance(&mut self) {
        if self.current < self.maximum {
            self.current += 1;
        }
    }

    /// 四捨五入的百分比；maximum 為 0 時回傳 0
    pub fn percentage(&self) -> u8 {
        if self.maximum == 0 {
            return 0;
        }
        let ratio = self.current as f64 / self.maximum as f64;
        (ratio * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.maximum
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({}%)", self.current, self.maximum, self.percentage())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub overall: Progress,
    pub project: Progress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub success: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub copy_errors: usize,
    pub failed_projects: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::Success { .. } => self.success += 1,
            CopyOutcome::Skipped => self.skipped += 1,
            CopyOutcome::NotFound => self.not_found += 1,
            CopyOutcome::CopyError { .. } => self.copy_errors += 1,
        }
    }
}

/// Everything a single run produced, in production order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub lines: Vec<LogLine>,
    pub overall: Progress,
    pub counts: OutcomeCounts,
}

impl RunReport {
    pub fn new(total_projects: usize) -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            lines: Vec::new(),
            overall: Progress::new(total_projects),
            counts: OutcomeCounts::default(),
        }
    }

    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// Pretty-printed JSON, as written by `--json-report`.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn lines_for<'a>(&'a self, project: &'a str) -> impl Iterator<Item = &'a LogLine> + 'a {
        self.lines.iter().filter(move |line| line.project == project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_format() {
        let line = LogLine::from_outcome(
            "T1",
            "A001",
            &CopyOutcome::Success {
                source: PathBuf::from("/data/S1/A001"),
            },
        );
        assert_eq!(line.to_string(), "[成功] T1 - A001 ← /data/S1/A001");

        let skipped = LogLine::from_outcome("T1", "A001", &CopyOutcome::Skipped);
        assert_eq!(skipped.to_string(), "[跳过] T1 - A001 已存在，跳过复制");

        let missing = LogLine::from_outcome("T1", "A003", &CopyOutcome::NotFound);
        assert_eq!(missing.to_string(), "[失败] T1 - A003 未在任一源目录中找到");

        let failed = LogLine::from_outcome(
            "T1",
            "A004",
            &CopyOutcome::CopyError {
                reason: "disk full".to_string(),
            },
        );
        assert_eq!(failed.status, LogStatus::Error);
        assert_eq!(failed.to_string(), "[错误] T1 - A004 复制失败：disk full");

        assert_eq!(
            LogLine::no_spreadsheet("T2").to_string(),
            "[失败] T2 - 未找到 Excel 文件"
        );
    }

    #[test]
    fn test_progress_percentage_rounds() {
        let mut progress = Progress::new(3);
        assert_eq!(progress.percentage(), 0);
        progress.advance();
        assert_eq!(progress.percentage(), 33);
        progress.advance();
        assert_eq!(progress.percentage(), 67);
        progress.advance();
        assert_eq!(progress.percentage(), 100);
        assert!(progress.is_complete());

        // 不會超過上限
        progress.advance();
        assert_eq!(progress.current, 3);
    }

    #[test]
    fn test_empty_progress_reports_zero() {
        let progress = Progress::new(0);
        assert_eq!(progress.percentage(), 0);
        assert!(progress.is_complete());
        assert_eq!(progress.to_string(), "0/0 (0%)");
    }

    #[test]
    fn test_project_unit_name_is_last_segment() {
        let project = ProjectUnit::new(PathBuf::from("/teachers/2024/T1"));
        assert_eq!(project.name, "T1");
        assert_eq!(
            project.destination("PZIMG"),
            PathBuf::from("/teachers/2024/T1/PZIMG")
        );
    }

    #[test]
    fn test_report_serializes_lines_and_counts() {
        let mut report = RunReport::new(1);
        report.lines.push(LogLine::from_outcome("T1", "A003", &CopyOutcome::NotFound));
        report.counts.record(&CopyOutcome::NotFound);

        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["lines"][0]["status"], "failed");
        assert_eq!(json["lines"][0]["detail"], "A003 未在任一源目录中找到");
        assert_eq!(json["counts"]["not_found"], 1);
        assert_eq!(json["overall"]["maximum"], 1);
        assert!(json["finished_at"].is_null());
    }

    #[test]
    fn test_outcome_counts() {
        let mut counts = OutcomeCounts::default();
        counts.record(&CopyOutcome::Skipped);
        counts.record(&CopyOutcome::NotFound);
        counts.record(&CopyOutcome::NotFound);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.not_found, 2);
        assert_eq!(counts.success, 0);
    }
}
