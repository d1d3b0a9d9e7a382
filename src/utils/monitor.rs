use crate::domain::model::{LogLine, LogStatus, Progress, ProjectUnit, RunReport};
use crate::domain::ports::ProgressObserver;
use std::time::{Duration, Instant};

/// Console observer for the CLI: echoes audit lines to stdout and traces progress.
pub struct ConsoleMonitor {
    start_time: Instant,
    echo_lines: bool,
    current_project: Option<String>,
    last_project_percent: Option<u8>,
    problems: usize,
}

impl ConsoleMonitor {
    pub fn new(echo_lines: bool) -> Self {
        Self {
            start_time: Instant::now(),
            echo_lines,
            current_project: None,
            last_project_percent: None,
            problems: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Lines with a 失败 or 错误 status seen so far.
    pub fn problems(&self) -> usize {
        self.problems
    }

    pub fn log_stats(&self, phase: &str, progress: Progress) {
        tracing::info!("📊 {} - {}, Time: {:?}", phase, progress, self.elapsed());
    }

    pub fn log_final_stats(&self, report: &RunReport) {
        tracing::info!(
            "📊 Final Stats - Projects: {}, Copied: {}, Skipped: {}, Not found: {}, Copy errors: {}, Total Time: {:?}",
            report.overall,
            report.counts.success,
            report.counts.skipped,
            report.counts.not_found,
            report.counts.copy_errors,
            self.elapsed()
        );
    }
}

impl Default for ConsoleMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProgressObserver for ConsoleMonitor {
    fn run_started(&mut self, overall: Progress) {
        tracing::info!("📋 Found {} projects", overall.maximum);
    }

    fn project_started(&mut self, project: &ProjectUnit) {
        tracing::info!("📂 Processing {}", project.root.display());
        self.current_project = Some(project.name.clone());
        self.last_project_percent = None;
    }

    fn project_progress(&mut self, progress: Progress) {
        // 百分比沒變就不重複輸出
        let percent = progress.percentage();
        if self.last_project_percent == Some(percent) {
            return;
        }
        self.last_project_percent = Some(percent);

        let name = self.current_project.as_deref().unwrap_or("-");
        tracing::debug!("⏳ {}: {}", name, progress);
    }

    fn overall_progress(&mut self, progress: Progress) {
        self.log_stats("Overall", progress);
    }

    fn log_line(&mut self, line: &LogLine) {
        if matches!(line.status, LogStatus::Failed | LogStatus::Error) {
            self.problems += 1;
            tracing::warn!("⚠️ {}", line);
        }
        if self.echo_lines {
            println!("{}", line);
        }
    }
}
