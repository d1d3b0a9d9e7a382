use crate::core::extractor::IdentifierExtractor;
use crate::core::resolver::SourceRoots;
use crate::domain::model::{
    LogLine, LogStatus, Progress, ProgressState, ProjectUnit, RunReport,
};
use crate::domain::ports::{ConfigProvider, ProgressObserver};
use crate::utils::error::{Result, VoucherError};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Runs one batch: every project folder, every identifier, strictly in sequence.
pub struct BatchEngine<C: ConfigProvider> {
    config: C,
    extractor: IdentifierExtractor,
    project_roots: Vec<PathBuf>,
    sources: SourceRoots,
}

impl<C: ConfigProvider> BatchEngine<C> {
    pub fn new(config: C) -> Self {
        let extractor = IdentifierExtractor::new(config.identifier_marker());
        let project_roots = unique_roots(config.project_roots());
        let sources = SourceRoots::new(unique_roots(config.source_roots()));
        Self {
            config,
            extractor,
            project_roots,
            sources,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn extractor(&self) -> &IdentifierExtractor {
        &self.extractor
    }

    pub fn sources(&self) -> &SourceRoots {
        &self.sources
    }

    pub fn run<O: ProgressObserver + ?Sized>(&self, observer: &mut O) -> Result<RunReport> {
        self.check_roots()?;

        let projects = self.discover_projects();
        let mut report = RunReport::new(projects.len());
        let mut state = ProgressState {
            overall: Progress::new(projects.len()),
            project: Progress::default(),
        };

        tracing::info!(
            "🚀 Starting batch: {} projects, {} source roots",
            projects.len(),
            self.sources.roots().len()
        );
        observer.run_started(state.overall);

        for project in &projects {
            observer.project_started(project);
            self.process_project(project, &mut state, &mut report, observer);

            // 不論專案成功或失敗，總進度都前進
            state.overall.advance();
            observer.overall_progress(state.overall);
        }

        report.overall = state.overall;
        report.finished_at = Some(Local::now());
        tracing::info!(
            "✅ Batch finished: {} copied, {} skipped, {} not found, {} copy errors, {} failed projects",
            report.counts.success,
            report.counts.skipped,
            report.counts.not_found,
            report.counts.copy_errors,
            report.counts.failed_projects
        );
        Ok(report)
    }

    fn check_roots(&self) -> Result<()> {
        if self.project_roots.is_empty() {
            return Err(VoucherError::MissingConfigError {
                field: "project_roots".to_string(),
            });
        }
        if self.sources.is_empty() {
            return Err(VoucherError::MissingConfigError {
                field: "source_roots".to_string(),
            });
        }
        Ok(())
    }

    /// Immediate subdirectories of every project root, roots in configured order.
    pub fn discover_projects(&self) -> Vec<ProjectUnit> {
        let mut projects = Vec::new();
        for root in &self.project_roots {
            match list_subdirectories(root) {
                Ok(dirs) => {
                    tracing::debug!("Found {} projects under {}", dirs.len(), root.display());
                    projects.extend(dirs.into_iter().map(ProjectUnit::new));
                }
                Err(e) => {
                    tracing::warn!("Cannot list project root {}: {}", root.display(), e);
                }
            }
        }
        projects
    }

    fn process_project<O: ProgressObserver + ?Sized>(
        &self,
        project: &ProjectUnit,
        state: &mut ProgressState,
        report: &mut RunReport,
        observer: &mut O,
    ) {
        let Some(spreadsheet) = find_spreadsheet(&project.root, self.config.spreadsheet_extensions())
        else {
            report.counts.failed_projects += 1;
            emit(LogLine::no_spreadsheet(&project.name), report, observer);
            return;
        };
        tracing::debug!("{}: using {}", project.name, spreadsheet.display());

        let identifiers = match self.extractor.extract(&spreadsheet) {
            Ok(identifiers) => identifiers,
            Err(e) => {
                report.counts.failed_projects += 1;
                emit(
                    LogLine::new(LogStatus::Failed, &project.name, e.to_string()),
                    report,
                    observer,
                );
                return;
            }
        };

        let destination = project.destination(self.config.destination_dir_name());
        if let Err(e) = fs::create_dir_all(&destination) {
            report.counts.failed_projects += 1;
            emit(
                LogLine::new(
                    LogStatus::Error,
                    &project.name,
                    format!("无法创建目标目录：{}", e),
                ),
                report,
                observer,
            );
            return;
        }

        state.project = Progress::new(identifiers.len());
        observer.project_progress(state.project);

        for identifier in &identifiers {
            let outcome = self.sources.resolve_and_copy(identifier, &destination);
            report.counts.record(&outcome);
            emit(
                LogLine::from_outcome(&project.name, identifier, &outcome),
                report,
                observer,
            );

            state.project.advance();
            observer.project_progress(state.project);
        }
    }
}

/// 重複的根目錄只保留第一次出現的位置
pub fn unique_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        if unique.contains(root) {
            tracing::debug!("Ignoring repeated root {}", root.display());
            continue;
        }
        unique.push(root.clone());
    }
    unique
}

fn emit<O: ProgressObserver + ?Sized>(line: LogLine, report: &mut RunReport, observer: &mut O) {
    observer.log_line(&line);
    report.lines.push(line);
}

/// 目錄下的子目錄，依名稱排序
pub fn list_subdirectories(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// First spreadsheet directly inside `dir`, by file name.
///
/// Extensions compare ASCII case-insensitively and Office lock files (`~$...`) are ignored.
pub fn find_spreadsheet(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot list {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let is_lock_file = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with("~$"))
                .unwrap_or(false);
            let has_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
                .unwrap_or(false);
            !is_lock_file && has_extension
        })
        .collect();

    if candidates.len() > 1 {
        tracing::debug!(
            "{} spreadsheets in {}, using the first by name",
            candidates.len(),
            dir.display()
        );
    }
    candidates.sort();
    candidates.into_iter().next()
}
