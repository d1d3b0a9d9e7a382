use crate::adapters::{self, Sheet};
use std::path::Path;
use thiserror::Error;

/// 預設的識別欄標記
pub const DEFAULT_MARKER: &str = "编号";

/// Why a project's spreadsheet yielded no identifiers. `Display` is the audit-log reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("未找到{marker}列")]
    NoIdentifierColumn { marker: String },

    #[error("Excel读取失败：{0}")]
    ReadError(String),
}

/// Pulls the identifier column out of a project spreadsheet.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    marker: String,
}

impl IdentifierExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn extract(&self, spreadsheet: &Path) -> Result<Vec<String>, ExtractError> {
        let sheet = adapters::open_sheet(spreadsheet)
            .map_err(|e| ExtractError::ReadError(e.to_string()))?;
        self.extract_from_sheet(&sheet)
    }

    /// 只掃第一列找標記，之後固定使用該欄
    pub fn extract_from_sheet(&self, sheet: &Sheet) -> Result<Vec<String>, ExtractError> {
        let column = self
            .identifier_column(sheet)
            .ok_or_else(|| ExtractError::NoIdentifierColumn {
                marker: self.marker.clone(),
            })?;

        let identifiers = sheet
            .data_rows()
            .filter_map(|row| row.get(column))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        tracing::debug!(
            "Found {} identifiers in column {} of sheet '{}'",
            identifiers.len(),
            column + 1,
            sheet.name
        );
        Ok(identifiers)
    }

    pub fn identifier_column(&self, sheet: &Sheet) -> Option<usize> {
        sheet
            .header()
            .iter()
            .position(|cell| !cell.is_empty() && cell.contains(self.marker.as_str()))
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}
