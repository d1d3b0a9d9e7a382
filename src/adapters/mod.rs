//! Spreadsheet adapters.
//!
//! Every supported file format is read into a [`Sheet`], a dense grid of cell
//! text indexed from zero. Row 0 is the header row.

pub mod csv_sheet;
pub(crate) mod xml;
pub mod xlsx;

use crate::utils::error::{Result, VoucherError};
use std::path::Path;

/// Cell text of one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 設定某個儲存格的值，必要時擴充列與欄
    pub fn set(&mut self, row: usize, col: usize, value: String) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, String::new);
        }
        cells[col] = value;
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows after the header, including blank ones, in sheet order.
    pub fn data_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().skip(1).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Extensions the adapters know how to read.
pub const READABLE_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "csv"];

/// Opens a spreadsheet and returns its active sheet, picking the reader by extension.
pub fn open_sheet(path: &Path) -> Result<Sheet> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => xlsx::read_active_sheet(path),
        "csv" => csv_sheet::read_sheet(path),
        other => Err(VoucherError::spreadsheet(
            path.display().to_string(),
            format!(
                "unsupported file extension '{}', expected one of: {}",
                other,
                READABLE_EXTENSIONS.join(", ")
            ),
        )),
    }
}
