use crate::adapters::Sheet;
use crate::utils::error::Result;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Reads a UTF-8 CSV file into a [`Sheet`]. The first record is the header row.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if rows.is_empty() {
            // Excel 匯出的 CSV 常帶 BOM
            if let Some(first) = cells.first_mut() {
                if let Some(stripped) = first.strip_prefix(UTF8_BOM) {
                    *first = stripped.to_string();
                }
            }
        }
        rows.push(cells);
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Sheet::from_rows(name, rows))
}
