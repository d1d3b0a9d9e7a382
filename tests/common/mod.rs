#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use voucher_copy::ConfigProvider;
use zip::write::{FileOptions, ZipWriter};

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Writes a one-sheet workbook with inline string cells. Empty strings leave the cell out.
pub fn write_xlsx(path: &Path, rows: &[&[&str]]) {
    let mut sheet_data = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!(r#"<row r="{}">"#, row_index + 1));
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let column = (b'A' + col_index as u8) as char;
            sheet_data.push_str(&format!(
                r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                column,
                row_index + 1,
                escape(value)
            ));
        }
        sheet_data.push_str("</row>");
    }
    write_sheet_data(path, &sheet_data);
}

/// Writes a one-sheet workbook around a hand-written `<sheetData>` body.
pub fn write_sheet_data(path: &Path, sheet_data: &str) {
    let worksheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        sheet_data
    );

    let file = fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, content) in [
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", worksheet.as_str()),
    ] {
        zip.start_file::<_, ()>(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Temporary teacher/finance tree: `projects/` plus any number of source roots.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("projects")).unwrap();
        Self { temp }
    }

    pub fn projects(&self) -> PathBuf {
        self.temp.path().join("projects")
    }

    pub fn project(&self, name: &str) -> PathBuf {
        let dir = self.projects().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn source_root(&self, name: &str) -> PathBuf {
        let dir = self.temp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// `root/identifier/` holding a couple of scan files.
    pub fn voucher(&self, root: &Path, identifier: &str, content: &str) -> PathBuf {
        let dir = root.join(identifier);
        fs::create_dir_all(dir.join("pages")).unwrap();
        fs::write(dir.join("cover.jpg"), content).unwrap();
        fs::write(dir.join("pages").join("1.jpg"), content).unwrap();
        dir
    }
}

pub struct TestConfig {
    pub project_roots: Vec<PathBuf>,
    pub source_roots: Vec<PathBuf>,
    pub marker: String,
    pub destination_dir: String,
    pub extensions: Vec<String>,
}

impl TestConfig {
    pub fn new(project_roots: Vec<PathBuf>, source_roots: Vec<PathBuf>) -> Self {
        Self {
            project_roots,
            source_roots,
            marker: "编号".to_string(),
            destination_dir: "PZIMG".to_string(),
            extensions: vec!["xlsx".to_string()],
        }
    }
}

impl ConfigProvider for TestConfig {
    fn project_roots(&self) -> &[PathBuf] {
        &self.project_roots
    }

    fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    fn identifier_marker(&self) -> &str {
        &self.marker
    }

    fn destination_dir_name(&self) -> &str {
        &self.destination_dir
    }

    fn spreadsheet_extensions(&self) -> &[String] {
        &self.extensions
    }

    fn log_file(&self) -> Option<&Path> {
        None
    }
}
