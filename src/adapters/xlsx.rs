//! Read-only access to Office Open XML workbooks (`.xlsx` / `.xlsm`).
//!
//! Only what the identifier extractor needs is parsed: the workbook's sheet
//! list and active tab, the shared string table, and the cell text of one
//! worksheet. Styles and number formats are ignored, so numbers come back as
//! their stored literal.

use crate::adapters::xml::{attribute, local_attribute, push_reference, XmlReader, ZipXmlExt};
use crate::adapters::Sheet;
use crate::utils::error::{Result, VoucherError};
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_WORKBOOK_VIEW: &[u8] = b"workbookView";
const TAG_SHEET: &[u8] = b"sheet";
const TAG_SHARED_STRING_ITEM: &[u8] = b"si";
const TAG_PHONETIC_TEXT: &[u8] = b"rPh";
const TAG_TEXT: &[u8] = b"t";
const TAG_ROW: &[u8] = b"row";
const TAG_CELL: &[u8] = b"c";
const TAG_VALUE: &[u8] = b"v";
const TAG_INLINE_STRING: &[u8] = b"is";

/// Sheet size limits of the file format (`XFD1048576`).
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

struct Workbook {
    /// (sheet name, zip path) in workbook order
    sheets: Vec<(String, String)>,
    active_tab: usize,
}

impl Workbook {
    fn active_sheet(&self) -> Option<&(String, String)> {
        self.sheets
            .get(self.active_tab)
            .or_else(|| self.sheets.first())
    }
}

/// Reads the active worksheet of the workbook at `path`.
pub fn read_active_sheet(path: &Path) -> Result<Sheet> {
    let file = File::open(path)?;
    read_workbook(BufReader::new(file), &path.display().to_string())
}

/// Reads the active worksheet from any seekable source; `label` names it in errors.
pub fn read_workbook<R: Read + Seek>(reader: R, label: &str) -> Result<Sheet> {
    let mut zip = ZipArchive::new(reader)?;
    let workbook = load_workbook(&mut zip, label)?;
    let (name, part) = workbook
        .active_sheet()
        .ok_or_else(|| VoucherError::spreadsheet(label, "workbook contains no worksheets"))?;

    let shared_strings = load_shared_strings(&mut zip)?;
    let mut reader = zip
        .xml_reader(part)?
        .ok_or_else(|| VoucherError::spreadsheet(label, format!("missing worksheet part '{}'", part)))?;

    tracing::debug!("Reading worksheet '{}' from {}", name, label);
    read_cells(&mut reader, name, &shared_strings, label)
}

fn load_relationships<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    label: &str,
) -> Result<HashMap<String, String>> {
    let mut reader = zip.xml_reader(WORKBOOK_RELS_PART)?.ok_or_else(|| {
        VoucherError::spreadsheet(label, format!("missing '{}'", WORKBOOK_RELS_PART))
    })?;

    let mut relationships = HashMap::new();
    while let Some(event) = reader.next()? {
        if let Event::Start(e) = event {
            if e.local_name().as_ref() != TAG_RELATIONSHIP {
                continue;
            }
            let kind = attribute(&e, "Type")?;
            if !kind.map(|k| k.ends_with("/worksheet")).unwrap_or(true) {
                continue;
            }
            if let (Some(id), Some(target)) = (attribute(&e, "Id")?, attribute(&e, "Target")?) {
                relationships.insert(id, to_zip_path(&target));
            }
        }
    }
    Ok(relationships)
}

fn load_workbook<R: Read + Seek>(zip: &mut ZipArchive<R>, label: &str) -> Result<Workbook> {
    let relationships = load_relationships(zip, label)?;
    let mut reader = zip
        .xml_reader(WORKBOOK_PART)?
        .ok_or_else(|| VoucherError::spreadsheet(label, format!("missing '{}'", WORKBOOK_PART)))?;

    let mut workbook = Workbook {
        sheets: Vec::new(),
        active_tab: 0,
    };
    while let Some(event) = reader.next()? {
        match event {
            Event::Start(e) if e.local_name().as_ref() == TAG_SHEET => {
                let name = attribute(&e, "name")?;
                let id = local_attribute(&e, b"id")?;
                if let (Some(name), Some(id)) = (name, id) {
                    if let Some(path) = relationships.get(&id) {
                        workbook.sheets.push((name, path.clone()));
                    }
                }
            }
            Event::Start(e) if e.local_name().as_ref() == TAG_WORKBOOK_VIEW => {
                workbook.active_tab = attribute(&e, "activeTab")?
                    .and_then(|tab| tab.trim().parse().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    }
    Ok(workbook)
}

fn load_shared_strings<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let Some(mut reader) = zip.xml_reader(SHARED_STRINGS_PART)? else {
        return Ok(Vec::new());
    };

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;
    let mut in_phonetic = false;
    while let Some(event) = reader.next()? {
        match event {
            Event::Start(e) if e.local_name().as_ref() == TAG_SHARED_STRING_ITEM => {
                in_item = true;
                current.clear();
            }
            Event::End(e) if e.local_name().as_ref() == TAG_SHARED_STRING_ITEM => {
                in_item = false;
                strings.push(std::mem::take(&mut current));
            }
            Event::Start(e) if e.local_name().as_ref() == TAG_PHONETIC_TEXT => in_phonetic = true,
            Event::End(e) if e.local_name().as_ref() == TAG_PHONETIC_TEXT => in_phonetic = false,
            Event::Start(e) if in_item && !in_phonetic && e.local_name().as_ref() == TAG_TEXT => {
                in_text = true
            }
            Event::End(e) if e.local_name().as_ref() == TAG_TEXT => in_text = false,
            Event::Text(e) if in_text => {
                current.push_str(&e.xml_content().map_err(VoucherError::xml)?)
            }
            Event::CData(e) if in_text => {
                current.push_str(&e.xml_content().map_err(VoucherError::xml)?)
            }
            Event::GeneralRef(e) if in_text => push_reference(&mut current, &e)?,
            _ => {}
        }
    }
    Ok(strings)
}

fn read_cells<B: BufRead>(
    reader: &mut XmlReader<B>,
    name: &str,
    shared_strings: &[String],
    label: &str,
) -> Result<Sheet> {
    let mut sheet = Sheet::new(name);
    let mut row = 0usize;
    let mut next_row = 0usize;
    let mut next_col = 0usize;
    // (row, col, t 屬性)
    let mut cell: Option<(usize, usize, Option<String>)> = None;
    let mut value = String::new();
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    while let Some(event) = reader.next()? {
        match event {
            Event::Start(e) if e.local_name().as_ref() == TAG_ROW => {
                row = attribute(&e, "r")?
                    .and_then(|r| r.trim().parse::<usize>().ok())
                    .filter(|r| *r > 0)
                    .map(|r| r - 1)
                    .unwrap_or(next_row);
                next_col = 0;
            }
            Event::End(e) if e.local_name().as_ref() == TAG_ROW => next_row = row + 1,
            Event::Start(e) if e.local_name().as_ref() == TAG_CELL => {
                let (r, c) = attribute(&e, "r")?
                    .and_then(|reference| parse_reference(&reference))
                    .unwrap_or((row, next_col));
                // 損毀的參照不可撐大整張表
                if r >= MAX_ROWS || c >= MAX_COLUMNS {
                    return Err(VoucherError::spreadsheet(label, "cell reference out of range"));
                }
                next_col = c + 1;
                cell = Some((r, c, attribute(&e, "t")?));
                value.clear();
            }
            Event::End(e) if e.local_name().as_ref() == TAG_CELL => {
                if let Some((r, c, kind)) = cell.take() {
                    let raw = std::mem::take(&mut value);
                    let text = resolve_cell_value(kind.as_deref(), raw, shared_strings, label)?;
                    if !text.is_empty() {
                        sheet.set(r, c, text);
                    }
                }
            }
            Event::Start(e) if cell.is_some() && e.local_name().as_ref() == TAG_VALUE => in_value = true,
            Event::End(e) if e.local_name().as_ref() == TAG_VALUE => in_value = false,
            Event::Start(e) if cell.is_some() && e.local_name().as_ref() == TAG_INLINE_STRING => {
                in_inline = true
            }
            Event::End(e) if e.local_name().as_ref() == TAG_INLINE_STRING => in_inline = false,
            Event::Start(e) if e.local_name().as_ref() == TAG_PHONETIC_TEXT => in_phonetic = true,
            Event::End(e) if e.local_name().as_ref() == TAG_PHONETIC_TEXT => in_phonetic = false,
            Event::Start(e) if in_inline && !in_phonetic && e.local_name().as_ref() == TAG_TEXT => {
                in_text = true
            }
            Event::End(e) if e.local_name().as_ref() == TAG_TEXT => in_text = false,
            Event::Text(e) if in_value || in_text => {
                value.push_str(&e.xml_content().map_err(VoucherError::xml)?)
            }
            Event::CData(e) if in_value || in_text => {
                value.push_str(&e.xml_content().map_err(VoucherError::xml)?)
            }
            Event::GeneralRef(e) if in_value || in_text => push_reference(&mut value, &e)?,
            _ => {}
        }
    }

    Ok(sheet)
}

fn resolve_cell_value(
    kind: Option<&str>,
    raw: String,
    shared_strings: &[String],
    label: &str,
) -> Result<String> {
    match kind {
        Some("s") => {
            let index = raw.trim();
            if index.is_empty() {
                return Ok(String::new());
            }
            let index: usize = index.parse().map_err(|_| {
                VoucherError::spreadsheet(label, format!("invalid shared string index '{}'", index))
            })?;
            shared_strings.get(index).cloned().ok_or_else(|| {
                VoucherError::spreadsheet(
                    label,
                    format!("shared string index {} out of range", index),
                )
            })
        }
        Some("b") => Ok(match raw.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            _ => raw,
        }),
        _ => Ok(raw),
    }
}

/// Converts an A1-style reference into a zero-based `(row, col)` pair.
pub(crate) fn parse_reference(reference: &str) -> Option<(usize, usize)> {
    let letters = reference
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    if letters == 0 {
        return None;
    }
    let (column_part, row_part) = reference.split_at(letters);

    let mut col = 0usize;
    for byte in column_part.bytes() {
        let digit = (byte.to_ascii_uppercase() - b'A' + 1) as usize;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    let row: usize = row_part.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

/// Relationship targets are relative to `xl/` unless they start with `/`.
fn to_zip_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}
