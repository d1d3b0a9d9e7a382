//! XML helpers for reading workbook parts out of a zip container.

use crate::utils::error::{Result, VoucherError};
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::{BufRead, BufReader, Read, Seek};
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        // <c r="A1"/> 會被展開成 Start + End，處理邏輯只需看一種
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    pub(crate) fn next(&mut self) -> Result<Option<Event<'_>>> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(VoucherError::xml(error)),
        }
    }
}

pub(crate) fn attribute(event: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match event.try_get_attribute(name).map_err(VoucherError::xml)? {
        Some(attribute) => {
            let value = attribute.unescape_value().map_err(VoucherError::xml)?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Looks an attribute up by local name, ignoring any namespace prefix (`r:id` matches `id`).
pub(crate) fn local_attribute(event: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for result in event.attributes() {
        let attribute = result.map_err(VoucherError::xml)?;
        if attribute.key.local_name().as_ref() == local {
            let value = attribute.unescape_value().map_err(VoucherError::xml)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Appends an entity or character reference (`&amp;`, `&#x4E2D;`) to `text`.
pub(crate) fn push_reference(text: &mut String, reference: &BytesRef<'_>) -> Result<()> {
    let raw: Cow<'_, str> = reference.xml_content().map_err(VoucherError::xml)?;
    if let Some(number) = raw.strip_prefix('#') {
        let code = if let Some(hex) = number.strip_prefix('x') {
            u32::from_str_radix(hex, 16)
        } else {
            number.parse::<u32>()
        }
        .map_err(VoucherError::xml)?;
        if let Some(character) = char::from_u32(code) {
            text.push(character);
        }
    } else if let Some(entity) = resolve_xml_entity(&raw) {
        text.push_str(entity);
    } else {
        return Err(VoucherError::XmlError {
            message: format!("unknown entity '&{};'", raw),
        });
    }
    Ok(())
}

pub(crate) trait ZipXmlExt<R: Read + Seek> {
    /// 以不分大小寫、不分路徑分隔符的方式尋找壓縮檔中的 XML 檔
    fn xml_reader(&mut self, name: &str) -> Result<Option<XmlReader<BufReader<ZipFile<'_, R>>>>>;
}

impl<R: Read + Seek> ZipXmlExt<R> for ZipArchive<R> {
    fn xml_reader(&mut self, name: &str) -> Result<Option<XmlReader<BufReader<ZipFile<'_, R>>>>> {
        let pattern = name.replace('\\', "/");
        let path = self
            .file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(*file_name))
            .map(str::to_owned);

        let Some(path) = path else {
            return Ok(None);
        };
        match self.by_name(&path) {
            Ok(file) => Ok(Some(XmlReader::new(BufReader::new(file)))),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}
