//! DOCX strategy: raw text of the main document part.
//!
//! DOCX files are ZIP archives; the body lives in `word/document.xml`.
//! Text runs (`w:t`) are concatenated in document order, tabs and breaks
//! become whitespace, and every paragraph ends with a blank line.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};

use super::{CancelToken, Strategy, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the decompressed size of the document part.
const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

/// Reads the raw text of a DOCX package.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTextExtractor;

impl DocxTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocxTextExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Docx
    }

    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String> {
        let xml = read_document_part(bytes)
            .map_err(|e| Error::ExtractionFailed(format!("Failed to extract text from DOCX file: {}", e)))?;
        cancel.check()?;
        document_text(&xml)
            .map_err(|e| Error::ExtractionFailed(format!("Failed to extract text from DOCX file: {}", e)))
    }
}

fn read_document_part(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let part = archive.by_name(DOCUMENT_PART)?;

    let mut xml = Vec::new();
    part.take(MAX_DOCUMENT_XML_BYTES).read_to_end(&mut xml)?;
    if xml.len() as u64 >= MAX_DOCUMENT_XML_BYTES {
        return Err(Error::Docx(format!("{} exceeds size limit", DOCUMENT_PART)));
    }
    Ok(xml)
}

/// Concatenate the text nodes of a WordprocessingML body.
pub fn document_text(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape()?;
                out.push_str(&text);
            }
            Event::CData(t) if in_text => {
                out.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
