//! Pluggable PDF parsing for the primary text strategy.
//!
//! [`PdfTextExtractor`](super::PdfTextExtractor) never touches `lopdf`
//! directly. It asks a [`PdfLoader`] for a [`PdfBackend`] and works on
//! library-neutral [`ContentOp`]s, so the parser can be swapped out in tests
//! or by embedders.

use std::collections::BTreeMap;

use lopdf::{Document, Object};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Content stream operand, reduced to what text extraction reads.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<&Object> for PdfValue {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => PdfValue::Integer(*i),
            Object::Real(r) => PdfValue::Real(*r),
            Object::Name(n) => PdfValue::Name(n.clone()),
            Object::String(bytes, _) => PdfValue::Str(bytes.clone()),
            Object::Array(items) => PdfValue::Array(items.iter().map(PdfValue::from).collect()),
            _ => PdfValue::Other,
        }
    }
}

/// One operator with its operands, in stream order.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// An opened PDF document.
pub trait PdfBackend {
    /// Pages keyed by 1-based page number.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Decoded operations of every content stream of `page`.
    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>>;

    /// Decode a string operand shown with `font_name` on `page`.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Opens PDF bytes into a [`PdfBackend`].
pub trait PdfLoader: Send + Sync {
    fn load(&self, data: &[u8]) -> Result<Box<dyn PdfBackend>>;
}

/// Decode a string with no known font encoding.
///
/// UTF-16BE when it carries a byte order mark, then UTF-8, then Latin-1.
pub fn decode_raw_text(bytes: &[u8]) -> String {
    if let Some(units) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let utf16: Vec<u16> = units
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Default [`PdfLoader`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfLoader;

impl PdfLoader for LopdfLoader {
    fn load(&self, data: &[u8]) -> Result<Box<dyn PdfBackend>> {
        Ok(Box::new(LopdfBackend::from_bytes(data)?))
    }
}

/// [`PdfBackend`] over a parsed `lopdf::Document`.
pub struct LopdfBackend {
    doc: Document,
}

impl LopdfBackend {
    /// Parse `data`; encrypted documents are refused.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::PdfParse("document is password-protected".to_string()));
        }
        Ok(Self { doc })
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>> {
        let content = self.doc.get_and_decode_page_content(page)?;
        Ok(content
            .operations
            .iter()
            .map(|op| {
                let operands = op.operands.iter().map(PdfValue::from).collect();
                ContentOp::new(op.operator.as_str(), operands)
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        let decoded = self
            .doc
            .get_page_fonts(page)
            .ok()
            .and_then(|fonts| {
                let font = fonts.get(font_name)?;
                let encoding = font.get_font_encoding(&self.doc).ok()?;
                Document::decode_text(&encoding, bytes).ok()
            });
        decoded.unwrap_or_else(|| decode_raw_text(bytes))
    }
}
