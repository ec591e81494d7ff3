//! Fallback PDF strategy: heuristic byte scrubbing.
//!
//! Used when the text layer cannot be recovered. The scrubber keeps
//! printable-ASCII runs from the raw file, so on compressed or binary PDFs it
//! can yield plausible-looking but wrong text. That gap is known and kept as-is;
//! [`meaningful_char_count`] only guards against accepting pure PDF syntax.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

use super::cleanup::{collapse_all_whitespace, collapse_repeated_chars, strip_non_printable};
use super::options::NOISE_REPEAT_RUN;
use super::{CancelToken, Strategy, TextExtractor};

const SCAN_CHUNK: usize = 64 * 1024;

/// Words that are PDF file syntax rather than document text.
const PDF_VOCABULARY: &[&str] = &[
    // file structure
    "obj", "endobj", "stream", "endstream", "xref", "trailer", "startxref", "EOF", "null",
    "true", "false", "PDF", "ID", "Root", "Size", "Info", "Prev", "Encrypt", "Linearized",
    // dictionaries
    "Type", "Catalog", "Pages", "Page", "Kids", "Count", "Parent", "MediaBox", "CropBox",
    "BleedBox", "TrimBox", "ArtBox", "Rotate", "Contents", "Resources", "ProcSet", "Text",
    "ImageB", "ImageC", "ImageI", "Font", "Subtype", "Type0", "Type1", "Type3", "TrueType",
    "CIDFontType0", "CIDFontType2", "BaseFont", "Encoding", "WinAnsiEncoding",
    "MacRomanEncoding", "StandardEncoding", "Identity-H", "Identity-V", "DescendantFonts",
    "FontDescriptor", "FontName", "FontFile", "FontFile2", "FontFile3", "FontBBox", "Flags",
    "ItalicAngle", "Ascent", "Descent", "CapHeight", "StemV", "FirstChar", "LastChar",
    "Widths", "ToUnicode", "CIDSystemInfo", "Registry", "Ordering", "Supplement", "Helvetica",
    "Helvetica-Bold", "Times-Roman", "Courier", "XObject", "Image", "Form", "Width", "Height",
    "ColorSpace", "DeviceRGB", "DeviceGray", "DeviceCMYK", "ICCBased", "Indexed",
    "BitsPerComponent", "Filter", "FlateDecode", "DCTDecode", "JPXDecode", "LZWDecode",
    "ASCIIHexDecode", "ASCII85Decode", "DecodeParms", "Predictor", "Columns", "Length",
    "Length1", "Length2", "Length3", "ExtGState", "Pattern", "Shading", "Annots", "Annot",
    "Link", "Rect", "Border", "URI", "Dest", "Outlines", "First", "Last", "Next", "Title",
    "Producer", "Creator", "CreationDate", "ModDate", "Metadata", "XML", "StructTreeRoot",
    "MarkInfo", "Marked", "Lang", "ObjStm", "XRef", "Index", "BBox", "Matrix", "Group",
    "Transparency", "CS", "SMask", "Mask", "Decode", "Interpolate",
    // content stream operators
    "BT", "ET", "Tf", "Td", "TD", "Tm", "Tj", "TJ", "Tc", "Tw", "Tz", "TL", "Tr", "Ts", "cm",
    "re", "Do", "gs", "rg", "RG", "cs", "sc", "scn", "SC", "SCN", "BDC", "BMC", "EMC", "MCID",
    "BI", "ID", "EI", "sh", "Tx", "f", "n",
];

/// Reference markers and resource prefixes that only appear glued to keys.
const GLUE_TOKENS: &[&str] = &["R", "Im", "F", "Fm", "GS", "P"];

static RESOURCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]{1,4}\d+(?:[._-]\d+)*|PDF-\d\.\d|R\d*)$").unwrap());

/// Keeps printable-ASCII runs from the raw bytes of a PDF.
#[derive(Debug, Clone)]
pub struct PdfFallbackExtractor {
    noise_repeat_run: usize,
    min_text_chars: usize,
}

impl PdfFallbackExtractor {
    pub fn new() -> Self {
        Self {
            noise_repeat_run: NOISE_REPEAT_RUN,
            min_text_chars: super::options::MIN_TEXT_CHARS,
        }
    }

    /// Set the noise-suppression run length.
    pub fn with_noise_repeat_run(mut self, run: usize) -> Self {
        self.noise_repeat_run = run.max(1);
        self
    }

    /// Set the length a literal decode must exceed to be taken verbatim.
    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    /// The bytes decoded as text, if they are plain text rather than a PDF wrapper.
    fn literal_decode(&self, bytes: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(bytes);
        if text.trim().chars().count() > self.min_text_chars && !text.contains("%PDF") {
            Some(text.into_owned())
        } else {
            None
        }
    }

    fn scrub(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String> {
        let mut kept = String::with_capacity(bytes.len() / 2);

        // The final byte is never inspected.
        let scanned = &bytes[..bytes.len().saturating_sub(1)];
        for chunk in scanned.chunks(SCAN_CHUNK) {
            cancel.check()?;
            kept.extend(chunk.iter().map(|&b| b as char).filter(|&c| is_kept(c)));
        }

        let text = strip_non_printable(&kept);
        let text = collapse_all_whitespace(&text);
        let text = collapse_repeated_chars(&text, self.noise_repeat_run);
        Ok(text.trim().to_string())
    }
}

impl Default for PdfFallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfFallbackExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::FallbackPdf
    }

    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String> {
        if let Some(text) = self.literal_decode(bytes) {
            log::info!("PDF extracted as plain text");
            return Ok(text);
        }

        let text = self.scrub(bytes, cancel)?;
        if text.is_empty() {
            return Err(Error::ExtractionFailed(
                "could not extract readable text from PDF using basic method".to_string(),
            ));
        }

        // Short output is returned as-is; acceptance decides.
        log::info!("Extracted {} characters from PDF using basic method", text.len());
        Ok(text)
    }

    fn accepts(&self, text: &str, min_chars: usize) -> bool {
        meaningful_char_count(text) >= min_chars
    }
}

/// Byte filter of the scrubber: alphanumerics, whitespace and common punctuation.
fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_ascii_whitespace()
        || c == '\x0B'
        || c == '\u{00A0}'
        || matches!(
            c,
            '.' | ',' | '!' | '?' | '@' | '#' | '$' | '%' | '^' | '&' | '*' | '(' | ')' | '-'
                | '_' | '+' | '='
        )
}

/// Characters of the text that do not belong to PDF syntax.
///
/// Drops bare numbers, operators, dictionary keys and resource names such as
/// `F1` or `Im3`, then counts what is left (words joined by single spaces).
pub fn meaningful_char_count(text: &str) -> usize {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|w| is_meaningful_word(w))
        .collect();

    if words.is_empty() {
        return 0;
    }
    words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len() - 1
}

fn is_meaningful_word(word: &str) -> bool {
    word.chars().count() >= 2
        && word.chars().any(|c| c.is_alphabetic())
        && !PDF_VOCABULARY.contains(&word)
        && !RESOURCE_NAME.is_match(word)
        && !is_syntax_run(word)
}

/// Dictionary keys glued together once delimiters are dropped,
/// e.g. `TypeXObjectSubtypeImage` or `RResourcesXObjectIm1`.
fn is_syntax_run(word: &str) -> bool {
    if !word.is_ascii() {
        return false;
    }
    let bytes = word.as_bytes();
    // reachable[i]: bytes[..i] splits into vocabulary, reference and number pieces.
    let mut reachable = vec![false; bytes.len() + 1];
    reachable[0] = true;

    for start in 0..bytes.len() {
        if !reachable[start] {
            continue;
        }
        let rest = &word[start..];

        let digits = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        if digits > 0 {
            reachable[start + digits] = true;
        }
        for token in PDF_VOCABULARY.iter().chain(GLUE_TOKENS) {
            if rest.starts_with(token) {
                reachable[start + token.len()] = true;
            }
        }
    }

    reachable[bytes.len()]
}
