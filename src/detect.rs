//! Input format detection.
//!
//! The file extension decides which extraction plan runs; the byte signature
//! is only inspected to warn about mislabelled uploads.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Pdf,
    Docx,
}

impl SourceFormat {
    /// Canonical lowercase extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Docx => "docx",
        }
    }

    /// Resolve a format from an extension (case-insensitive, leading dot allowed).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceFormat::Pdf),
            "docx" => Some(SourceFormat::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Docx => "DOCX",
        })
    }
}

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

/// What the leading bytes of a file look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Pdf(PdfHeader),
    /// ZIP local file header, as used by OOXML packages.
    Zip,
    Unknown,
}

impl Signature {
    /// Whether the signature is plausible for the given format.
    pub fn matches(&self, format: SourceFormat) -> bool {
        matches!(
            (self, format),
            (Signature::Pdf(_), SourceFormat::Pdf) | (Signature::Zip, SourceFormat::Docx)
        )
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Result of sniffing an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    pub format: SourceFormat,
    pub signature: Signature,
}

/// Select the source format from a file name, checking the signature of `head`.
///
/// `head` may be empty when the contents have not been read yet.
pub fn sniff(name: &str, head: &[u8]) -> Result<Sniffed> {
    let format = format_from_name(name)?;
    let signature = detect_signature(head);

    if !head.is_empty() && !signature.matches(format) {
        log::warn!(
            "{} has a .{} extension but its bytes look like {:?}",
            name,
            format.extension(),
            signature
        );
    }

    Ok(Sniffed { format, signature })
}

/// Resolve the format from a file name's extension.
pub fn format_from_name(name: &str) -> Result<SourceFormat> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    SourceFormat::from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))
}

/// Classify the leading bytes of a file.
pub fn detect_signature(data: &[u8]) -> Signature {
    if let Some(header) = parse_pdf_header(data) {
        return Signature::Pdf(header);
    }
    if data.starts_with(ZIP_MAGIC) {
        return Signature::Zip;
    }
    Signature::Unknown
}

/// Parse the `%PDF-x.y` header.
pub fn parse_pdf_header(data: &[u8]) -> Option<PdfHeader> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return None;
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    is_valid_version(&version).then_some(PdfHeader { version })
}

fn is_valid_version(version: &str) -> bool {
    let chars: Vec<char> = version.chars().collect();
    chars.len() == 3 && chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if bytes carry a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    parse_pdf_header(data).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_name() {
        assert_eq!(format_from_name("cv.pdf").unwrap(), SourceFormat::Pdf);
        assert_eq!(format_from_name("CV.PDF").unwrap(), SourceFormat::Pdf);
        assert_eq!(format_from_name("resume.final.Docx").unwrap(), SourceFormat::Docx);
    }

    #[test]
    fn test_unsupported_extensions() {
        assert!(matches!(
            format_from_name("resume.doc"),
            Err(Error::UnsupportedFormat(ext)) if ext == "doc"
        ));
        assert!(matches!(
            format_from_name("resume"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            format_from_name("notes.txt"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_detect_signature() {
        assert_eq!(
            detect_signature(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3"),
            Signature::Pdf(PdfHeader {
                version: "1.7".into()
            })
        );
        assert_eq!(detect_signature(b"PK\x03\x04\x14\x00"), Signature::Zip);
        assert_eq!(detect_signature(b"<!DOCTYPE html>"), Signature::Unknown);
        assert_eq!(detect_signature(b"%PDF"), Signature::Unknown);
    }

    #[test]
    fn test_sniff_keeps_extension_on_mismatch() {
        let sniffed = sniff("resume.pdf", b"PK\x03\x04rest").unwrap();
        assert_eq!(sniffed.format, SourceFormat::Pdf);
        assert_eq!(sniffed.signature, Signature::Zip);
        assert!(!sniffed.signature.matches(sniffed.format));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("10.0"));
        assert!(!is_valid_version("abc"));
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
