//! Error types for hirelens.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for hirelens operations.
pub type Result<T> = std::result::Result<T, Error>;

const CONVERT_HINT: &str =
    "Please try converting it to DOCX format or supply a text-based PDF.";

/// Error types that can occur during extraction, layout and rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file extension is not one of the supported formats.
    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX file.")]
    UnsupportedFormat(String),

    /// The input exceeds the maximum accepted size.
    #[error("File too large: {size} bytes (maximum {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// The extraction did not finish within the wall-clock budget.
    #[error("File processing timed out after {}s. {}", .0.as_secs(), CONVERT_HINT)]
    ExtractionTimeout(Duration),

    /// A strategy threw or produced unusable output.
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    /// Every strategy ran but the text is below the minimum viable length.
    #[error(
        "Could not extract sufficient text ({chars} characters, at least {min} required). \
         The file might contain only images. {}", CONVERT_HINT
    )]
    InsufficientText { chars: usize, min: usize },

    /// A single atomic layout block is taller than one page.
    #[error("Block of {height:.1}mm cannot fit on a page with {available:.1}mm usable height")]
    LayoutOverflowImpossible { height: f32, available: f32 },

    /// The analysis result does not have the expected shape.
    #[error("Invalid analysis result: {0}")]
    InvalidModel(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error reading a DOCX package.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Error while producing the report artifact.
    #[error("Rendering error: {0}")]
    Render(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Human-readable remediation for failures the user can act on.
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            Error::ExtractionTimeout(_)
            | Error::ExtractionFailed(_)
            | Error::InsufficientText { .. } => Some(CONVERT_HINT),
            Error::FileTooLarge { .. } => Some("Maximum size: 10MB. Please try a smaller file."),
            Error::UnsupportedFormat(_) => Some("Please upload a PDF or DOCX file."),
            _ => None,
        }
    }

    /// Whether this failure should hand over to the next strategy in a plan.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ExtractionFailed(_) | Error::PdfParse(_) | Error::InsufficientText { .. }
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Docx(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Docx(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FileTooLarge {
            size: 11,
            limit: 10,
        };
        assert_eq!(
            err.to_string(),
            "File too large: 11 bytes (maximum 10 bytes)"
        );

        let err = Error::InsufficientText { chars: 12, min: 50 };
        assert!(err.to_string().contains("12 characters"));
        assert!(err.to_string().contains("DOCX"));
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::ExtractionTimeout(Duration::from_secs(30));
        assert!(err.to_string().starts_with("File processing timed out after 30s"));
    }

    #[test]
    fn test_remediation_hint() {
        assert!(Error::ExtractionFailed("x".into())
            .remediation_hint()
            .unwrap()
            .contains("DOCX"));
        assert!(Error::Render("x".into()).remediation_hint().is_none());
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::PdfParse("bad xref".into()).is_recoverable());
        assert!(!Error::UnsupportedFormat("txt".into()).is_recoverable());
        assert!(!Error::ExtractionTimeout(Duration::from_secs(1)).is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
