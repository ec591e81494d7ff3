//! Rendering of laid-out reports into downloadable artifacts.
//!
//! A [`ReportRenderer`] consumes a [`ReportLayout`] in instruction order and
//! produces the bytes of one output format.
//!
//! # Example
//!
//! ```no_run
//! use hirelens::layout::{LayoutEngine, LayoutOptions};
//! use hirelens::model::ReportModel;
//! use hirelens::render::{OutputFormat, RenderedReport};
//!
//! fn main() -> hirelens::Result<()> {
//!     let model = ReportModel::from_json(r#"{"summary": "Strong backend profile"}"#)?;
//!     let layout = LayoutEngine::new(LayoutOptions::default()).render(&model)?;
//!     let report = RenderedReport::render(OutputFormat::Pdf.renderer().as_ref(), &layout)?;
//!     std::fs::write(&report.filename, &report.bytes)?;
//!     Ok(())
//! }
//! ```

mod json;
mod pdf;
mod text;

pub use json::{to_json, JsonFormat, JsonReportRenderer};
pub use pdf::{encode_win_ansi, PdfReportRenderer};
pub use text::TextReportRenderer;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::layout::ReportLayout;

/// Filename prefix of every rendered report.
pub const REPORT_FILE_PREFIX: &str = "hr-analysis-report";

/// `hr-analysis-report-YYYY-MM-DD.<ext>`
pub fn report_filename(date: NaiveDate, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        REPORT_FILE_PREFIX,
        date.format("%Y-%m-%d"),
        extension.trim_start_matches('.')
    )
}

/// Trait for report renderers.
///
/// Implementations must consume instructions in the order given; only the
/// trailing footers may be drawn out of band.
pub trait ReportRenderer: Send + Sync {
    /// Short name of this renderer.
    fn name(&self) -> &str;

    /// File extension without the leading dot.
    fn extension(&self) -> &str;

    /// MIME type of the output.
    fn mime_type(&self) -> &'static str;

    /// Render the whole layout to bytes.
    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>>;
}

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Paginated PDF document
    #[default]
    Pdf,

    /// Plain text preview
    Text,

    /// JSON instruction dump
    Json,
}

impl OutputFormat {
    /// Renderer with default settings for this format.
    pub fn renderer(&self) -> Box<dyn ReportRenderer> {
        match self {
            OutputFormat::Pdf => Box::new(PdfReportRenderer::new()),
            OutputFormat::Text => Box::new(TextReportRenderer::new()),
            OutputFormat::Json => Box::new(JsonReportRenderer::new(JsonFormat::Pretty)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Render(format!("unknown output format: {}", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        })
    }
}

/// A rendered report ready to be written or streamed.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Suggested download name
    pub filename: String,

    /// MIME type of `bytes`
    pub mime_type: &'static str,

    /// Number of pages in the source layout
    pub page_count: u32,

    pub bytes: Vec<u8>,
}

impl RenderedReport {
    /// Render `layout` and name the result after its generation date.
    pub fn render(renderer: &dyn ReportRenderer, layout: &ReportLayout) -> Result<Self> {
        let bytes = renderer.render(layout)?;
        log::debug!(
            "{} renderer produced {} bytes for {} pages",
            renderer.name(),
            bytes.len(),
            layout.total_pages
        );
        Ok(Self {
            filename: report_filename(layout.generated_on, renderer.extension()),
            mime_type: renderer.mime_type(),
            page_count: layout.total_pages,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
