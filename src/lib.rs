//! # hirelens
//!
//! Resume text extraction and HR analysis report layout.
//!
//! The crate has two halves. [`extract`] turns an uploaded PDF or DOCX resume
//! into plain text under a size limit and a deadline, trying a primary and a
//! fallback strategy in order. [`layout`] places a structured candidate
//! analysis onto fixed-size pages, and [`render`] turns the laid-out pages
//! into a PDF, a text preview or a JSON dump.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hirelens::{extract_file, Hirelens};
//!
//! fn main() -> hirelens::Result<()> {
//!     // Extract resume text
//!     let resume = extract_file("resume.pdf")?;
//!     println!("{} characters via {}", resume.char_count, resume.strategy_used);
//!
//!     // Lay out an analysis returned by the model
//!     let analysis = std::fs::read_to_string("analysis.json")?;
//!     let report = Hirelens::new().analysis(&analysis)?;
//!     std::fs::write(report.filename("pdf"), report.to_pdf()?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ordered strategies**: text layer first, raw stream scan as fallback
//! - **Limits**: 10 MiB input, 30 s extraction deadline, 50 meaningful chars
//! - **Progress**: monotone percentages over a channel
//! - **Deterministic layout**: same model and date give the same pages
//! - **Async**: `extract_async` behind the `async` feature

pub mod detect;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

pub use detect::{detect_signature, is_pdf_bytes, sniff, SourceFormat};
pub use error::{Error, Result};
pub use extract::{
    CancelToken, ExtractOptions, ExtractedDocument, ExtractionPlan, ExtractionSupervisor,
    InputFile, ProgressEvent, ProgressStage, Strategy, TextExtractor,
};
pub use layout::{
    CompetencyChart, ImageProducer, LayoutEngine, LayoutInstruction, LayoutOptions,
    OverflowPolicy, PageGeometry, PlacedInstruction, ReportLayout,
};
pub use model::{
    overall_score, parse_analysis_response, CalloutColor, RecommendationTier, ReportModel,
};
pub use render::{
    report_filename, JsonFormat, OutputFormat, PdfReportRenderer, RenderedReport,
    ReportRenderer, TextReportRenderer,
};

/// Extract resume text from a file with default limits.
///
/// # Example
///
/// ```no_run
/// use hirelens::extract_file;
///
/// let doc = extract_file("resume.docx").unwrap();
/// println!("{}", doc.text);
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument> {
    ExtractionSupervisor::new(ExtractOptions::default()).extract_path(path)
}

/// Extract resume text from an in-memory upload.
///
/// `name` is the original filename; its extension selects the format.
pub fn extract_bytes(name: &str, bytes: Vec<u8>) -> Result<ExtractedDocument> {
    ExtractionSupervisor::new(ExtractOptions::default()).extract_bytes(name, bytes)
}

/// Lay out `model` with default options and render it with `renderer`.
pub fn render_report(
    model: &ReportModel,
    renderer: &dyn ReportRenderer,
) -> Result<RenderedReport> {
    let layout = LayoutEngine::default().render(model)?;
    RenderedReport::render(renderer, &layout)
}

/// Builder for report generation.
///
/// # Example
///
/// ```no_run
/// use hirelens::{Hirelens, OverflowPolicy};
///
/// let json = std::fs::read_to_string("analysis.json")?;
/// let pdf = Hirelens::new()
///     .with_overflow(OverflowPolicy::Fail)
///     .with_charts()
///     .analysis(&json)?
///     .to_pdf()?;
/// # Ok::<(), hirelens::Error>(())
/// ```
pub struct Hirelens {
    layout_options: LayoutOptions,
    images: Option<Arc<dyn ImageProducer>>,
}

impl Hirelens {
    /// Create a builder with default layout options.
    pub fn new() -> Self {
        Self {
            layout_options: LayoutOptions::default(),
            images: None,
        }
    }

    /// Set the date printed on the report.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.layout_options = self.layout_options.with_date(date);
        self
    }

    /// Set page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.layout_options = self.layout_options.with_geometry(geometry);
        self
    }

    /// Set the overflow policy.
    pub fn with_overflow(mut self, policy: OverflowPolicy) -> Self {
        self.layout_options = self.layout_options.with_overflow(policy);
        self
    }

    /// Add the built-in competency chart.
    pub fn with_charts(self) -> Self {
        self.with_image_producer(Arc::new(CompetencyChart::default()))
    }

    /// Use a custom chart producer.
    pub fn with_image_producer(mut self, producer: Arc<dyn ImageProducer>) -> Self {
        self.images = Some(producer);
        self
    }

    fn engine(&self) -> LayoutEngine {
        let engine = LayoutEngine::new(self.layout_options.clone());
        match &self.images {
            Some(producer) => engine.with_image_producer(producer.clone()),
            None => engine,
        }
    }

    /// Lay out a validated model.
    pub fn layout(&self, model: &ReportModel) -> Result<ReportResult> {
        model.validate()?;
        let layout = self.engine().render(model)?;
        Ok(ReportResult { layout })
    }

    /// Parse raw model output, validate it and lay it out.
    pub fn analysis(&self, response: &str) -> Result<ReportResult> {
        let model = parse_analysis_response(response)?;
        let layout = self.engine().render(&model)?;
        Ok(ReportResult { layout })
    }
}

impl Default for Hirelens {
    fn default() -> Self {
        Self::new()
    }
}

/// A laid-out report.
#[derive(Debug, Clone)]
pub struct ReportResult {
    /// The paginated layout
    pub layout: ReportLayout,
}

impl ReportResult {
    /// Render to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        PdfReportRenderer::new().render(&self.layout)
    }

    /// Render a plain text preview.
    pub fn to_text(&self) -> String {
        TextReportRenderer::new().to_text(&self.layout)
    }

    /// Dump the layout instructions as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.layout, format)
    }

    /// Render with the given format.
    pub fn render(&self, format: OutputFormat) -> Result<RenderedReport> {
        RenderedReport::render(format.renderer().as_ref(), &self.layout)
    }

    /// Download name for `extension`.
    pub fn filename(&self, extension: &str) -> String {
        report_filename(self.layout.generated_on, extension)
    }

    pub fn page_count(&self) -> u32 {
        self.layout.total_pages
    }
}
