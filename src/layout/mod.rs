//! Paginated report layout.
//!
//! [`LayoutEngine`] turns a [`ReportModel`](crate::model::ReportModel) into a
//! [`ReportLayout`]: page-tagged drawing instructions in document order,
//! followed by one footer per page.

mod cursor;
mod engine;
mod geometry;
mod image;
mod instruction;
mod measure;
mod options;

pub use cursor::PageCursor;
pub use engine::{
    LayoutEngine, BULLET_INDENT, BULLET_TEXT_OFFSET, FINAL_RESERVE, HEADER_RESERVE,
    LINE_HEIGHT_FACTOR, LINE_RESERVE, TABLE_ROW_HEIGHT,
};
pub use geometry::{PageGeometry, Rect, Rgb, A4_HEIGHT_MM, A4_WIDTH_MM, DEFAULT_MARGIN_MM};
pub use image::{ChartImage, CompetencyChart, ImageProducer, RasterImage};
pub use instruction::{Align, LayoutInstruction, PlacedInstruction, ReportLayout, REPORT_TITLE};
pub use measure::{wrap_text, FontWeight, HelveticaMetrics, TextMeasure, MM_PER_PT};
pub use options::{LayoutOptions, LayoutStyle, OverflowPolicy};
