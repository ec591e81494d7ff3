//! Page-drawing instructions produced by the layout engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::geometry::{PageGeometry, Rect, Rgb};
use super::image::RasterImage;
use super::measure::FontWeight;
use super::options::LayoutStyle;

/// Title printed in every footer.
pub const REPORT_TITLE: &str = "HR Analysis Report";

/// Horizontal anchoring of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// One drawing primitive.
///
/// Multi-line `content` holds already wrapped lines separated by `\n`; each
/// instruction stays on the page it was placed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutInstruction {
    Text {
        content: String,
        font_size: f32,
        weight: FontWeight,
        color: Rgb,
        align: Align,
    },
    SectionHeader {
        title: String,
        underline: bool,
    },
    Bullet {
        content: String,
        indent: f32,
    },
    FilledBox {
        rect: Rect,
        color: Rgb,
    },
    TableRow {
        label: String,
        value: String,
        zebra_stripe: bool,
    },
    Footer {
        page_number: u32,
        total_pages: u32,
    },
    Image {
        rect: Rect,
        image_id: String,
    },
}

impl LayoutInstruction {
    /// Lines of wrapped text content, if any.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            LayoutInstruction::Text { content, .. } | LayoutInstruction::Bullet { content, .. } => {
                content.lines().collect()
            }
            _ => Vec::new(),
        }
    }
}

/// An instruction with its page and anchor position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedInstruction {
    pub page: u32,
    pub x: f32,
    pub y: f32,
    #[serde(flatten)]
    pub instruction: LayoutInstruction,
}

/// A paginated report ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ReportLayout {
    pub geometry: PageGeometry,
    pub style: LayoutStyle,
    pub generated_on: NaiveDate,
    pub total_pages: u32,
    /// Body instructions in document order, followed by one footer per page
    pub instructions: Vec<PlacedInstruction>,
    /// Raster images referenced by `Image` instructions
    pub images: BTreeMap<String, RasterImage>,
}

impl ReportLayout {
    /// Instructions on one page, in emission order.
    pub fn page(&self, page: u32) -> impl Iterator<Item = &PlacedInstruction> {
        self.instructions.iter().filter(move |p| p.page == page)
    }

    pub fn footers(&self) -> impl Iterator<Item = &PlacedInstruction> {
        self.instructions
            .iter()
            .filter(|p| matches!(p.instruction, LayoutInstruction::Footer { .. }))
    }

    /// Footer string shared by every page.
    pub fn footer_text(&self, page_number: u32, total_pages: u32) -> String {
        format!(
            "{} | Page {} of {} | Generated {}",
            REPORT_TITLE,
            page_number,
            total_pages,
            self.generated_on.format("%Y-%m-%d")
        )
    }

    /// All text of the report in emission order, one line per entry.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for placed in &self.instructions {
            match &placed.instruction {
                LayoutInstruction::Text { content, .. } | LayoutInstruction::Bullet { content, .. } => {
                    lines.extend(content.lines().map(str::to_string))
                }
                LayoutInstruction::SectionHeader { title, .. } => lines.push(title.clone()),
                LayoutInstruction::TableRow { label, value, .. } => {
                    lines.push(format!("{}: {}", label, value))
                }
                LayoutInstruction::Footer {
                    page_number,
                    total_pages,
                } => lines.push(self.footer_text(*page_number, *total_pages)),
                LayoutInstruction::FilledBox { .. } | LayoutInstruction::Image { .. } => {}
            }
        }
        lines
    }
}
