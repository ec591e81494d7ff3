//! Report layout engine.
//!
//! Walks the report sections in a fixed order and places every block on a
//! page through a [`PageCursor`]. Blocks never split across pages: a block
//! that does not fit moves whole to the next page. Footers are emitted in a
//! final pass once the page count is known.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{
    format_percent, overall_score, CalloutColor, Competency, ExperienceYears, RecommendationTier,
    ReportModel,
};

use super::cursor::PageCursor;
use super::geometry::{Rect, Rgb};
use super::image::{ImageProducer, RasterImage};
use super::instruction::{Align, LayoutInstruction, PlacedInstruction, ReportLayout, REPORT_TITLE};
use super::measure::{wrap_text, FontWeight, HelveticaMetrics, TextMeasure};
use super::options::{LayoutOptions, OverflowPolicy};

/// Break before a section header when `write_y` is past `page_height` minus this.
pub const HEADER_RESERVE: f32 = 40.0;
/// Break before a text line when `write_y` is past `page_height` minus this.
pub const LINE_RESERVE: f32 = 20.0;
/// Room kept free before the final recommendation.
pub const FINAL_RESERVE: f32 = 40.0;

/// Line height per point of font size.
pub const LINE_HEIGHT_FACTOR: f32 = 0.5;
pub const TABLE_ROW_HEIGHT: f32 = 8.0;
pub const BULLET_INDENT: f32 = 5.0;
/// Space between a bullet glyph and its text.
pub const BULLET_TEXT_OFFSET: f32 = 5.0;

const TITLE_BAND_HEIGHT: f32 = 40.0;
const CONTENT_START_Y: f32 = 50.0;
const SECTION_HEADER_ADVANCE: f32 = 10.0;
const PARAGRAPH_GAP: f32 = 5.0;
const DETAIL_GAP: f32 = 3.0;
const BULLET_GAP: f32 = 3.0;
const SECTION_GAP: f32 = 3.0;
const TABLE_GAP: f32 = 6.0;
const SCORE_BOX_HEIGHT: f32 = 30.0;
const CALLOUT_MIN_HEIGHT: f32 = 20.0;
const CALLOUT_PADDING: f32 = 10.0;
const BOX_GAP: f32 = 8.0;
const FOOTER_OFFSET: f32 = 10.0;
const ELLIPSIS: &str = "...";

const NOT_SPECIFIED: &str = "Not specified";

/// Lays out a [`ReportModel`] into paginated instructions.
pub struct LayoutEngine {
    options: LayoutOptions,
    measure: Arc<dyn TextMeasure>,
    images: Option<Arc<dyn ImageProducer>>,
}

impl LayoutEngine {
    /// Create an engine measuring text with Helvetica metrics.
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            measure: Arc::new(HelveticaMetrics),
            images: None,
        }
    }

    /// Substitute the text measurement.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// Supply charts for the "Visual Analysis" section.
    pub fn with_image_producer(mut self, producer: Arc<dyn ImageProducer>) -> Self {
        self.images = Some(producer);
        self
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out every section of the report.
    pub fn render(&self, model: &ReportModel) -> Result<ReportLayout> {
        let mut run = LayoutRun::new(self);
        let overall = overall_score(model);
        let tier = RecommendationTier::from_score(overall);

        run.title_band();

        run.section_header("Executive Summary");
        run.paragraph(or_fallback(&model.summary, "No summary available."))?;
        run.section_gap();

        run.section_header("Overall Assessment");
        run.score_box(overall, tier);

        run.section_header("Key Metrics");
        run.metrics_table(model);

        if self.options.include_visuals {
            if let Some(producer) = &self.images {
                run.visual_analysis(producer.as_ref(), model)?;
            }
        }

        run.bullet_section("Strengths", &model.strengths, "No specific strengths identified.")?;
        run.bullet_section(
            "Areas for Improvement",
            &model.weaknesses,
            "No specific areas for improvement identified.",
        )?;

        run.section_header("Skills Breakdown");
        run.paragraph(&skills_line(&model.skills))?;
        run.section_gap();

        run.recommendations(model)?;

        if !model.cultural_fit_indicators.is_empty() {
            run.bullet_section("Cultural Fit", &model.cultural_fit_indicators, "")?;
        }

        let red_flags = model.visible_red_flags();
        if !red_flags.is_empty() {
            run.section_header("Red Flags");
            for flag in red_flags {
                run.bullet(flag)?;
            }
            run.section_gap();
        }

        if !model.next_steps.is_empty() {
            run.bullet_section("Next Steps", &model.next_steps, "")?;
        }

        run.final_recommendation(model, tier)?;

        Ok(run.finish())
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

/// State of one layout pass.
struct LayoutRun<'a> {
    options: &'a LayoutOptions,
    measure: &'a dyn TextMeasure,
    cursor: PageCursor,
    out: Vec<PlacedInstruction>,
    images: BTreeMap<String, RasterImage>,
}

impl<'a> LayoutRun<'a> {
    fn new(engine: &'a LayoutEngine) -> Self {
        Self {
            options: &engine.options,
            measure: engine.measure.as_ref(),
            cursor: PageCursor::new(engine.options.geometry),
            out: Vec::new(),
            images: BTreeMap::new(),
        }
    }

    fn push(&mut self, x: f32, y: f32, instruction: LayoutInstruction) {
        self.out.push(PlacedInstruction {
            page: self.cursor.page_index,
            x,
            y,
            instruction,
        });
    }

    fn content_width(&self) -> f32 {
        self.cursor.content_width()
    }

    fn margin(&self) -> f32 {
        self.cursor.margin
    }

    // -- primitives ---------------------------------------------------------

    /// Full-width band with the report title; drawn before any dynamic content.
    fn title_band(&mut self) {
        let style = self.options.style;
        let width = self.cursor.page_width;
        let center = width / 2.0;

        self.push(
            0.0,
            0.0,
            LayoutInstruction::FilledBox {
                rect: Rect::new(0.0, 0.0, width, TITLE_BAND_HEIGHT),
                color: Rgb::BRAND,
            },
        );
        self.push(
            center,
            20.0,
            LayoutInstruction::Text {
                content: REPORT_TITLE.to_string(),
                font_size: style.title_size,
                weight: FontWeight::Bold,
                color: Rgb::WHITE,
                align: Align::Center,
            },
        );
        self.push(
            center,
            30.0,
            LayoutInstruction::Text {
                content: format!(
                    "Candidate Assessment | {}",
                    self.options.generated_on.format("%B %-d, %Y")
                ),
                font_size: style.subtitle_size,
                weight: FontWeight::Regular,
                color: Rgb::WHITE,
                align: Align::Center,
            },
        );

        self.cursor.write_y = CONTENT_START_Y;
    }

    fn section_header(&mut self, title: &str) {
        self.cursor.break_if_past(HEADER_RESERVE);
        let (x, y) = (self.margin(), self.cursor.write_y);
        self.push(
            x,
            y,
            LayoutInstruction::SectionHeader {
                title: title.to_string(),
                underline: true,
            },
        );
        self.cursor.advance(SECTION_HEADER_ADVANCE);
    }

    fn section_gap(&mut self) {
        self.cursor.advance(SECTION_GAP);
    }

    /// Reserve room for a wrapped block and return its anchor y.
    ///
    /// Applies the line threshold, moves the whole block to a new page when it
    /// does not fit, and enforces the overflow policy for blocks taller than
    /// a page.
    fn place_lines(
        &mut self,
        mut lines: Vec<String>,
        font_size: f32,
        weight: FontWeight,
        max_width: f32,
        gap: f32,
    ) -> Result<(f32, String)> {
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let available = self.options.geometry.usable_height();
        let max_lines = ((available / line_height).floor() as usize).max(1);

        if lines.len() > max_lines {
            let height = line_height * lines.len() as f32;
            match self.options.overflow {
                OverflowPolicy::Fail => {
                    return Err(Error::LayoutOverflowImpossible { height, available })
                }
                OverflowPolicy::Truncate => {
                    log::warn!(
                        "block of {} lines exceeds a page, truncating to {}",
                        lines.len(),
                        max_lines
                    );
                    lines.truncate(max_lines);
                    if let Some(last) = lines.last_mut() {
                        *last = self.ellipsize(last, font_size, weight, max_width);
                    }
                }
            }
        }

        let block_height = line_height * lines.len() as f32;
        self.cursor.break_if_past(LINE_RESERVE);
        self.cursor.ensure_fits(block_height);

        let y = self.cursor.write_y;
        self.cursor.advance(block_height + gap);
        Ok((y, lines.join("\n")))
    }

    /// Append an ellipsis, dropping trailing characters until it fits.
    fn ellipsize(&self, line: &str, font_size: f32, weight: FontWeight, max_width: f32) -> String {
        let mut base = line.trim_end().to_string();
        loop {
            let candidate = format!("{}{}", base, ELLIPSIS);
            if base.is_empty() || self.measure.width(&candidate, font_size, weight) <= max_width {
                return candidate;
            }
            base.pop();
        }
    }

    fn text_block(
        &mut self,
        text: &str,
        font_size: f32,
        weight: FontWeight,
        color: Rgb,
        gap: f32,
    ) -> Result<()> {
        let width = self.content_width();
        let lines = wrap_text(self.measure, text, width, font_size, weight);
        if lines.is_empty() {
            return Ok(());
        }

        let (y, content) = self.place_lines(lines, font_size, weight, width, gap)?;
        let x = self.margin();
        self.push(
            x,
            y,
            LayoutInstruction::Text {
                content,
                font_size,
                weight,
                color,
                align: Align::Left,
            },
        );
        Ok(())
    }

    fn paragraph(&mut self, text: &str) -> Result<()> {
        let size = self.options.style.body_size;
        self.text_block(text, size, FontWeight::Regular, Rgb::TEXT, PARAGRAPH_GAP)
    }

    fn bullet(&mut self, text: &str) -> Result<()> {
        let size = self.options.style.body_size;
        let width = self.content_width() - BULLET_INDENT - BULLET_TEXT_OFFSET;
        let lines = wrap_text(self.measure, text, width, size, FontWeight::Regular);
        if lines.is_empty() {
            return Ok(());
        }

        let (y, content) = self.place_lines(lines, size, FontWeight::Regular, width, BULLET_GAP)?;
        let x = self.margin();
        self.push(
            x,
            y,
            LayoutInstruction::Bullet {
                content,
                indent: BULLET_INDENT,
            },
        );
        Ok(())
    }

    /// Header plus one bullet per entry, or `empty` as a paragraph.
    fn bullet_section(&mut self, title: &str, items: &[String], empty: &str) -> Result<()> {
        self.section_header(title);
        if items.iter().all(|s| s.trim().is_empty()) {
            self.paragraph(empty)?;
        } else {
            for item in items {
                self.bullet(item)?;
            }
        }
        self.section_gap();
        Ok(())
    }

    /// Filled box with centered white lines, kept whole on one page.
    fn callout(&mut self, height: f32, color: Rgb, lines: Vec<(String, f32, FontWeight, f32)>) {
        self.cursor.ensure_fits(height);
        let rect = Rect::new(self.margin(), self.cursor.write_y, self.content_width(), height);

        self.push(rect.x, rect.y, LayoutInstruction::FilledBox { rect, color });
        for (content, font_size, weight, offset) in lines {
            self.push(
                rect.center_x(),
                rect.y + offset,
                LayoutInstruction::Text {
                    content,
                    font_size,
                    weight,
                    color: Rgb::WHITE,
                    align: Align::Center,
                },
            );
        }
        self.cursor.advance(height + BOX_GAP);
    }

    // -- sections -----------------------------------------------------------

    fn score_box(&mut self, overall: u8, tier: RecommendationTier) {
        let style = self.options.style;
        self.callout(
            SCORE_BOX_HEIGHT,
            callout_rgb(CalloutColor::from_tier(tier)),
            vec![
                (
                    format!("Overall Score: {}%", overall),
                    style.score_size,
                    FontWeight::Bold,
                    13.0,
                ),
                (tier.label().to_string(), style.body_size + 2.0, FontWeight::Regular, 23.0),
            ],
        );
    }

    /// Eight label/value rows; even-indexed rows get a zebra stripe.
    fn metrics_table(&mut self, model: &ReportModel) {
        let mut rows = vec![(
            "Match Score".to_string(),
            format_percent(model.match_score_or_default()),
        )];
        rows.extend(Competency::ALL.iter().map(|c| {
            (
                c.label().to_string(),
                format_percent(model.competency_or_default(*c)),
            )
        }));
        rows.push(("Experience".to_string(), experience_label(model)));

        for (index, (label, value)) in rows.into_iter().enumerate() {
            self.cursor.ensure_fits(TABLE_ROW_HEIGHT);
            let (x, y) = (self.margin(), self.cursor.write_y);
            let zebra_stripe = index % 2 == 0;

            if zebra_stripe {
                let rect = Rect::new(x, y, self.content_width(), TABLE_ROW_HEIGHT);
                self.push(
                    x,
                    y,
                    LayoutInstruction::FilledBox {
                        rect,
                        color: Rgb::ZEBRA,
                    },
                );
            }
            self.push(
                x,
                y,
                LayoutInstruction::TableRow {
                    label,
                    value,
                    zebra_stripe,
                },
            );
            self.cursor.advance(TABLE_ROW_HEIGHT);
        }
        self.cursor.advance(TABLE_GAP);
    }

    fn visual_analysis(&mut self, producer: &dyn ImageProducer, model: &ReportModel) -> Result<()> {
        let charts = match producer.produce(model) {
            Ok(charts) if !charts.is_empty() => charts,
            Ok(_) => return Ok(()),
            Err(e) => {
                log::warn!("chart rendering failed, skipping visual analysis: {}", e);
                return Ok(());
            }
        };

        self.section_header("Visual Analysis");
        for chart in charts {
            let available = self.options.geometry.usable_height();
            let mut width = self.content_width();
            let mut height = width * chart.image.aspect_ratio();
            if height > available {
                width *= available / height;
                height = available;
            }

            self.cursor.ensure_fits(height);
            let rect = Rect::new(self.margin(), self.cursor.write_y, width, height);
            self.push(
                rect.x,
                rect.y,
                LayoutInstruction::Image {
                    rect,
                    image_id: chart.id.clone(),
                },
            );
            self.cursor.advance(height + DETAIL_GAP);

            let caption_size = self.options.style.caption_size;
            self.text_block(
                &chart.caption,
                caption_size,
                FontWeight::Regular,
                Rgb::MUTED,
                PARAGRAPH_GAP,
            )?;
            self.images.insert(chart.id, chart.image);
        }
        self.section_gap();
        Ok(())
    }

    fn recommendations(&mut self, model: &ReportModel) -> Result<()> {
        self.section_header("HR Recommendations");
        if model.suggestions.iter().all(|s| s.trim().is_empty()) {
            self.paragraph("No specific recommendations provided.")?;
        } else {
            for suggestion in &model.suggestions {
                self.bullet(suggestion)?;
            }
        }

        let size = self.options.style.body_size;
        let details = [
            ("Salary Range", &model.salary_range),
            ("Interview Readiness", &model.interview_readiness),
            ("Education Level", &model.education_level),
        ];
        for (label, value) in details {
            let line = format!("{}: {}", label, or_fallback(value, NOT_SPECIFIED));
            self.text_block(&line, size, FontWeight::Bold, Rgb::TEXT, DETAIL_GAP)?;
        }
        self.section_gap();
        Ok(())
    }

    fn final_recommendation(&mut self, model: &ReportModel, tier: RecommendationTier) -> Result<()> {
        if self.cursor.remaining() < FINAL_RESERVE {
            self.cursor.new_page();
        }
        self.section_header("Final Recommendation");

        let recommendation = model.hiring_recommendation.trim();
        let (label, color) = if recommendation.is_empty() {
            (tier.label(), CalloutColor::from_tier(tier))
        } else {
            (recommendation, CalloutColor::from_recommendation(recommendation))
        };

        let size = self.options.style.callout_size;
        let width = self.content_width() - CALLOUT_PADDING;
        let line_height = size * LINE_HEIGHT_FACTOR;
        let mut lines = wrap_text(self.measure, label, width, size, FontWeight::Bold);
        let max_lines = 3;
        if lines.len() > max_lines {
            lines.truncate(max_lines);
            if let Some(last) = lines.last_mut() {
                *last = self.ellipsize(last, size, FontWeight::Bold, width);
            }
        }

        let text_height = line_height * lines.len() as f32;
        let height = CALLOUT_MIN_HEIGHT.max(text_height + CALLOUT_PADDING);
        // First baseline sits so the block is vertically centered.
        let offset = (height - text_height) / 2.0 + line_height * 0.75;

        self.callout(
            height,
            callout_rgb(color),
            vec![(lines.join("\n"), size, FontWeight::Bold, offset)],
        );
        Ok(())
    }

    /// Close the body pass and emit one footer per page.
    fn finish(self) -> ReportLayout {
        let total_pages = self.cursor.page_index;
        let geometry = self.options.geometry;
        let mut instructions = self.out;

        for page in 1..=total_pages {
            instructions.push(PlacedInstruction {
                page,
                x: geometry.width / 2.0,
                y: geometry.height - FOOTER_OFFSET,
                instruction: LayoutInstruction::Footer {
                    page_number: page,
                    total_pages,
                },
            });
        }

        ReportLayout {
            geometry,
            style: self.options.style,
            generated_on: self.options.generated_on,
            total_pages,
            instructions,
            images: self.images,
        }
    }
}

fn or_fallback<'s>(value: &'s str, fallback: &'s str) -> &'s str {
    if value.trim().is_empty() {
        fallback
    } else {
        value.trim()
    }
}

fn skills_line(skills: &[String]) -> String {
    let skills: Vec<&str> = skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        "No skills listed.".to_string()
    } else {
        skills.join(", ")
    }
}

fn experience_label(model: &ReportModel) -> String {
    match &model.experience_years {
        Some(years @ ExperienceYears::Years(_)) => format!("{} years", years),
        Some(ExperienceYears::Text(text)) if text.trim().parse::<f64>().is_ok() => {
            format!("{} years", text.trim())
        }
        Some(ExperienceYears::Text(text)) if !text.trim().is_empty() => text.trim().to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

fn callout_rgb(color: CalloutColor) -> Rgb {
    match color {
        CalloutColor::Red => Rgb::RED,
        CalloutColor::Amber => Rgb::AMBER,
        CalloutColor::Green => Rgb::GREEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ChartImage;
    use chrono::NaiveDate;

    fn options() -> LayoutOptions {
        LayoutOptions::new().with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::new(options())
    }

    fn kinds(layout: &ReportLayout) -> Vec<&'static str> {
        layout
            .instructions
            .iter()
            .map(|p| match p.instruction {
                LayoutInstruction::Text { .. } => "text",
                LayoutInstruction::SectionHeader { .. } => "header",
                LayoutInstruction::Bullet { .. } => "bullet",
                LayoutInstruction::FilledBox { .. } => "box",
                LayoutInstruction::TableRow { .. } => "row",
                LayoutInstruction::Footer { .. } => "footer",
                LayoutInstruction::Image { .. } => "image",
            })
            .collect()
    }

    fn headers(layout: &ReportLayout) -> Vec<String> {
        layout
            .instructions
            .iter()
            .filter_map(|p| match &p.instruction {
                LayoutInstruction::SectionHeader { title, .. } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_title_band_first() {
        let layout = engine().render(&ReportModel::default()).unwrap();
        assert_eq!(&kinds(&layout)[..3], &["box", "text", "text"]);
        let band = &layout.instructions[0];
        assert_eq!(band.page, 1);
        assert!(matches!(
            band.instruction,
            LayoutInstruction::FilledBox { rect, color: Rgb::BRAND } if rect == Rect::new(0.0, 0.0, 210.0, 40.0)
        ));
    }

    #[test]
    fn test_section_order_without_optional_sections() {
        let layout = engine().render(&ReportModel::default()).unwrap();
        assert_eq!(
            headers(&layout),
            vec![
                "Executive Summary",
                "Overall Assessment",
                "Key Metrics",
                "Strengths",
                "Areas for Improvement",
                "Skills Breakdown",
                "HR Recommendations",
                "Final Recommendation",
            ]
        );
    }

    #[test]
    fn test_optional_sections() {
        let model = ReportModel {
            cultural_fit_indicators: vec!["Values ownership".into()],
            red_flags: vec!["   ".into()],
            next_steps: vec!["Schedule panel".into()],
            ..Default::default()
        };
        let titles = headers(&engine().render(&model).unwrap());
        assert!(titles.contains(&"Cultural Fit".to_string()));
        assert!(titles.contains(&"Next Steps".to_string()));
        assert!(!titles.contains(&"Red Flags".to_string()));
    }

    #[test]
    fn test_metrics_table_zebra() {
        let layout = engine().render(&ReportModel::default()).unwrap();
        let rows: Vec<(usize, bool)> = layout
            .instructions
            .iter()
            .enumerate()
            .filter_map(|(i, p)| match p.instruction {
                LayoutInstruction::TableRow { zebra_stripe, .. } => Some((i, zebra_stripe)),
                _ => None,
            })
            .collect();

        assert_eq!(rows.len(), 8);
        for (n, (index, zebra)) in rows.iter().enumerate() {
            assert_eq!(*zebra, n % 2 == 0);
            let before = &layout.instructions[index - 1].instruction;
            assert_eq!(
                matches!(before, LayoutInstruction::FilledBox { color: Rgb::ZEBRA, .. }),
                *zebra
            );
        }
    }

    #[test]
    fn test_table_values_use_defaults() {
        let layout = engine().render(&ReportModel::default()).unwrap();
        let values: Vec<String> = layout
            .instructions
            .iter()
            .filter_map(|p| match &p.instruction {
                LayoutInstruction::TableRow { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            values,
            vec!["0%", "75%", "80%", "70%", "85%", "78%", "82%", "Not specified"]
        );
    }

    #[test]
    fn test_footers_one_per_page() {
        let model = ReportModel {
            strengths: (0..40).map(|i| format!("Strength number {} with detail", i)).collect(),
            ..Default::default()
        };
        let layout = engine().render(&model).unwrap();
        assert!(layout.total_pages >= 2);

        let footers: Vec<(u32, u32, u32)> = layout
            .footers()
            .map(|p| match p.instruction {
                LayoutInstruction::Footer {
                    page_number,
                    total_pages,
                } => (p.page, page_number, total_pages),
                _ => unreachable!(),
            })
            .collect();
        let expected: Vec<(u32, u32, u32)> = (1..=layout.total_pages)
            .map(|p| (p, p, layout.total_pages))
            .collect();
        assert_eq!(footers, expected);

        // Footers come after every body instruction.
        let first_footer = layout
            .instructions
            .iter()
            .position(|p| matches!(p.instruction, LayoutInstruction::Footer { .. }))
            .unwrap();
        assert_eq!(first_footer, layout.instructions.len() - layout.total_pages as usize);
    }

    #[test]
    fn test_blocks_stay_within_page() {
        let model = ReportModel {
            strengths: (0..60)
                .map(|i| format!("Item {} describing a long and detailed accomplishment in depth", i))
                .collect(),
            ..Default::default()
        };
        let layout = engine().render(&model).unwrap();
        let bottom = layout.geometry.bottom();
        for placed in &layout.instructions {
            if let LayoutInstruction::Bullet { .. } = placed.instruction {
                let lines = placed.instruction.lines().len() as f32;
                assert!(placed.y + lines * 5.0 <= bottom + 1e-3);
            }
        }
    }

    #[test]
    fn test_final_box_color() {
        let cases = [
            ("Strong No Hire", Rgb::RED),
            ("Needs More Info (Caution)", Rgb::AMBER),
            ("Hire", Rgb::GREEN),
        ];
        for (recommendation, expected) in cases {
            let model = ReportModel {
                hiring_recommendation: recommendation.into(),
                ..Default::default()
            };
            let layout = engine().render(&model).unwrap();
            let last_box = layout
                .instructions
                .iter()
                .rev()
                .find_map(|p| match p.instruction {
                    LayoutInstruction::FilledBox { color, .. } => Some(color),
                    _ => None,
                })
                .unwrap();
            assert_eq!(last_box, expected, "{}", recommendation);
        }
    }

    #[test]
    fn test_overflow_policies() {
        let huge = "word ".repeat(8000);
        let model = ReportModel {
            summary: huge,
            ..Default::default()
        };

        let err = LayoutEngine::new(options().with_overflow(OverflowPolicy::Fail))
            .render(&model)
            .unwrap_err();
        assert!(matches!(err, Error::LayoutOverflowImpossible { .. }));

        let layout = engine().render(&model).unwrap();
        let summary = layout
            .instructions
            .iter()
            .find_map(|p| match &p.instruction {
                LayoutInstruction::Text { content, .. } if content.starts_with("word") => {
                    Some(content.clone())
                }
                _ => None,
            })
            .unwrap();
        assert!(summary.ends_with(ELLIPSIS));
        assert_eq!(summary.lines().count(), 49);
    }

    #[test]
    fn test_table_rows_move_whole_to_next_page() {
        let bottom = options().geometry.bottom();
        let mut straddled = 0;

        for words in 0..600 {
            let model = ReportModel {
                summary: "word ".repeat(words),
                ..Default::default()
            };
            let layout = engine().render(&model).unwrap();
            let rows: Vec<&PlacedInstruction> = layout
                .instructions
                .iter()
                .filter(|p| matches!(p.instruction, LayoutInstruction::TableRow { .. }))
                .collect();
            assert_eq!(rows.len(), 8);

            for row in &rows {
                assert!(row.y + TABLE_ROW_HEIGHT <= bottom + 1e-3, "{} words", words);
            }
            for pair in rows.windows(2) {
                if pair[1].page != pair[0].page {
                    assert_eq!(pair[1].page, pair[0].page + 1);
                    assert_eq!(pair[1].y, layout.geometry.margin);
                    straddled += 1;
                }
            }
        }
        assert!(straddled > 0);
    }

    struct EmptyChart;

    impl ImageProducer for EmptyChart {
        fn produce(&self, _model: &ReportModel) -> Result<Vec<ChartImage>> {
            Ok(vec![ChartImage {
                id: "empty".into(),
                caption: "Empty chart".into(),
                image: RasterImage::new(0, 4, Vec::new())?,
            }])
        }
    }

    struct SliverChart;

    impl ImageProducer for SliverChart {
        fn produce(&self, _model: &ReportModel) -> Result<Vec<ChartImage>> {
            Ok(vec![ChartImage {
                id: "sliver".into(),
                caption: "Sliver chart".into(),
                image: RasterImage::filled(0, 4, Rgb::BRAND),
            }])
        }
    }

    #[test]
    fn test_zero_width_chart_keeps_positions_finite() {
        let layout = engine()
            .with_image_producer(Arc::new(EmptyChart))
            .render(&ReportModel::default())
            .unwrap();
        assert!(!headers(&layout).contains(&"Visual Analysis".to_string()));
        assert!(layout.images.is_empty());
        assert!(layout.instructions.iter().all(|p| p.y.is_finite()));

        let layout = engine()
            .with_image_producer(Arc::new(SliverChart))
            .render(&ReportModel::default())
            .unwrap();
        let usable = layout.geometry.usable_height();
        let rect = layout
            .instructions
            .iter()
            .find_map(|p| match p.instruction {
                LayoutInstruction::Image { rect, .. } => Some(rect),
                _ => None,
            })
            .unwrap();
        assert!(rect.height.is_finite() && rect.height <= usable + 1e-3);
        assert!(layout.instructions.iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn test_experience_label() {
        let mut model = ReportModel {
            experience_years: Some(ExperienceYears::Years(6.0)),
            ..Default::default()
        };
        assert_eq!(experience_label(&model), "6 years");
        model.experience_years = Some(ExperienceYears::Text("8".into()));
        assert_eq!(experience_label(&model), "8 years");
        model.experience_years = Some(ExperienceYears::Text("5-7 years".into()));
        assert_eq!(experience_label(&model), "5-7 years");
        model.experience_years = None;
        assert_eq!(experience_label(&model), "Not specified");
    }
}
