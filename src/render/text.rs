//! Plain text preview of a report layout.

use std::fmt::Write;

use crate::error::Result;
use crate::layout::{LayoutInstruction, ReportLayout};

use super::ReportRenderer;

const RULE_WIDTH: usize = 72;

/// Renders a layout as plain text, one block per line group.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render to a string.
    pub fn to_text(&self, layout: &ReportLayout) -> String {
        let mut out = String::new();
        let mut current_page = 0;

        for placed in &layout.instructions {
            if placed.page != current_page && !is_footer(&placed.instruction) {
                if current_page != 0 {
                    write_footer(&mut out, layout, current_page);
                    out.push('\n');
                }
                let _ = writeln!(out, "{}", page_rule(placed.page, layout.total_pages));
                current_page = placed.page;
            }

            match &placed.instruction {
                LayoutInstruction::Text { content, .. } => {
                    for line in content.lines() {
                        let _ = writeln!(out, "{}", line);
                    }
                }
                LayoutInstruction::SectionHeader { title, .. } => {
                    let _ = writeln!(out, "\n## {}", title);
                }
                LayoutInstruction::Bullet { content, .. } => {
                    for (i, line) in content.lines().enumerate() {
                        let marker = if i == 0 { "  \u{2022} " } else { "    " };
                        let _ = writeln!(out, "{}{}", marker, line);
                    }
                }
                LayoutInstruction::TableRow { label, value, .. } => {
                    let _ = writeln!(out, "  {:<24}{:>12}", label, value);
                }
                LayoutInstruction::Image { image_id, .. } => {
                    let _ = writeln!(out, "[image: {}]", image_id);
                }
                LayoutInstruction::FilledBox { .. } | LayoutInstruction::Footer { .. } => {}
            }
        }

        if current_page != 0 {
            write_footer(&mut out, layout, current_page);
        }
        out
    }
}

impl ReportRenderer for TextReportRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn extension(&self) -> &str {
        "txt"
    }

    fn mime_type(&self) -> &'static str {
        "text/plain"
    }

    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>> {
        Ok(self.to_text(layout).into_bytes())
    }
}

fn is_footer(instruction: &LayoutInstruction) -> bool {
    matches!(instruction, LayoutInstruction::Footer { .. })
}

fn write_footer(out: &mut String, layout: &ReportLayout, page: u32) {
    let _ = writeln!(
        out,
        "\n{}\n{}",
        "-".repeat(RULE_WIDTH),
        layout.footer_text(page, layout.total_pages)
    );
}

fn page_rule(page: u32, total: u32) -> String {
    let label = format!(" Page {} of {} ", page, total);
    let side = RULE_WIDTH.saturating_sub(label.len()) / 2;
    format!("{}{}{}", "=".repeat(side), label, "=".repeat(side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutEngine, LayoutOptions};
    use crate::model::ReportModel;
    use chrono::NaiveDate;

    #[test]
    fn test_to_text() {
        let model = ReportModel {
            summary: "Seasoned platform engineer.".into(),
            strengths: vec!["Distributed systems".into()],
            hiring_recommendation: "Hire".into(),
            ..Default::default()
        };
        let options =
            LayoutOptions::new().with_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let layout = LayoutEngine::new(options).render(&model).unwrap();
        let text = TextReportRenderer::new().to_text(&layout);

        assert!(text.starts_with("="));
        assert!(text.contains("HR Analysis Report"));
        assert!(text.contains("## Executive Summary"));
        assert!(text.contains("Seasoned platform engineer."));
        assert!(text.contains("  \u{2022} Distributed systems"));
        assert!(text.contains("Match Score"));
        assert!(text.contains(&format!(
            "Page {} of {} | Generated 2024-02-29",
            layout.total_pages, layout.total_pages
        )));
    }

    #[test]
    fn test_footer_after_every_page() {
        let model = ReportModel {
            strengths: (0..40)
                .map(|i| format!("Strength number {} with supporting detail", i))
                .collect(),
            ..Default::default()
        };
        let options =
            LayoutOptions::new().with_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let layout = LayoutEngine::new(options).render(&model).unwrap();
        assert!(layout.total_pages >= 2);
        let text = TextReportRenderer::new().to_text(&layout);

        let mut last_footer = 0;
        for page in 1..=layout.total_pages {
            let footer = layout.footer_text(page, layout.total_pages);
            assert_eq!(text.matches(footer.as_str()).count(), 1, "page {}", page);
            let at = text.find(footer.as_str()).unwrap();
            assert!(at >= last_footer);
            last_footer = at;

            if page < layout.total_pages {
                let next_rule = text.find(&page_rule(page + 1, layout.total_pages)).unwrap();
                assert!(at < next_rule);
            }
        }
        assert!(text.trim_end().ends_with(&layout.footer_text(
            layout.total_pages,
            layout.total_pages
        )));
    }

    #[test]
    fn test_page_rule() {
        let rule = page_rule(2, 3);
        assert!(rule.contains(" Page 2 of 3 "));
        assert!(rule.starts_with('='));
    }
}
