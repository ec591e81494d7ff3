//! Text measurement and line wrapping.

use serde::{Deserialize, Serialize};

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Measures rendered text width.
pub trait TextMeasure: Send + Sync {
    /// Width of `text` in millimetres at `font_size` points.
    fn width(&self, text: &str, font_size: f32, weight: FontWeight) -> f32;
}

// Advance widths (1/1000 em) of printable ASCII, from the Helvetica AFM files.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const DEFAULT_GLYPH_WIDTH: u16 = 556;

/// Standard 14 Helvetica metrics (the fonts the PDF renderer uses).
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    fn glyph_width(c: char, weight: FontWeight) -> u16 {
        let table = match weight {
            FontWeight::Regular => &HELVETICA,
            FontWeight::Bold => &HELVETICA_BOLD,
        };
        match c {
            ' '..='~' => table[c as usize - 32],
            '\u{2022}' => 350,
            '\u{2013}' => 556,
            '\u{2014}' | '\u{2026}' => 1000,
            '\u{2018}' | '\u{2019}' => match weight {
                FontWeight::Regular => 222,
                FontWeight::Bold => 278,
            },
            '\u{201C}' | '\u{201D}' => match weight {
                FontWeight::Regular => 333,
                FontWeight::Bold => 500,
            },
            _ => DEFAULT_GLYPH_WIDTH,
        }
    }
}

impl TextMeasure for HelveticaMetrics {
    fn width(&self, text: &str, font_size: f32, weight: FontWeight) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| Self::glyph_width(c, weight) as u32)
            .sum();
        units as f32 / 1000.0 * font_size * MM_PER_PT
    }
}

/// Greedy word wrap to `max_width` millimetres.
///
/// Explicit newlines start a new line, blank lines are dropped, and a word
/// wider than the line is broken between characters.
pub fn wrap_text(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: f32,
    font_size: f32,
    weight: FontWeight,
) -> Vec<String> {
    let fits = |s: &str| measure.width(s, font_size, weight) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if fits(candidate.as_str()) {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
            } else {
                let mut pieces = break_word(word, &fits);
                line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

/// Split one word into pieces that fit; every piece holds at least one char.
fn break_word(word: &str, fits: &dyn Fn(&str) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();

    for c in word.chars() {
        piece.push(c);
        if !fits(piece.as_str()) && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
