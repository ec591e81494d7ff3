//! Raster images supplied to the layout engine.
//!
//! Chart rasterisation is a collaborator: an [`ImageProducer`] turns a
//! [`ReportModel`] into RGB rasters that the engine places like any other
//! block. [`CompetencyChart`] is a small built-in producer.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Competency, RecommendationTier, ReportModel};

use super::geometry::Rgb;

/// An 8-bit RGB raster, rows top to bottom.
///
/// Both dimensions are at least one pixel and the pixel buffer always holds
/// `width * height * 3` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterImage {
    width: u32,
    height: u32,
    #[serde(skip)]
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap RGB pixel data, checking its length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Render("image has no pixels".to_string()));
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(Error::Render(format!(
                "image data is {} bytes, expected {} for {}x{} RGB",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A raster filled with one color. Zero dimensions are raised to one.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&[color.0, color.1, color.2]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Paint a rectangle, clipped to the raster.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgb) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for row in y.min(y_end)..y_end {
            for col in x.min(x_end)..x_end {
                let i = (row as usize * self.width as usize + col as usize) * 3;
                self.pixels[i..i + 3].copy_from_slice(&[color.0, color.1, color.2]);
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGB bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Height over width.
    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

/// A produced chart with a caption.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub id: String,
    pub caption: String,
    pub image: RasterImage,
}

/// Rasterises charts for a report.
pub trait ImageProducer: Send + Sync {
    fn produce(&self, model: &ReportModel) -> Result<Vec<ChartImage>>;
}

/// Horizontal bar chart of the six competency scores.
#[derive(Debug, Clone, Copy)]
pub struct CompetencyChart {
    width: u32,
    height: u32,
}

impl CompetencyChart {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(10),
            height: height.max(Competency::ALL.len() as u32 * 4),
        }
    }

    fn bar_color(score: f64) -> Rgb {
        match RecommendationTier::from_score(score.round().clamp(0.0, 100.0) as u8) {
            RecommendationTier::HighlyRecommended | RecommendationTier::Recommended => Rgb::GREEN,
            RecommendationTier::ConsiderWithCaution => Rgb::AMBER,
            RecommendationTier::NotRecommended => Rgb::RED,
        }
    }
}

impl Default for CompetencyChart {
    fn default() -> Self {
        Self::new(640, 240)
    }
}

impl ImageProducer for CompetencyChart {
    fn produce(&self, model: &ReportModel) -> Result<Vec<ChartImage>> {
        let mut image = RasterImage::filled(self.width, self.height, Rgb::WHITE);
        let row_height = self.height / Competency::ALL.len() as u32;
        let padding = row_height / 4;

        for (i, competency) in Competency::ALL.iter().enumerate() {
            let score = model.competency_or_default(*competency);
            let top = i as u32 * row_height + padding;
            let bar_height = row_height - 2 * padding;
            let filled = (self.width as f64 * score / 100.0).round() as u32;

            image.fill_rect(0, top, self.width, bar_height, Rgb::ZEBRA);
            image.fill_rect(0, top, filled, bar_height, Self::bar_color(score));
        }

        let labels: Vec<&str> = Competency::ALL.iter().map(|c| c.label()).collect();
        Ok(vec![ChartImage {
            id: "competencies".to_string(),
            caption: format!("Competency scores, top to bottom: {}", labels.join(", ")),
            image,
        }])
    }
}
