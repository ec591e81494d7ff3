//! Page geometry, rectangles and colors. All lengths are millimetres.

use serde::{Deserialize, Serialize};

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const DEFAULT_MARGIN_MM: f32 = 25.0;

/// Fixed page size and margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            margin: DEFAULT_MARGIN_MM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y a block may reach.
    pub fn bottom(&self) -> f32 {
        self.height - self.margin
    }

    /// Height available to blocks on a fresh page.
    pub fn usable_height(&self) -> f32 {
        self.bottom() - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Axis-aligned rectangle, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const TEXT: Rgb = Rgb(33, 37, 41);
    pub const MUTED: Rgb = Rgb(108, 117, 125);
    pub const BRAND: Rgb = Rgb(41, 98, 255);
    pub const ZEBRA: Rgb = Rgb(243, 245, 248);
    pub const RED: Rgb = Rgb(220, 53, 69);
    pub const AMBER: Rgb = Rgb(255, 159, 28);
    pub const GREEN: Rgb = Rgb(40, 167, 69);

    /// Components scaled to `0.0..=1.0`.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}
