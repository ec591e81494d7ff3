//! Mutable write position for one layout run.

use serde::Serialize;

use super::geometry::PageGeometry;

/// Current page and vertical write position.
///
/// Owned by a single layout run and threaded through every primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageCursor {
    /// 1-based page number
    pub page_index: u32,
    /// Next free y position (mm from the top edge)
    pub write_y: f32,
    pub page_height: f32,
    pub page_width: f32,
    pub margin: f32,
}

impl PageCursor {
    /// Cursor at the top margin of page 1.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            page_index: 1,
            write_y: geometry.margin,
            page_height: geometry.height,
            page_width: geometry.width,
            margin: geometry.margin,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn bottom(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Space left above the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.bottom() - self.write_y
    }

    /// Start a fresh page.
    pub fn new_page(&mut self) {
        self.page_index += 1;
        self.write_y = self.margin;
    }

    pub fn advance(&mut self, dy: f32) {
        self.write_y += dy;
    }

    /// Break the page when `write_y` is past `page_height - reserve`.
    ///
    /// Returns whether a new page was started.
    pub fn break_if_past(&mut self, reserve: f32) -> bool {
        if self.write_y > self.page_height - reserve {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Break the page unless a block of `height` fits below `write_y`.
    pub fn ensure_fits(&mut self, height: f32) -> bool {
        if height > self.remaining() && self.write_y > self.margin {
            self.new_page();
            true
        } else {
            false
        }
    }
}
