//! Layout configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::geometry::PageGeometry;

/// What to do with a block taller than a full page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Keep the lines that fit and end the last one with `...`
    #[default]
    Truncate,
    /// Fail with `LayoutOverflowImpossible`
    Fail,
}

/// Font sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutStyle {
    pub title_size: f32,
    pub subtitle_size: f32,
    pub section_size: f32,
    pub body_size: f32,
    pub caption_size: f32,
    pub score_size: f32,
    pub callout_size: f32,
    pub footer_size: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            title_size: 22.0,
            subtitle_size: 10.0,
            section_size: 14.0,
            body_size: 10.0,
            caption_size: 9.0,
            score_size: 16.0,
            callout_size: 14.0,
            footer_size: 8.0,
        }
    }
}

/// Options for laying out a report.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Page size and margin
    pub geometry: PageGeometry,

    /// Font sizes
    pub style: LayoutStyle,

    /// Date printed in the subtitle and footers
    pub generated_on: NaiveDate,

    /// Handling of blocks that cannot fit on any page
    pub overflow: OverflowPolicy,

    /// Lay out the "Visual Analysis" section when an image producer is set
    pub include_visuals: bool,
}

impl LayoutOptions {
    /// Create layout options dated today.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.generated_on = date;
        self
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the overflow policy.
    pub fn with_overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }

    /// Set font sizes.
    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable the visual analysis section.
    pub fn with_visuals(mut self, include: bool) -> Self {
        self.include_visuals = include;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            style: LayoutStyle::default(),
            generated_on: chrono::Local::now().date_naive(),
            overflow: OverflowPolicy::default(),
            include_visuals: true,
        }
    }
}
