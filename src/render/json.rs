//! JSON dump of layout instructions.

use crate::error::{Error, Result};
use crate::layout::ReportLayout;

use super::ReportRenderer;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a layout to JSON. Image pixel data is omitted.
pub fn to_json(layout: &ReportLayout, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(layout),
        JsonFormat::Compact => serde_json::to_string(layout),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// [`ReportRenderer`] writing the layout as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportRenderer {
    format: JsonFormat,
}

impl JsonReportRenderer {
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }
}

impl ReportRenderer for JsonReportRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn extension(&self) -> &str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>> {
        to_json(layout, self.format).map(String::into_bytes)
    }
}
