//! PDF output through lopdf.
//!
//! Pages use the standard Helvetica fonts with WinAnsi encoding, so no font
//! program is embedded. Content streams and image data are zlib-compressed.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::error::{Error, Result};
use crate::layout::{
    Align, FontWeight, HelveticaMetrics, LayoutInstruction, PlacedInstruction, RasterImage, Rect,
    ReportLayout, Rgb, TextMeasure, BULLET_TEXT_OFFSET, LINE_HEIGHT_FACTOR, TABLE_ROW_HEIGHT,
};

use super::ReportRenderer;

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const CELL_PADDING: f32 = 3.0;
const ROW_BASELINE: f32 = 5.5;
const UNDERLINE_OFFSET: f32 = 2.0;
const UNDERLINE_WIDTH_PT: f32 = 0.5;

/// Encode text for a WinAnsi (CP1252) simple font; unmappable chars become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Renders a [`ReportLayout`] as a PDF document.
pub struct PdfReportRenderer {
    measure: Arc<dyn TextMeasure>,
    compress: bool,
}

impl PdfReportRenderer {
    pub fn new() -> Self {
        Self {
            measure: Arc::new(HelveticaMetrics),
            compress: true,
        }
    }

    /// Measurement used to center and right-align text.
    ///
    /// Should match the one the layout was produced with.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// Toggle stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    fn stream(&self, dict: Dictionary, data: Vec<u8>) -> Result<Stream> {
        if !self.compress {
            return Ok(Stream::new(dict, data));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data)?;
        let compressed = encoder.finish()?;

        let mut dict = dict;
        dict.set("Filter", "FlateDecode");
        Ok(Stream::new(dict, compressed))
    }

    fn image_stream(&self, image: &RasterImage) -> Result<Stream> {
        self.stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width() as i64,
                "Height" => image.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            image.pixels().to_vec(),
        )
    }
}

impl Default for PdfReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extension(&self) -> &str {
        "pdf"
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, layout: &ReportLayout) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font_dictionary("Helvetica"));
        let bold = doc.add_object(font_dictionary("Helvetica-Bold"));

        let mut xobjects = Dictionary::new();
        let mut image_names = HashMap::new();
        for (i, (id, image)) in layout.images.iter().enumerate() {
            let name = format!("Im{}", i + 1);
            let image_id = doc.add_object(self.image_stream(image)?);
            xobjects.set(name.clone(), image_id);
            image_names.insert(id.as_str(), name);
        }

        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular,
                FONT_BOLD => bold,
            },
            "XObject" => xobjects,
        });

        let geometry = layout.geometry;
        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.width * PT_PER_MM),
            Object::Real(geometry.height * PT_PER_MM),
        ];

        let mut kids = Vec::new();
        for page in 1..=layout.total_pages {
            let mut painter = Painter::new(layout, self.measure.as_ref(), &image_names);
            for placed in layout.page(page) {
                painter.draw(placed)?;
            }

            let content = Content {
                operations: painter.ops,
            };
            let content_id = doc.add_object(self.stream(Dictionary::new(), content.encode()?)?);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => layout.total_pages as i64,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(crate::layout::REPORT_TITLE),
            "Producer" => Object::string_literal(concat!("hirelens ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Builds the content stream of one page.
struct Painter<'a> {
    layout: &'a ReportLayout,
    measure: &'a dyn TextMeasure,
    image_names: &'a HashMap<&'a str, String>,
    ops: Vec<Operation>,
}

impl<'a> Painter<'a> {
    fn new(
        layout: &'a ReportLayout,
        measure: &'a dyn TextMeasure,
        image_names: &'a HashMap<&'a str, String>,
    ) -> Self {
        Self {
            layout,
            measure,
            image_names,
            ops: Vec::new(),
        }
    }

    fn x(&self, mm: f32) -> Object {
        Object::Real(mm * PT_PER_MM)
    }

    /// Flip from top-left millimetres to bottom-left points.
    fn y(&self, mm: f32) -> Object {
        Object::Real((self.layout.geometry.height - mm) * PT_PER_MM)
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn fill_color(&mut self, color: Rgb) {
        let (r, g, b) = color.unit();
        self.op("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]);
    }

    fn text(&mut self, x: f32, y: f32, text: &str, size: f32, weight: FontWeight, color: Rgb) {
        let font = match weight {
            FontWeight::Regular => FONT_REGULAR,
            FontWeight::Bold => FONT_BOLD,
        };
        let position = vec![self.x(x), self.y(y)];
        self.fill_color(color);
        self.op("BT", vec![]);
        self.op("Tf", vec![font.into(), Object::Real(size)]);
        self.op("Td", position);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let bounds = vec![
            self.x(rect.x),
            self.y(rect.bottom()),
            Object::Real(rect.width * PT_PER_MM),
            Object::Real(rect.height * PT_PER_MM),
        ];
        self.fill_color(color);
        self.op("re", bounds);
        self.op("f", vec![]);
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32, color: Rgb) {
        let (r, g, b) = color.unit();
        let start = vec![self.x(x1), self.y(y)];
        let end = vec![self.x(x2), self.y(y)];
        self.op("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]);
        self.op("w", vec![Object::Real(UNDERLINE_WIDTH_PT)]);
        self.op("m", start);
        self.op("l", end);
        self.op("S", vec![]);
    }

    fn draw(&mut self, placed: &PlacedInstruction) -> Result<()> {
        let layout = self.layout;
        let style = layout.style;
        let (x, y) = (placed.x, placed.y);

        match &placed.instruction {
            LayoutInstruction::Text {
                content,
                font_size,
                weight,
                color,
                align,
            } => {
                let line_height = font_size * LINE_HEIGHT_FACTOR;
                for (i, line) in content.lines().enumerate() {
                    let line_x = match align {
                        Align::Left => x,
                        Align::Center => x - self.measure.width(line, *font_size, *weight) / 2.0,
                    };
                    let line_y = y + i as f32 * line_height;
                    self.text(line_x, line_y, line, *font_size, *weight, *color);
                }
            }
            LayoutInstruction::SectionHeader { title, underline } => {
                self.text(x, y, title, style.section_size, FontWeight::Bold, Rgb::BRAND);
                if *underline {
                    let right = layout.geometry.width - layout.geometry.margin;
                    self.rule(x, right, y + UNDERLINE_OFFSET, Rgb::BRAND);
                }
            }
            LayoutInstruction::Bullet { content, indent } => {
                let size = style.body_size;
                let line_height = size * LINE_HEIGHT_FACTOR;
                let text_x = x + indent + BULLET_TEXT_OFFSET;
                self.text(x + indent, y, "\u{2022}", size, FontWeight::Regular, Rgb::TEXT);
                for (i, line) in content.lines().enumerate() {
                    let line_y = y + i as f32 * line_height;
                    self.text(text_x, line_y, line, size, FontWeight::Regular, Rgb::TEXT);
                }
            }
            LayoutInstruction::FilledBox { rect, color } => self.fill_rect(*rect, *color),
            LayoutInstruction::TableRow { label, value, .. } => {
                let size = style.body_size;
                let baseline = y + ROW_BASELINE.min(TABLE_ROW_HEIGHT);
                let right = x + layout.geometry.content_width() - CELL_PADDING;
                let value_x = right - self.measure.width(value, size, FontWeight::Bold);

                self.text(x + CELL_PADDING, baseline, label, size, FontWeight::Regular, Rgb::TEXT);
                self.text(value_x, baseline, value, size, FontWeight::Bold, Rgb::TEXT);
            }
            LayoutInstruction::Footer {
                page_number,
                total_pages,
            } => {
                let text = layout.footer_text(*page_number, *total_pages);
                let size = style.footer_size;
                let width = self.measure.width(&text, size, FontWeight::Regular);
                self.text(x - width / 2.0, y, &text, size, FontWeight::Regular, Rgb::MUTED);
            }
            LayoutInstruction::Image { rect, image_id } => {
                let name = self
                    .image_names
                    .get(image_id.as_str())
                    .ok_or_else(|| {
                        Error::Render(format!("layout references unknown image '{}'", image_id))
                    })?
                    .as_bytes()
                    .to_vec();
                let matrix = vec![
                    Object::Real(rect.width * PT_PER_MM),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(rect.height * PT_PER_MM),
                    self.x(rect.x),
                    self.y(rect.bottom()),
                ];
                self.op("q", vec![]);
                self.op("cm", matrix);
                self.op("Do", vec![Object::Name(name)]);
                self.op("Q", vec![]);
            }
        }
        Ok(())
    }
}
