//! Primary PDF strategy: recover the text layer from content streams.

use std::sync::Arc;

use crate::error::{Error, Result};

use super::backend::{ContentOp, PageId, PdfBackend, PdfLoader, PdfValue};
use super::cleanup::{collapse_layout_whitespace, normalize_unicode};
use super::{CancelToken, Strategy, TextExtractor};

/// `TJ` adjustments beyond this many thousandths of an em read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Extracts the text layer page by page through a [`PdfLoader`].
pub struct PdfTextExtractor {
    loader: Arc<dyn PdfLoader>,
}

impl PdfTextExtractor {
    pub fn new(loader: Arc<dyn PdfLoader>) -> Self {
        Self { loader }
    }

    /// Text of one page: every shown fragment, in stream order, joined by a space.
    fn page_text(&self, backend: &dyn PdfBackend, page: PageId) -> Result<String> {
        let ops = backend.page_operations(page)?;
        let fragments = collect_fragments(&ops, |font, bytes| {
            backend.decode_text(page, font, bytes)
        });
        Ok(fragments.join(" "))
    }
}

impl TextExtractor for PdfTextExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::PrimaryPdf
    }

    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String> {
        let backend = self.loader.load(bytes)?;
        let pages = backend.pages();
        log::debug!("PDF loaded with {} pages", pages.len());

        let mut full_text = String::new();
        for (page_num, page_id) in pages {
            cancel.check()?;

            match self.page_text(backend.as_ref(), page_id) {
                Ok(text) => {
                    log::debug!("Extracted {} characters from page {}", text.len(), page_num);
                    if !text.trim().is_empty() {
                        full_text.push_str(&text);
                        full_text.push_str("\n\n");
                    }
                }
                Err(e) => {
                    log::warn!("Error extracting text from page {}: {}", page_num, e);
                }
            }
        }

        if full_text.is_empty() {
            return Err(Error::ExtractionFailed(
                "no text layer found in any page".to_string(),
            ));
        }

        Ok(collapse_layout_whitespace(&normalize_unicode(&full_text)))
    }
}

/// Walk content operations and return the decoded text fragments.
///
/// Only text shown inside `BT`/`ET` counts. `decode` receives the current
/// font resource name and the raw string bytes.
pub fn collect_fragments<F>(ops: &[ContentOp], mut decode: F) -> Vec<String>
where
    F: FnMut(&[u8], &[u8]) -> String,
{
    let mut fragments = Vec::new();
    let mut font: Vec<u8> = Vec::new();
    let mut in_text_block = false;

    for op in ops {
        let text = match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                continue;
            }
            "ET" => {
                in_text_block = false;
                continue;
            }
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    font = name.clone();
                }
                continue;
            }
            _ if !in_text_block => continue,
            "Tj" | "'" => match op.operands.first() {
                Some(PdfValue::Str(bytes)) => decode(&font, bytes),
                _ => continue,
            },
            "\"" => match op.operands.get(2) {
                Some(PdfValue::Str(bytes)) => decode(&font, bytes),
                _ => continue,
            },
            "TJ" => match op.operands.first() {
                Some(PdfValue::Array(items)) => join_tj_array(items, |b| decode(&font, b)),
                _ => continue,
            },
            _ => continue,
        };

        if !text.trim().is_empty() {
            fragments.push(text);
        }
    }

    fragments
}

/// Combine the strings of a `TJ` array, turning wide negative kerning into spaces.
fn join_tj_array<F>(items: &[PdfValue], mut decode: F) -> String
where
    F: FnMut(&[u8]) -> String,
{
    let mut combined = String::new();

    for item in items {
        match item {
            PdfValue::Str(bytes) => combined.push_str(&decode(bytes)),
            other => {
                let Some(adjustment) = other.as_number() else {
                    continue;
                };
                if -adjustment > TJ_SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    combined.push(' ');
                }
            }
        }
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::backend::decode_raw_text;
    use std::collections::BTreeMap;

    fn s(text: &str) -> PdfValue {
        PdfValue::Str(text.as_bytes().to_vec())
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(operator, operands)
    }

    fn decode(_font: &[u8], bytes: &[u8]) -> String {
        decode_raw_text(bytes)
    }

    #[test]
    fn test_collect_fragments_stream_order() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(12)]),
            op("Tj", vec![s("Jane Doe")]),
            op("'", vec![s("Senior Engineer")]),
            op(
                "\"",
                vec![PdfValue::Integer(0), PdfValue::Integer(0), s("Berlin")],
            ),
            op("ET", vec![]),
        ];
        assert_eq!(
            collect_fragments(&ops, decode),
            vec!["Jane Doe", "Senior Engineer", "Berlin"]
        );
    }

    #[test]
    fn test_collect_fragments_ignores_text_outside_bt() {
        let ops = vec![
            op("Tj", vec![s("stray")]),
            op("BT", vec![]),
            op("Tj", vec![s("   ")]),
            op("Tj", vec![s("kept")]),
            op("ET", vec![]),
        ];
        assert_eq!(collect_fragments(&ops, decode), vec!["kept"]);
    }

    #[test]
    fn test_tj_array_spacing() {
        let items = vec![
            s("Rust"),
            PdfValue::Integer(-250),
            s("Go"),
            PdfValue::Real(-40.0),
            s("lang"),
        ];
        assert_eq!(join_tj_array(&items, decode_raw_text), "Rust Golang");
    }

    #[test]
    fn test_font_passed_to_decoder() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F2".to_vec()), PdfValue::Integer(9)]),
            op("Tj", vec![s("x")]),
            op("ET", vec![]),
        ];
        let seen = collect_fragments(&ops, |font, _| String::from_utf8_lossy(font).to_string());
        assert_eq!(seen, vec!["F2"]);
    }

    struct PagedBackend {
        pages: Vec<Option<Vec<ContentOp>>>,
    }

    impl PdfBackend for PagedBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.pages.len() as u32).map(|n| (n, (n, 0))).collect()
        }

        fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>> {
            self.pages[(page.0 - 1) as usize]
                .clone()
                .ok_or_else(|| Error::PdfParse("broken page".into()))
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            decode_raw_text(bytes)
        }
    }

    struct PagedLoader(Vec<Option<Vec<ContentOp>>>);

    impl PdfLoader for PagedLoader {
        fn load(&self, _data: &[u8]) -> Result<Box<dyn PdfBackend>> {
            Ok(Box::new(PagedBackend {
                pages: self.0.clone(),
            }))
        }
    }

    fn text_page(parts: &[&str]) -> Option<Vec<ContentOp>> {
        let mut ops = vec![op("BT", vec![])];
        ops.extend(parts.iter().map(|p| op("Tj", vec![s(p)])));
        ops.push(op("ET", vec![]));
        Some(ops)
    }

    #[test]
    fn test_pages_joined_with_blank_line_and_broken_page_skipped() {
        let loader = PagedLoader(vec![
            text_page(&["Page", "one   text"]),
            None,
            text_page(&["Page two"]),
        ]);
        let extractor = PdfTextExtractor::new(Arc::new(loader));
        let text = extractor.extract(b"%PDF-1.4", &CancelToken::new()).unwrap();
        assert_eq!(text, "Page one text\n\nPage two");
    }

    #[test]
    fn test_no_text_layer_is_failure() {
        let loader = PagedLoader(vec![Some(vec![op("q", vec![]), op("Q", vec![])])]);
        let extractor = PdfTextExtractor::new(Arc::new(loader));
        let err = extractor.extract(b"%PDF-1.4", &CancelToken::new()).unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }
}
