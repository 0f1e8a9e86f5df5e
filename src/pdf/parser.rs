//! [`PdfParser`] trait and the `lopdf`-backed implementation.

use std::path::Path;

use lopdf::Document;
use thiserror::Error;

// ---------------------------------------------------------------------------
// PdfError
// ---------------------------------------------------------------------------

/// Errors from opening or reading a PDF document.
#[derive(Debug, Clone, Error)]
pub enum PdfError {
    /// The file could not be opened or is not a parsable PDF.
    #[error("failed to open PDF: {0}")]
    Open(String),

    /// Text extraction failed for one page.
    #[error("failed to extract text from page {page}: {message}")]
    Page { page: u32, message: String },
}

// ---------------------------------------------------------------------------
// ParseResult / PageIter
// ---------------------------------------------------------------------------

/// The outcome of opening a document: the page count plus a lazy page-text
/// iterator.
///
/// `pages` owns the open document; dropping or exhausting it releases the
/// underlying resource. It must be consumed exactly once, in order.
pub struct ParseResult {
    pub total_pages: usize,
    pub pages: PageIter,
}

/// Lazy iterator over per-page text, in page order.
pub struct PageIter {
    inner: Box<dyn Iterator<Item = Result<String, PdfError>> + Send>,
}

impl PageIter {
    fn from_document(doc: Document, numbers: Vec<u32>) -> Self {
        Self {
            inner: Box::new(LopdfPages {
                doc,
                numbers: numbers.into_iter(),
            }),
        }
    }

    /// Build an iterator over pre-extracted pages (test fixtures).
    #[cfg(test)]
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            inner: Box::new(pages.into_iter().map(Ok)),
        }
    }
}

impl Iterator for PageIter {
    type Item = Result<String, PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

struct LopdfPages {
    doc: Document,
    numbers: std::vec::IntoIter<u32>,
}

impl Iterator for LopdfPages {
    type Item = Result<String, PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.numbers.next()?;
        Some(self.doc.extract_text(&[page]).map_err(|e| PdfError::Page {
            page,
            message: e.to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// PdfParser trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for PDF text extraction.
///
/// `parse` is synchronous and potentially blocking; the pipeline runs it on
/// the blocking thread pool.
pub trait PdfParser: Send + Sync {
    /// Open `path` and return the page count plus a lazy page iterator.
    fn parse(&self, path: &Path) -> Result<ParseResult, PdfError>;
}

// Compile-time assertion: Box<dyn PdfParser> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PdfParser>) {}
};

// ---------------------------------------------------------------------------
// LopdfParser
// ---------------------------------------------------------------------------

/// Production parser on top of `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfParser;

impl LopdfParser {
    pub fn new() -> Self {
        Self
    }
}

impl PdfParser for LopdfParser {
    fn parse(&self, path: &Path) -> Result<ParseResult, PdfError> {
        let doc = Document::load(path).map_err(|e| PdfError::Open(e.to_string()))?;
        let numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total_pages = numbers.len();

        Ok(ParseResult {
            total_pages,
            pages: PageIter::from_document(doc, numbers),
        })
    }
}

// ---------------------------------------------------------------------------
// MockParser  (test-only)
// ---------------------------------------------------------------------------

/// A test double returning pre-configured pages (or an open error) without
/// touching the filesystem. Records every parsed path.
#[cfg(test)]
pub struct MockParser {
    pages: Option<Vec<String>>,
    calls: std::sync::Mutex<Vec<std::path::PathBuf>>,
}

#[cfg(test)]
impl MockParser {
    /// A parser that yields exactly these pages.
    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: Some(pages.iter().map(|p| p.to_string()).collect()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A parser whose `parse` always fails with [`PdfError::Open`].
    pub fn failing() -> Self {
        Self {
            pages: None,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<std::path::PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl PdfParser for MockParser {
    fn parse(&self, path: &Path) -> Result<ParseResult, PdfError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        match &self.pages {
            Some(pages) => Ok(ParseResult {
                total_pages: pages.len(),
                pages: PageIter::from_pages(pages.clone()),
            }),
            None => Err(PdfError::Open("simulated parse failure".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::tempdir;

    /// Build a real on-disk PDF with one page of text per entry in `pages`.
    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).expect("save pdf");
    }

    #[test]
    fn parses_page_count_and_text_in_order() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("two-pages.pdf");
        write_pdf(&path, &["First page here", "Second page here"]);

        let result = LopdfParser::new().parse(&path).expect("parse");
        assert_eq!(result.total_pages, 2);

        let pages: Vec<String> = result
            .pages
            .collect::<Result<Vec<_>, _>>()
            .expect("extract all pages");
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("First page"), "got: {:?}", pages[0]);
        assert!(pages[1].contains("Second page"), "got: {:?}", pages[1]);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = LopdfParser::new()
            .parse(Path::new("/nonexistent/missing.pdf"))
            .err()
            .expect("must fail");
        assert!(matches!(err, PdfError::Open(_)));
    }

    #[test]
    fn garbage_file_is_an_open_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("not-a-pdf.pdf");
        std::fs::write(&path, b"this is not a pdf at all").expect("write");

        let err = LopdfParser::new().parse(&path).err().expect("must fail");
        assert!(matches!(err, PdfError::Open(_)));
    }

    #[test]
    fn mock_parser_round_trips_pages() {
        let parser = MockParser::with_pages(&["a", "b", "c"]);
        let result = parser.parse(Path::new("ignored.pdf")).expect("parse");
        assert_eq!(result.total_pages, 3);
        let pages: Vec<String> = result.pages.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(pages, vec!["a", "b", "c"]);
    }
}
