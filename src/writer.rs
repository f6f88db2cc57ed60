//! Writers that turn positioned lines into finished documents.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use log::{debug, info};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::render::{Emphasis, PositionedLine};

const LAYER_NAME: &str = "Report";

/// Converts a full sequence of positioned lines into an output document.
pub trait DocumentWriter {
    /// The finished document.
    type Output;

    /// Writes every line, opening a new page whenever the page index advances.
    fn write(&self, lines: &[PositionedLine]) -> Result<Self::Output, ReportError>;
}

/// Font size in points for each emphasis level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeScale {
    pub title: u8,
    pub heading: u8,
    pub body: u8,
}

impl TypeScale {
    /// Font size used for `emphasis`.
    pub fn size_for(&self, emphasis: Emphasis) -> u8 {
        match emphasis {
            Emphasis::Title => self.title,
            Emphasis::Heading => self.heading,
            Emphasis::Body => self.body,
        }
    }
}

impl Default for TypeScale {
    fn default() -> Self {
        Self {
            title: 18,
            heading: 14,
            body: 12,
        }
    }
}

/// A rendered PDF document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPdf {
    /// Serialized PDF.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
}

impl RenderedPdf {
    /// Writes the document to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        fs::write(path, &self.bytes)?;
        info!(
            "saved {} ({} pages, {} bytes)",
            path.display(),
            self.page_count,
            self.bytes.len()
        );
        Ok(())
    }
}

/// Places every line at its coordinates on A4-sized (by default) PDF pages using the builtin
/// Helvetica faces. Titles and headings are set in bold.
#[derive(Clone, Debug)]
pub struct PdfWriter {
    title: String,
    paper_width_mm: f64,
    paper_height_mm: f64,
    type_scale: TypeScale,
}

impl PdfWriter {
    /// Creates a writer for an A4 portrait document.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            paper_width_mm: 210.0,
            paper_height_mm: 297.0,
            type_scale: TypeScale::default(),
        }
    }

    /// Sets the physical page size.
    pub fn with_paper_size(mut self, width_mm: f64, height_mm: f64) -> Self {
        self.paper_width_mm = width_mm;
        self.paper_height_mm = height_mm;
        self
    }

    /// Sets the font sizes.
    pub fn with_type_scale(mut self, type_scale: TypeScale) -> Self {
        self.type_scale = type_scale;
        self
    }
}

impl DocumentWriter for PdfWriter {
    type Output = RenderedPdf;

    fn write(&self, lines: &[PositionedLine]) -> Result<RenderedPdf, ReportError> {
        let width = Mm(self.paper_width_mm);
        let height = Mm(self.paper_height_mm);
        let (document, first_page, first_layer) =
            PdfDocument::new(self.title.as_str(), width, height, LAYER_NAME);
        let regular = document.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = document.add_builtin_font(BuiltinFont::HelveticaBold)?;

        let mut layer = document.get_page(first_page).get_layer(first_layer);
        let mut current_page = 0;
        for line in lines {
            while current_page < line.page_index {
                let (page, page_layer) = document.add_page(width, height, LAYER_NAME);
                layer = document.get_page(page).get_layer(page_layer);
                current_page += 1;
            }

            let font = match line.emphasis {
                Emphasis::Body => &regular,
                Emphasis::Title | Emphasis::Heading => &bold,
            };
            // PDF coordinates grow upwards from the bottom edge.
            layer.use_text(
                line.text.as_str(),
                self.type_scale.size_for(line.emphasis).into(),
                Mm(line.x),
                Mm(self.paper_height_mm - line.y),
                font,
            );
        }

        let page_count = current_page + 1;
        let mut writer = BufWriter::new(Vec::new());
        document.save(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Io(err.into_error()))?;

        debug!(
            "wrote {} lines onto {} PDF pages ({} bytes)",
            lines.len(),
            page_count,
            bytes.len()
        );
        Ok(RenderedPdf { bytes, page_count })
    }
}

/// Plain-text rendition: one line per positioned line, pages separated by a form feed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextWriter {
    underline_headings: bool,
}

impl TextWriter {
    /// Creates a writer that emits the lines verbatim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlines titles with `=` and headings with `-`.
    pub fn with_underlined_headings(mut self, underline: bool) -> Self {
        self.underline_headings = underline;
        self
    }
}

impl DocumentWriter for TextWriter {
    type Output = String;

    fn write(&self, lines: &[PositionedLine]) -> Result<String, ReportError> {
        let mut output = String::new();
        let mut current_page = 0;
        for line in lines {
            while current_page < line.page_index {
                output.push_str("\u{c}\n");
                current_page += 1;
            }

            output.push_str(&line.text);
            output.push('\n');

            let rule = match line.emphasis {
                Emphasis::Title => Some('='),
                Emphasis::Heading => Some('-'),
                Emphasis::Body => None,
            };
            if let Some(rule) = rule.filter(|_| self.underline_headings) {
                output.extend(std::iter::repeat(rule).take(line.text.chars().count()));
                output.push('\n');
            }
        }
        Ok(output)
    }
}
