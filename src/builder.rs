//! `genpdf` document construction for the tabular report view.

use std::path::PathBuf;

use genpdf::error::{Error, ErrorKind};
use genpdf::style;
use genpdf::elements::Paragraph;
use genpdf::{self, Alignment, Element, Margins, Mm, PageDecorator, Position, Size};

use crate::fonts;

const FOOTER_HEIGHT_MM: i32 = 8;
const HEADER_GAP_MM: i32 = 2;
const RUNNING_HEADER_FONT_SIZE: u8 = 8;

/// Builder for `genpdf::Document` instances used by the table view.
#[derive(Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    paper_size: Option<Size>,
    margins: Option<Margins>,
    font_size: Option<u8>,
    fonts_dir: Option<PathBuf>,
    running_header: Option<String>,
    page_numbers: bool,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Sets the base font size.
    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Searches `dir` before the default font locations.
    pub fn with_fonts_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fonts_dir = dir;
        self
    }

    /// Repeats `text` in small italics at the top of every page after the first.
    pub fn with_running_header(mut self, text: impl Into<String>) -> Self {
        self.running_header = Some(text.into());
        self
    }

    /// Reserves a footer line showing `Page N` on every page.
    pub fn with_page_numbers(mut self, page_numbers: bool) -> Self {
        self.page_numbers = page_numbers;
        self
    }

    /// Loads the fonts and builds the configured `genpdf::Document`.
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::report_font_family(self.fonts_dir.as_deref())?;
        let mut document = genpdf::Document::new(font_family);

        if let Some(title) = self.title {
            document.set_title(title);
        }
        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }
        if let Some(font_size) = self.font_size {
            document.set_font_size(font_size);
        }

        document.set_page_decorator(ReportPageDecorator {
            page: 0,
            margins: self.margins,
            running_header: self.running_header,
            page_numbers: self.page_numbers,
        });

        Ok(document)
    }
}

struct ReportPageDecorator {
    page: usize,
    margins: Option<Margins>,
    running_header: Option<String>,
    page_numbers: bool,
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(text) = self.running_header.as_deref().filter(|_| self.page > 1) {
            let mut header = Paragraph::new(text).styled(
                style::Style::new()
                    .italic()
                    .with_font_size(RUNNING_HEADER_FONT_SIZE),
            );
            let result = header.render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, result.size.height + Mm::from(HEADER_GAP_MM)));
        }

        if self.page_numbers {
            let available = area.size().height;
            let footer_height = Mm::from(FOOTER_HEIGHT_MM);
            if footer_height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer_height));
            let mut footer = Paragraph::new(format!("Page {}", self.page)).aligned(Alignment::Right);
            let result = footer.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Page number does not fit into the reserved footer",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer_height);
        }

        Ok(area)
    }
}
