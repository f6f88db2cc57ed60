//! Page geometry used by the paginated renderer.
//!
//! All values are in layout units. The bundled writers interpret one unit as one millimetre with
//! `y` growing downwards from the top edge of the page.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Page height matching the reference export (A4 minus the bottom margin).
pub const DEFAULT_PAGE_HEIGHT: f64 = 280.0;
/// First cursor position on a page.
pub const DEFAULT_TOP_MARGIN: f64 = 20.0;
/// Vertical advance per emitted line.
pub const DEFAULT_LINE_HEIGHT: f64 = 10.0;
/// Horizontal position of every emitted line.
pub const DEFAULT_LEFT_MARGIN: f64 = 20.0;

/// Validated, fixed-per-document page geometry.
///
/// A `PageLayout` can only be obtained through validation, so the renderer never has to deal
/// with a configuration that cannot place a single line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPageLayout", into = "RawPageLayout")]
pub struct PageLayout {
    page_height: f64,
    top_margin: f64,
    line_height: f64,
    left_margin: f64,
    page_reset_y: f64,
}

impl PageLayout {
    /// Creates a layout, rejecting geometry on which no line could ever be placed.
    ///
    /// The left margin defaults to [`DEFAULT_LEFT_MARGIN`] and continuation pages restart at
    /// `top_margin`.
    pub fn new(page_height: f64, top_margin: f64, line_height: f64) -> Result<Self, LayoutError> {
        Self::validated(Self {
            page_height,
            top_margin,
            line_height,
            left_margin: DEFAULT_LEFT_MARGIN,
            page_reset_y: top_margin,
        })
    }

    /// Sets the horizontal position of emitted lines.
    pub fn with_left_margin(mut self, left_margin: f64) -> Result<Self, LayoutError> {
        self.left_margin = left_margin;
        Self::validated(self)
    }

    /// Sets the cursor position used on every page after the first.
    pub fn with_page_reset_y(mut self, page_reset_y: f64) -> Result<Self, LayoutError> {
        self.page_reset_y = page_reset_y;
        Self::validated(self)
    }

    /// Usable vertical extent of a page.
    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    /// First cursor position on the first page.
    pub fn top_margin(&self) -> f64 {
        self.top_margin
    }

    /// Vertical advance per line.
    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    /// Horizontal position of every line.
    pub fn left_margin(&self) -> f64 {
        self.left_margin
    }

    /// First cursor position on continuation pages.
    pub fn page_reset_y(&self) -> f64 {
        self.page_reset_y
    }

    /// Number of lines that fit on the first page before a break is forced.
    pub fn lines_on_first_page(&self) -> usize {
        lines_from(self.top_margin, self.page_height, self.line_height)
    }

    /// Number of lines that fit on a continuation page before a break is forced.
    pub fn lines_per_continuation_page(&self) -> usize {
        lines_from(self.page_reset_y, self.page_height, self.line_height)
    }

    fn validated(layout: Self) -> Result<Self, LayoutError> {
        let fields = [
            ("page_height", layout.page_height),
            ("top_margin", layout.top_margin),
            ("line_height", layout.line_height),
            ("left_margin", layout.left_margin),
            ("page_reset_y", layout.page_reset_y),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(LayoutError::NonFinite { name, value });
            }
        }

        if layout.line_height <= 0.0 {
            return Err(LayoutError::NonPositiveLineHeight(layout.line_height));
        }

        for (name, value) in [
            ("top_margin", layout.top_margin),
            ("left_margin", layout.left_margin),
            ("page_reset_y", layout.page_reset_y),
        ] {
            if value < 0.0 {
                return Err(LayoutError::Negative { name, value });
            }
        }

        for (name, value) in [
            ("top_margin", layout.top_margin),
            ("page_reset_y", layout.page_reset_y),
        ] {
            if value >= layout.page_height {
                return Err(LayoutError::StartOutsidePage {
                    name,
                    value,
                    page_height: layout.page_height,
                });
            }
        }

        Ok(layout)
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_height: DEFAULT_PAGE_HEIGHT,
            top_margin: DEFAULT_TOP_MARGIN,
            line_height: DEFAULT_LINE_HEIGHT,
            left_margin: DEFAULT_LEFT_MARGIN,
            page_reset_y: DEFAULT_TOP_MARGIN,
        }
    }
}

// Lines are placed while the cursor is <= page_height; the line that pushes it past starts
// the next page.
fn lines_from(start: f64, page_height: f64, line_height: f64) -> usize {
    ((page_height - start) / line_height).floor() as usize + 1
}

/// Unvalidated serde mirror of [`PageLayout`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
struct RawPageLayout {
    page_height: f64,
    top_margin: f64,
    line_height: f64,
    left_margin: f64,
    page_reset_y: Option<f64>,
}

impl Default for RawPageLayout {
    fn default() -> Self {
        Self {
            page_height: DEFAULT_PAGE_HEIGHT,
            top_margin: DEFAULT_TOP_MARGIN,
            line_height: DEFAULT_LINE_HEIGHT,
            left_margin: DEFAULT_LEFT_MARGIN,
            page_reset_y: None,
        }
    }
}

impl TryFrom<RawPageLayout> for PageLayout {
    type Error = LayoutError;

    fn try_from(raw: RawPageLayout) -> Result<Self, Self::Error> {
        PageLayout::validated(PageLayout {
            page_height: raw.page_height,
            top_margin: raw.top_margin,
            line_height: raw.line_height,
            left_margin: raw.left_margin,
            page_reset_y: raw.page_reset_y.unwrap_or(raw.top_margin),
        })
    }
}

impl From<PageLayout> for RawPageLayout {
    fn from(layout: PageLayout) -> Self {
        Self {
            page_height: layout.page_height,
            top_margin: layout.top_margin,
            line_height: layout.line_height,
            left_margin: layout.left_margin,
            page_reset_y: Some(layout.page_reset_y),
        }
    }
}
