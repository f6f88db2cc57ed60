//! Error types shared across the sleep_report crate.

use std::io;

use thiserror::Error;

/// Rejections produced while validating a [`PageLayout`](crate::layout::PageLayout) or checking
/// it against the paper of a [`ReportConfig`](crate::config::ReportConfig).
///
/// These are configuration errors: they are reported when the layout is built or loaded, never
/// while lines are being placed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A layout dimension was NaN or infinite.
    #[error("layout value `{name}` must be finite, got {value}")]
    NonFinite {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A margin or reset position was negative.
    #[error("layout value `{name}` must not be negative, got {value}")]
    Negative {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The per-line advance was zero or negative.
    #[error("line height must be positive, got {0}")]
    NonPositiveLineHeight(f64),

    /// The first cursor position of a page does not fit on the page.
    #[error("`{name}` ({value}) must be smaller than the page height ({page_height})")]
    StartOutsidePage {
        /// Either `top_margin` or `page_reset_y`.
        name: &'static str,
        /// The rejected start position.
        value: f64,
        /// The configured page height.
        page_height: f64,
    },

    /// A paper dimension was NaN, infinite, zero or negative.
    #[error("paper dimension `{name}` must be a positive number, got {value}")]
    InvalidPaper {
        /// Either `paper_width_mm` or `paper_height_mm`.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The layout reaches past the edge of the paper it is printed on.
    #[error("layout value `{name}` ({value}) does not fit on paper of {paper} mm")]
    ExceedsPaper {
        /// Either `page_height` or `left_margin`.
        name: &'static str,
        /// The rejected layout value.
        value: f64,
        /// The matching paper dimension.
        paper: f64,
    },
}

/// Errors raised while resolving, rendering or saving a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The session carries no identity; the caller should return to the entry screen.
    #[error("no active session; log in before opening the report")]
    MissingIdentity,

    /// The session identity does not match any stored record.
    #[error("no report is available for `{identity}`")]
    RecordNotFound {
        /// The identity that was looked up.
        identity: String,
    },

    /// The page layout was rejected.
    #[error("invalid page layout: {0}")]
    Layout(#[from] LayoutError),

    /// The positioned-line PDF writer failed.
    #[error("failed to write PDF document: {0}")]
    Pdf(#[from] printpdf::Error),

    /// The tabular genpdf view failed (including missing fonts).
    #[error("failed to render table report: {0}")]
    Table(#[from] genpdf::error::Error),

    /// The sleep chart could not be encoded.
    #[error("failed to encode sleep chart: {0}")]
    Chart(#[from] image::ImageError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A JSON configuration or record file was malformed.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    /// Adding the section outline to a rendered PDF failed.
    #[cfg(feature = "bookmarks")]
    #[error("failed to add bookmarks: {0}")]
    Bookmark(#[from] crate::bookmarks::BookmarkError),
}

impl ReportError {
    /// Whether the caller should send the user back to the entry screen instead of showing an
    /// error page.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::MissingIdentity)
    }
}
