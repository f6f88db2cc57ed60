//! Report configuration loaded from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::DEFAULT_CHART_HOURS;
use crate::error::{LayoutError, ReportError};
use crate::layout::PageLayout;
use crate::writer::TypeScale;

/// File name used when saving the exported report.
pub const DEFAULT_FILE_NAME: &str = "Medical_Report.pdf";
/// A4 portrait width.
pub const DEFAULT_PAPER_WIDTH_MM: f64 = 210.0;
/// A4 portrait height.
pub const DEFAULT_PAPER_HEIGHT_MM: f64 = 297.0;

/// Everything that can be tuned about an export. Every field is optional in the JSON form.
///
/// Loading checks the layout against the paper as well as on its own, so a page that would run
/// off the sheet is rejected before anything is rendered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReportConfig")]
pub struct ReportConfig {
    /// Pagination geometry.
    pub layout: PageLayout,
    /// Physical page width in millimetres.
    pub paper_width_mm: f64,
    /// Physical page height in millimetres.
    pub paper_height_mm: f64,
    /// Name of the saved PDF.
    pub file_name: String,
    /// Font sizes per emphasis level.
    pub type_scale: TypeScale,
    /// Number of hourly samples on the sleep chart.
    pub chart_hours: usize,
    /// Fixed chart seed; a random seed is drawn when absent.
    pub chart_seed: Option<u64>,
    /// Directory containing the TrueType fonts for the table view.
    pub fonts_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            layout: PageLayout::default(),
            paper_width_mm: DEFAULT_PAPER_WIDTH_MM,
            paper_height_mm: DEFAULT_PAPER_HEIGHT_MM,
            file_name: DEFAULT_FILE_NAME.to_owned(),
            type_scale: TypeScale::default(),
            chart_hours: DEFAULT_CHART_HOURS,
            chart_seed: None,
            fonts_dir: None,
        }
    }
}

impl ReportConfig {
    /// Loads a configuration file. Layout errors surface here rather than at render time.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Checks the paper size and that the layout stays on the paper.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (name, value) in [
            ("paper_width_mm", self.paper_width_mm),
            ("paper_height_mm", self.paper_height_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidPaper { name, value });
            }
        }

        if self.layout.page_height() > self.paper_height_mm {
            return Err(LayoutError::ExceedsPaper {
                name: "page_height",
                value: self.layout.page_height(),
                paper: self.paper_height_mm,
            });
        }
        if self.layout.left_margin() >= self.paper_width_mm {
            return Err(LayoutError::ExceedsPaper {
                name: "left_margin",
                value: self.layout.left_margin(),
                paper: self.paper_width_mm,
            });
        }
        Ok(())
    }
}

/// Unvalidated serde mirror of [`ReportConfig`].
#[derive(Deserialize)]
#[serde(default)]
struct RawReportConfig {
    layout: PageLayout,
    paper_width_mm: f64,
    paper_height_mm: f64,
    file_name: String,
    type_scale: TypeScale,
    chart_hours: usize,
    chart_seed: Option<u64>,
    fonts_dir: Option<PathBuf>,
}

impl Default for RawReportConfig {
    fn default() -> Self {
        let defaults = ReportConfig::default();
        Self {
            layout: defaults.layout,
            paper_width_mm: defaults.paper_width_mm,
            paper_height_mm: defaults.paper_height_mm,
            file_name: defaults.file_name,
            type_scale: defaults.type_scale,
            chart_hours: defaults.chart_hours,
            chart_seed: defaults.chart_seed,
            fonts_dir: defaults.fonts_dir,
        }
    }
}

impl TryFrom<RawReportConfig> for ReportConfig {
    type Error = LayoutError;

    fn try_from(raw: RawReportConfig) -> Result<Self, Self::Error> {
        let config = ReportConfig {
            layout: raw.layout,
            paper_width_mm: raw.paper_width_mm,
            paper_height_mm: raw.paper_height_mm,
            file_name: raw.file_name,
            type_scale: raw.type_scale,
            chart_hours: raw.chart_hours,
            chart_seed: raw.chart_seed,
            fonts_dir: raw.fonts_dir,
        };
        config.validate()?;
        Ok(config)
    }
}
