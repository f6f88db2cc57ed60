//! Report page construction: resolve the session's record and export it.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chart::{self, ChartPoint};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::record::{PatientRecord, REPORT_TITLE};
use crate::render::{render, PositionedLine};
use crate::session::Session;
use crate::store::RecordStore;
use crate::table;
use crate::writer::{DocumentWriter, PdfWriter, RenderedPdf, TextWriter};

/// Looks up the record for the session's identity.
///
/// An anonymous session yields [`ReportError::MissingIdentity`]; an identity without a record
/// yields [`ReportError::RecordNotFound`].
pub fn resolve_record<'s, S>(session: &Session, store: &'s S) -> Result<&'s PatientRecord, ReportError>
where
    S: RecordStore + ?Sized,
{
    let identity = session.identity().ok_or(ReportError::MissingIdentity)?;
    store
        .find_by_identity(identity)
        .ok_or_else(|| ReportError::RecordNotFound {
            identity: identity.to_owned(),
        })
}

/// Runs the export pipelines for a resolved record.
#[derive(Clone, Debug, Default)]
pub struct ReportExporter {
    config: ReportConfig,
}

impl ReportExporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Flattens and paginates `record`.
    pub fn layout_lines(&self, record: &PatientRecord) -> Vec<PositionedLine> {
        let lines = render(&record.to_instructions(), &self.config.layout);
        debug!("laid out {} lines for {}", lines.len(), record.email);
        lines
    }

    /// The positioned-line PDF export.
    pub fn export_pdf(&self, record: &PatientRecord) -> Result<RenderedPdf, ReportError> {
        let lines = self.layout_lines(record);
        self.pdf_writer()?.write(&lines)
    }

    /// The PDF export with one outline entry per section.
    #[cfg(feature = "bookmarks")]
    pub fn export_pdf_with_bookmarks(
        &self,
        record: &PatientRecord,
    ) -> Result<RenderedPdf, ReportError> {
        let lines = self.layout_lines(record);
        self.pdf_writer()?
            .write(&lines)?
            .with_section_bookmarks(&lines)
    }

    /// Plain-text rendition of the export.
    pub fn export_text(&self, record: &PatientRecord) -> Result<String, ReportError> {
        let lines = self.layout_lines(record);
        TextWriter::new()
            .with_underlined_headings(true)
            .write(&lines)
    }

    /// Sleep chart series, seeded from the configuration when a seed is set.
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        let mut rng = match self.config.chart_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        chart::generate_series(&mut rng, self.config.chart_hours)
    }

    /// Tabular view with the sleep chart.
    pub fn export_table(
        &self,
        record: &PatientRecord,
        series: &[ChartPoint],
    ) -> Result<Vec<u8>, ReportError> {
        table::render_table_report(record, series, &self.config)
    }

    /// Saves `pdf` under the configured file name inside `dir` and returns the full path.
    pub fn save(&self, pdf: &RenderedPdf, dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.config.file_name);
        pdf.save(&path)?;
        info!("report saved to {}", path.display());
        Ok(path)
    }

    fn pdf_writer(&self) -> Result<PdfWriter, ReportError> {
        self.config.validate()?;
        Ok(PdfWriter::new(REPORT_TITLE)
            .with_paper_size(self.config.paper_width_mm, self.config.paper_height_mm)
            .with_type_scale(self.config.type_scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;

    #[test]
    fn anonymous_session_requires_login() {
        let store = InMemoryRecordStore::builtin();
        let err = resolve_record(&Session::anonymous(), &store).unwrap_err();
        assert!(err.requires_login());
    }

    #[test]
    fn unknown_identity_is_not_found() {
        let store = InMemoryRecordStore::builtin();
        let err = resolve_record(&Session::with_identity("nobody@example.com"), &store).unwrap_err();
        assert!(matches!(
            err,
            ReportError::RecordNotFound { ref identity } if identity == "nobody@example.com"
        ));
    }

    #[test]
    fn resolves_through_trait_object() {
        let store = InMemoryRecordStore::builtin();
        let dyn_store: &dyn RecordStore = &store;
        let record =
            resolve_record(&Session::with_identity("shankar91767@gmail.com"), dyn_store).unwrap();
        assert_eq!(record.name, "Abi");
    }

    #[test]
    fn text_export_contains_every_section() {
        let store = InMemoryRecordStore::builtin();
        let record = &store.records()[1];
        let text = ReportExporter::default().export_text(record).unwrap();

        for section in [
            "Patient Details",
            "Sleep Study Data",
            "Sleep Summary",
            "Sleep Stages",
            "Observations",
            "Recommendations",
        ] {
            assert!(text.contains(section), "missing {section}");
        }
        assert!(text.contains("Name: Dharshini\n"));
        assert!(text.contains("oxygen Desaturation Events: 0\n"));
    }

    #[test]
    fn pdf_export_rejects_a_page_taller_than_the_paper() {
        let store = InMemoryRecordStore::builtin();
        let config = ReportConfig {
            layout: crate::PageLayout::new(400.0, 20.0, 10.0).unwrap(),
            ..ReportConfig::default()
        };

        let err = ReportExporter::new(config)
            .export_pdf(&store.records()[0])
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Layout(crate::LayoutError::ExceedsPaper { name: "page_height", .. })
        ));
    }

    #[test]
    fn seeded_chart_is_reproducible() {
        let config = ReportConfig {
            chart_seed: Some(11),
            ..ReportConfig::default()
        };
        let exporter = ReportExporter::new(config);
        assert_eq!(exporter.chart_series(), exporter.chart_series());
        assert_eq!(exporter.chart_series(), chart::seeded_series(11, 10));
    }

    #[test]
    fn saves_under_configured_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryRecordStore::builtin();
        let exporter = ReportExporter::default();
        let pdf = exporter.export_pdf(&store.records()[0]).unwrap();

        let path = exporter.save(&pdf, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Medical_Report.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), pdf.bytes);
        assert_eq!(pdf.page_count, 2);
    }
}
