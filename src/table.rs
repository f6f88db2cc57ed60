//! Tabular rendition of a patient record, mirroring the on-screen report page.
//!
//! Unlike the positioned-line export, this view flows through `genpdf`: every section is a
//! framed two-column table and the sleep chart is embedded as an image.

use genpdf::elements::{Break, FrameCellDecorator, Image, LinearLayout, Paragraph, TableLayout};
use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{Alignment, Element, Scale, Size};
use image::DynamicImage;
use log::debug;

use crate::builder::DocumentBuilder;
use crate::chart::{self, ChartPoint, SleepPhase};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::label::humanize_label;
use crate::record::{PatientRecord, REPORT_TITLE};

const CHART_WIDTH_PX: u32 = 800;
const CHART_HEIGHT_PX: u32 = 300;
const CHART_SCALE: f64 = 2.0;
const BODY_FONT_SIZE: u8 = 10;
const PAGE_MARGIN_MM: i32 = 15;

/// Renders the table view of `record` with `series` as the sleep analysis chart.
pub fn render_table_report(
    record: &PatientRecord,
    series: &[ChartPoint],
    config: &ReportConfig,
) -> Result<Vec<u8>, ReportError> {
    let mut document = DocumentBuilder::new()
        .with_title(REPORT_TITLE)
        .with_paper_size(Size::new(config.paper_width_mm, config.paper_height_mm))
        .with_margins(PAGE_MARGIN_MM)
        .with_font_size(BODY_FONT_SIZE)
        .with_fonts_dir(config.fonts_dir.clone())
        .with_running_header(format!("{} - {}", REPORT_TITLE, record.name))
        .with_page_numbers(true)
        .build()?;

    document.push(heading(REPORT_TITLE, config.type_scale.title));
    document.push(Break::new(1));

    document.push(heading("Patient Details", config.type_scale.heading));
    document.push(rows_to_layout(&patient_details_rows(record))?);
    document.push(Break::new(1));

    document.push(heading("Sleep Study Data", config.type_scale.heading));
    document.push(rows_to_layout(&sleep_study_rows(record))?);
    document.push(Break::new(1));

    document.push(heading("Sleep Analysis", config.type_scale.heading));
    let chart = DynamicImage::ImageRgb8(chart::rasterize(series, CHART_WIDTH_PX, CHART_HEIGHT_PX));
    document.push(
        Image::from_dynamic_image(chart)?
            .with_alignment(Alignment::Center)
            .with_scale(Scale::new(CHART_SCALE, CHART_SCALE)),
    );
    document.push(Paragraph::new(phase_legend()).aligned(Alignment::Center));

    let mut bytes = Vec::new();
    document.render(&mut bytes)?;
    debug!(
        "rendered table report for {} ({} bytes)",
        record.email,
        bytes.len()
    );
    Ok(bytes)
}

fn heading(text: &str, size: u8) -> impl Element {
    Paragraph::new(text).styled(Style::new().bold().with_font_size(size))
}

/// One row of a report table. Group titles and free-text entries span the full width.
#[derive(Clone, Debug, PartialEq, Eq)]
enum TableRow {
    Pair(String, String),
    Group(String),
    Text(String),
}

impl TableRow {
    fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Pair(key.into(), value.into())
    }

    fn spans_row(&self) -> bool {
        !matches!(self, Self::Pair(..))
    }
}

fn framed_table(columns: Vec<usize>) -> TableLayout {
    let mut table = TableLayout::new(columns);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    table
}

fn cell(text: &str) -> impl Element {
    Paragraph::new(text).padded(1)
}

// genpdf tables have no column spans, so each run of spanning rows becomes its own
// single-column table stacked between the two-column ones.
fn rows_to_layout(rows: &[TableRow]) -> Result<LinearLayout, Error> {
    let mut layout = LinearLayout::vertical();
    let mut start = 0;
    while start < rows.len() {
        let spanning = rows[start].spans_row();
        let end = rows[start..]
            .iter()
            .position(|row| row.spans_row() != spanning)
            .map_or(rows.len(), |offset| start + offset);

        let mut table = framed_table(if spanning { vec![1] } else { vec![1, 2] });
        for row in &rows[start..end] {
            match row {
                TableRow::Pair(key, value) => {
                    table.row().element(cell(key)).element(cell(value)).push()?
                }
                TableRow::Group(title) => table
                    .row()
                    .element(
                        Paragraph::new(title.as_str())
                            .styled(Style::new().bold())
                            .padded(1),
                    )
                    .push()?,
                TableRow::Text(text) => table.row().element(cell(text)).push()?,
            }
        }
        layout.push(table);
        start = end;
    }
    Ok(layout)
}

fn patient_details_rows(record: &PatientRecord) -> Vec<TableRow> {
    record
        .detail_rows()
        .into_iter()
        .map(|(key, value)| TableRow::Pair(key, value))
        .collect()
}

fn sleep_study_rows(record: &PatientRecord) -> Vec<TableRow> {
    let study = &record.sleep_study_data;
    let mut rows = vec![
        TableRow::pair("Patient ID", study.patient_id.to_string()),
        TableRow::pair("Report Date", study.report_date.as_str()),
        TableRow::Group("Sleep Summary".into()),
    ];
    rows.extend(
        study
            .sleep_summary
            .entries()
            .into_iter()
            .map(|(key, value)| TableRow::pair(humanize_label(key), value)),
    );

    rows.push(TableRow::Group("Sleep Stages".into()));
    rows.extend(
        study
            .sleep_stages
            .iter()
            .map(|stage| TableRow::pair(stage.stage.as_str(), stage.summary())),
    );

    rows.push(TableRow::Group("Observations".into()));
    rows.extend(study.observations.iter().cloned().map(TableRow::Text));

    rows.push(TableRow::Group("Recommendations".into()));
    rows.extend(study.recommendations.iter().cloned().map(TableRow::Text));
    rows
}

/// Caption explaining the chart's y-axis, e.g. `"0 = Awake, 1 = REM, ..."`.
fn phase_legend() -> String {
    SleepPhase::ALL
        .iter()
        .map(|phase| format!("{} = {}", phase.value(), phase))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;

    #[test]
    fn free_text_rows_span_the_table() {
        let store = InMemoryRecordStore::builtin();
        let rows = sleep_study_rows(&store.records()[0]);

        let observations = rows
            .iter()
            .position(|row| *row == TableRow::Group("Observations".into()))
            .unwrap();
        assert_eq!(
            rows[observations + 1..],
            [
                TableRow::Text("Mild sleep apnea detected".into()),
                TableRow::Text("Reduced oxygen levels observed.".into()),
                TableRow::Group("Recommendations".into()),
                TableRow::Text("Consult a specialist".into()),
                TableRow::Text("Improve sleeping posture.".into()),
            ]
        );
    }

    #[test]
    fn sleep_study_rows_start_with_identifiers() {
        let store = InMemoryRecordStore::builtin();
        let record = &store.records()[1];
        let rows = sleep_study_rows(record);
        assert_eq!(
            rows[1],
            TableRow::pair("Report Date", record.sleep_study_data.report_date.as_str())
        );
        assert_eq!(rows[2], TableRow::Group("Sleep Summary".into()));
        assert!(!rows[3].spans_row());
    }

    #[test]
    fn legend_lists_every_phase_in_axis_order() {
        assert_eq!(
            phase_legend(),
            "0 = Awake, 1 = REM, 2 = Light Sleep, 3 = Normal Sleep, 4 = Deep Sleep, 5 = Extreme Sleep"
        );
    }
}
