//! Patient records and their flattening into render instructions.
//!
//! The field names follow the camelCase keys of the record files so that JSON exported by other
//! tools can be loaded as-is.

use serde::{Deserialize, Serialize};

use crate::label::humanize_label;
use crate::render::RenderInstruction;

/// Title drawn at the top of every exported report.
pub const REPORT_TITLE: &str = "Medical Report";

/// A patient and the sleep study attached to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Identity used to look the record up.
    pub email: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub hospital: String,
    pub doctor: String,
    pub classification: String,
    pub symptoms: String,
    pub medications: String,
    pub history: String,
    pub eeg_file_name: String,
    /// Recording duration as written by the clinic, e.g. `"7.5 hours"`.
    pub duration: String,
    pub sleep_study_data: SleepStudy,
}

/// Results of a single overnight study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepStudy {
    #[serde(rename = "patientID")]
    pub patient_id: u32,
    pub report_date: String,
    pub sleep_summary: SleepSummary,
    pub sleep_stages: Vec<SleepStage>,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Headline figures of a sleep study.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSummary {
    pub total_sleep_duration: String,
    pub sleep_efficiency: String,
    pub apnea_events_detected: u32,
    /// Apnea-hypopnea index.
    #[serde(rename = "AHI")]
    pub ahi: u32,
    pub oxygen_desaturation_events: u32,
}

impl SleepSummary {
    /// Summary values keyed by their camelCase names, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("totalSleepDuration", self.total_sleep_duration.clone()),
            ("sleepEfficiency", self.sleep_efficiency.clone()),
            ("apneaEventsDetected", self.apnea_events_detected.to_string()),
            ("AHI", self.ahi.to_string()),
            (
                "oxygenDesaturationEvents",
                self.oxygen_desaturation_events.to_string(),
            ),
        ]
    }
}

/// Time spent in one sleep stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStage {
    pub stage: String,
    /// `HH:MM:SS`.
    pub duration: String,
    /// Share of the total sleep time, e.g. `"26.7%"`.
    pub percentage: String,
}

impl SleepStage {
    /// Value column for the stage, e.g. `"02:00:00 (26.7%)"`.
    pub fn summary(&self) -> String {
        format!("{} ({})", self.duration, self.percentage)
    }
}

impl PatientRecord {
    /// Flattens the record into the ordered instruction list of the exported report.
    pub fn to_instructions(&self) -> Vec<RenderInstruction> {
        let study = &self.sleep_study_data;
        let mut instructions = vec![
            RenderInstruction::title(REPORT_TITLE),
            RenderInstruction::section("Patient Details"),
            RenderInstruction::field("Name", &self.name),
            RenderInstruction::field("Age", self.age),
            RenderInstruction::field("Gender", &self.gender),
            RenderInstruction::field("Hospital", &self.hospital),
            RenderInstruction::field("Doctor", &self.doctor),
            RenderInstruction::field("EEG File Name", &self.eeg_file_name),
            RenderInstruction::field("Duration", &self.duration),
            RenderInstruction::field("Final Classification", &self.classification),
            RenderInstruction::field("Symptoms", &self.symptoms),
            RenderInstruction::field("Medications", &self.medications),
            RenderInstruction::field("Medical History", &self.history),
            RenderInstruction::section("Sleep Study Data"),
            RenderInstruction::field("Patient ID", study.patient_id),
            RenderInstruction::field("Report Date", &study.report_date),
            RenderInstruction::section("Sleep Summary"),
        ];

        instructions.extend(
            study
                .sleep_summary
                .entries()
                .into_iter()
                .map(|(key, value)| RenderInstruction::field(key, value)),
        );

        instructions.push(RenderInstruction::section("Sleep Stages"));
        instructions.extend(
            study
                .sleep_stages
                .iter()
                .map(|stage| RenderInstruction::field(&stage.stage, stage.summary())),
        );

        instructions.push(RenderInstruction::section("Observations"));
        instructions.extend(
            study
                .observations
                .iter()
                .map(|observation| RenderInstruction::field("Observation", observation)),
        );

        instructions.push(RenderInstruction::section("Recommendations"));
        instructions.extend(
            study
                .recommendations
                .iter()
                .map(|recommendation| RenderInstruction::field("Recommendation", recommendation)),
        );

        instructions
    }

    /// Rows of the on-screen "Patient Details" table: every demographic field with its
    /// humanized key, in declaration order.
    pub fn detail_rows(&self) -> Vec<(String, String)> {
        [
            ("email", self.email.clone()),
            ("name", self.name.clone()),
            ("age", self.age.to_string()),
            ("gender", self.gender.clone()),
            ("hospital", self.hospital.clone()),
            ("doctor", self.doctor.clone()),
            ("classification", self.classification.clone()),
            ("symptoms", self.symptoms.clone()),
            ("medications", self.medications.clone()),
            ("history", self.history.clone()),
            ("eegFileName", self.eeg_file_name.clone()),
            ("duration", self.duration.clone()),
        ]
        .into_iter()
        .map(|(key, value)| (humanize_label(key), value))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use crate::render::{render, Emphasis};
    use crate::store::InMemoryRecordStore;

    fn first_record() -> PatientRecord {
        InMemoryRecordStore::builtin().records()[0].clone()
    }

    #[test]
    fn flattening_follows_export_order() {
        let record = first_record();
        let lines = render(&record.to_instructions(), &PageLayout::default());
        let texts: Vec<_> = lines.iter().map(|line| line.text.as_str()).collect();

        assert_eq!(texts[0], "Medical Report");
        assert_eq!(texts[1], "Patient Details");
        assert_eq!(texts[2], "Name: Abi");
        assert_eq!(texts[3], "Age: 45");
        assert_eq!(texts[7], "EEG File Name: sleep_study1.edf");
        assert_eq!(texts[13], "Sleep Study Data");
        assert_eq!(texts[14], "Patient ID: 101");
        assert_eq!(texts[17], "total Sleep Duration: 7h 30m");
        assert_eq!(texts[20], "A H I: 10");
        assert_eq!(texts[23], "Light Sleep: 04:00:00 (53.3%)");
        assert_eq!(texts[27], "Observation: Mild sleep apnea detected");
        assert_eq!(texts.last(), Some(&"Recommendation: Improve sleeping posture."));
    }

    #[test]
    fn header_lines_keep_reference_positions() {
        let lines = render(&first_record().to_instructions(), &PageLayout::default());

        assert_eq!((lines[0].y, lines[0].emphasis), (20.0, Emphasis::Title));
        assert_eq!((lines[1].y, lines[1].emphasis), (30.0, Emphasis::Heading));
        assert_eq!(lines[2].y, 40.0);
    }

    #[test]
    fn first_record_spans_two_pages() {
        let record = first_record();
        let instructions = record.to_instructions();
        // 17 fixed lines, 5 summary, 1 + 3 stages, 1 + 2 observations, 1 + 2 recommendations.
        assert_eq!(instructions.len(), 32);

        let lines = render(&instructions, &PageLayout::default());
        assert_eq!(lines[26].page_index, 0);
        assert_eq!(lines[27].page_index, 1);
        assert_eq!(lines[27].y, 20.0);
    }

    #[test]
    fn detail_rows_use_humanized_keys() {
        let rows = first_record().detail_rows();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0], ("email".to_owned(), "shankar91767@gmail.com".to_owned()));
        assert_eq!(rows[10], ("eeg File Name".to_owned(), "sleep_study1.edf".to_owned()));
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "email": "a@example.com", "name": "A", "age": 30, "gender": "Female",
            "hospital": "H", "doctor": "D", "classification": "Normal Sleep",
            "symptoms": "None", "medications": "None", "history": "None",
            "eegFileName": "a.edf", "duration": "8 hours",
            "sleepStudyData": {
                "patientID": 7, "reportDate": "2025-01-01",
                "sleepSummary": {
                    "totalSleepDuration": "8h", "sleepEfficiency": "90%",
                    "apneaEventsDetected": 0, "AHI": 1, "oxygenDesaturationEvents": 0
                },
                "sleepStages": [{"stage": "REM Sleep", "duration": "01:00:00", "percentage": "12.5%"}],
                "observations": [], "recommendations": []
            }
        }"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.eeg_file_name, "a.edf");
        assert_eq!(record.sleep_study_data.patient_id, 7);
        assert_eq!(record.sleep_study_data.sleep_summary.ahi, 1);
    }
}
