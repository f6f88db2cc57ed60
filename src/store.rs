//! Record lookup by session identity.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use crate::error::ReportError;
use crate::record::{PatientRecord, SleepStage, SleepStudy, SleepSummary};

/// Source of patient records addressable by identity.
pub trait RecordStore {
    /// Returns the record whose identity matches exactly, if any.
    fn find_by_identity(&self, identity: &str) -> Option<&PatientRecord>;
}

/// Record store backed by a vector held in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryRecordStore {
    records: Vec<PatientRecord>,
}

impl InMemoryRecordStore {
    /// Creates a store over the given records.
    pub fn new(records: impl Into<Vec<PatientRecord>>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Loads a JSON array of records.
    pub fn from_json_reader(reader: impl Read) -> Result<Self, ReportError> {
        let records: Vec<PatientRecord> = serde_json::from_reader(reader)?;
        debug!("loaded {} patient records", records.len());
        Ok(Self::new(records))
    }

    /// Loads a JSON array of records from `path`.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let file = File::open(path.as_ref())?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// The two demonstration records shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(vec![
            PatientRecord {
                email: "shankar91767@gmail.com".into(),
                name: "Abi".into(),
                age: 45,
                gender: "Male".into(),
                hospital: "GEM Hospital".into(),
                doctor: "Dr. Shankar".into(),
                classification: "Sleep Apnea".into(),
                symptoms: "Chest pain, shortness of breath".into(),
                medications: "Metformin, Lisinopril".into(),
                history: "Hypertension, Type 2 Diabetes".into(),
                eeg_file_name: "sleep_study1.edf".into(),
                duration: "7.5 hours".into(),
                sleep_study_data: SleepStudy {
                    patient_id: 101,
                    report_date: "2025-02-17".into(),
                    sleep_summary: SleepSummary {
                        total_sleep_duration: "7h 30m".into(),
                        sleep_efficiency: "85%".into(),
                        apnea_events_detected: 5,
                        ahi: 10,
                        oxygen_desaturation_events: 3,
                    },
                    sleep_stages: vec![
                        stage("Light Sleep", "04:00:00", "53.3%"),
                        stage("Deep Sleep", "02:00:00", "26.7%"),
                        stage("REM Sleep", "01:30:00", "20%"),
                    ],
                    observations: vec![
                        "Mild sleep apnea detected".into(),
                        "Reduced oxygen levels observed.".into(),
                    ],
                    recommendations: vec![
                        "Consult a specialist".into(),
                        "Improve sleeping posture.".into(),
                    ],
                },
            },
            PatientRecord {
                email: "rsdgeethan@email.com".into(),
                name: "Dharshini".into(),
                age: 38,
                gender: "Female".into(),
                hospital: "Gem Hospital".into(),
                doctor: "Dr. Shankar".into(),
                classification: "Normal Sleep".into(),
                symptoms: "Fatigue, mild headaches".into(),
                medications: "None".into(),
                history: "No significant medical history".into(),
                eeg_file_name: "brain_scan2.edf".into(),
                duration: "6 hours".into(),
                sleep_study_data: SleepStudy {
                    patient_id: 102,
                    report_date: "2025-02-18".into(),
                    sleep_summary: SleepSummary {
                        total_sleep_duration: "8h 15m".into(),
                        sleep_efficiency: "92%".into(),
                        apnea_events_detected: 0,
                        ahi: 0,
                        oxygen_desaturation_events: 0,
                    },
                    sleep_stages: vec![
                        stage("Light Sleep", "05:00:00", "60.6%"),
                        stage("Deep Sleep", "02:30:00", "30.3%"),
                        stage("REM Sleep", "00:45:00", "9.1%"),
                    ],
                    observations: vec!["Healthy sleep pattern observed.".into()],
                    recommendations: vec!["Maintain regular sleep schedule.".into()],
                },
            },
        ])
    }
}

impl RecordStore for InMemoryRecordStore {
    fn find_by_identity(&self, identity: &str) -> Option<&PatientRecord> {
        self.records.iter().find(|record| record.email == identity)
    }
}

fn stage(name: &str, duration: &str, percentage: &str) -> SleepStage {
    SleepStage {
        stage: name.into(),
        duration: duration.into(),
        percentage: percentage.into(),
    }
}
