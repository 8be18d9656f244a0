//! Offline scoring of applicant CSV exports.
//!
//! Each row is turned into the same JSON body `POST /predict` accepts, so batch and
//! HTTP predictions share one validation path. A failing row is reported in the output
//! and does not stop the run.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::scoring::{ArtifactStore, PredictionDispatcher};

#[derive(Debug)]
pub enum BatchError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Io(err) => write!(f, "failed to access applicant file: {}", err),
            BatchError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io(err) => Some(err),
            BatchError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts reported once a batch has been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gender: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    semester: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    income: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    district: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sgpa: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    keam_rank: Option<String>,
}

impl ApplicantRow {
    fn to_request(&self) -> Value {
        let mut body = Map::new();
        let text = [
            ("gender", &self.gender),
            ("semester", &self.semester),
            ("district", &self.district),
            ("category", &self.category),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                body.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        let numeric = [
            ("income", &self.income),
            ("sgpa", &self.sgpa),
            ("keam_rank", &self.keam_rank),
        ];
        for (key, value) in numeric {
            if let Some(value) = value {
                body.insert(key.to_string(), numeric_cell(value));
            }
        }

        Value::Object(body)
    }
}

/// Integers stay integers so rank validation sees them as such; unparseable cells are
/// passed through as text and rejected by request validation.
fn numeric_cell(raw: &str) -> Value {
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::from(integer);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|cell| !cell.trim().is_empty()))
}

#[derive(Debug, Serialize)]
struct ScoredRow {
    row: usize,
    gender: String,
    semester: String,
    total_score: Option<f64>,
    predicted_percentage: Option<f64>,
    approval_prediction: Option<&'static str>,
    chance: Option<&'static str>,
    error: Option<String>,
}

impl ScoredRow {
    fn new(row: usize, gender: String, semester: String) -> Self {
        Self {
            row,
            gender,
            semester,
            total_score: None,
            predicted_percentage: None,
            approval_prediction: None,
            chance: None,
            error: None,
        }
    }
}

pub fn score_file<S, P, Q>(
    dispatcher: &PredictionDispatcher<S>,
    input: P,
    output: Q,
) -> Result<BatchSummary, BatchError>
where
    S: ArtifactStore + 'static,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let reader = std::fs::File::open(input)?;
    let writer = std::fs::File::create(output)?;
    score_batch(dispatcher, reader, writer)
}

/// Scores every row of `reader` and writes one result row per applicant to `writer`.
pub fn score_batch<S, R, W>(
    dispatcher: &PredictionDispatcher<S>,
    reader: R,
    writer: W,
) -> Result<BatchSummary, BatchError>
where
    S: ArtifactStore + 'static,
    R: Read,
    W: Write,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    for (index, record) in csv_reader.deserialize::<ApplicantRow>().enumerate() {
        let number = index + 1;
        let row = match record {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                debug!(row = number, error = %err, "unreadable applicant row");
                let mut scored = ScoredRow::new(number, String::new(), String::new());
                scored.error = Some(err.to_string());
                csv_writer.serialize(scored)?;
                summary.failed += 1;
                continue;
            }
        };
        let mut scored = ScoredRow::new(
            number,
            row.gender.clone().unwrap_or_default(),
            row.semester.clone().unwrap_or_default(),
        );

        match dispatcher.predict_json(&row.to_request()) {
            Ok(outcome) => {
                let response = outcome.result.response();
                scored.total_score = Some(response.total_score);
                scored.predicted_percentage = Some(response.predicted_percentage);
                scored.approval_prediction = Some(response.approval_prediction);
                scored.chance = Some(outcome.chance().label());
                summary.scored += 1;
            }
            Err(err) => {
                debug!(row = number, error = %err, "applicant row rejected");
                scored.error = Some(err.to_string());
                summary.failed += 1;
            }
        }

        csv_writer.serialize(scored)?;
    }

    csv_writer.flush()?;
    info!(
        scored = summary.scored,
        failed = summary.failed,
        "batch scoring complete"
    );
    Ok(summary)
}
