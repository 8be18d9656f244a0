use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::PipelineKind;

/// Per-request outcome. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub total_score: f64,
    pub predicted_percentage: f64,
    pub approved: bool,
}

impl PredictionResult {
    pub fn response(&self) -> PredictionResponse {
        PredictionResponse {
            total_score: self.total_score,
            predicted_percentage: self.predicted_percentage,
            approval_prediction: if self.approved { "Yes" } else { "No" },
        }
    }
}

/// Wire shape returned by `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub total_score: f64,
    pub predicted_percentage: f64,
    pub approval_prediction: &'static str,
}

/// Turns a class-1 probability into the user-facing result.
///
/// The rank-based pipeline reports one decimal place for both the percentage and the
/// total score; the SGPA-based pipeline reports them unrounded.
pub fn interpret(
    probability: f64,
    approved: bool,
    total_score: f64,
    pipeline: PipelineKind,
) -> PredictionResult {
    let percentage = probability * 100.0;
    let (total_score, predicted_percentage) = match pipeline {
        PipelineKind::RankBased => (round_one_decimal(total_score), round_one_decimal(percentage)),
        PipelineKind::SgpaBased => (total_score, percentage),
    };

    PredictionResult {
        total_score,
        predicted_percentage,
        approved,
    }
}

/// Rounds the exact binary value to one decimal, ties to even.
fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Qualitative reading of an admission probability for operator-facing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceBucket {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
}

impl ChanceBucket {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            Self::VeryHigh
        } else if probability >= 0.6 {
            Self::High
        } else if probability >= 0.4 {
            Self::Moderate
        } else if probability >= 0.2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ChanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
