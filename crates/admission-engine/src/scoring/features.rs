//! Assembly of the fixed-order feature vectors consumed by the trained classifiers.
//!
//! The two shapes are distinct types so a rank-based vector can never reach an
//! SGPA-trained classifier by accident. Field order inside each shape is a contract
//! with the training pipeline and is not checked at runtime.

use serde::Serialize;

use super::category::CategoryCode;
use super::domain::PipelineKind;
use super::weightage::{distance_score, income_score};

// Income is rescaled from its 40-point table to 70 points, distance from 20 to 30.
const RANK_INCOME_POINTS: f64 = 70.0;
const INCOME_TABLE_POINTS: f64 = 40.0;
const RANK_DISTANCE_POINTS: f64 = 30.0;
const DISTANCE_TABLE_POINTS: f64 = 20.0;
const INCOME_WEIGHT: f64 = 0.7;
const DISTANCE_WEIGHT: f64 = 0.3;
const SGPA_MULTIPLIER: f64 = 4.0;

/// Shape A: `[income_score, academic_score, distance_score, total_score, category_code]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SgpaFeatures {
    pub income_score: f64,
    pub academic_score: f64,
    pub distance_score: f64,
    pub total_score: f64,
    pub category_code: CategoryCode,
}

impl SgpaFeatures {
    pub fn to_vector(&self) -> [f64; 5] {
        [
            self.income_score,
            self.academic_score,
            self.distance_score,
            self.total_score,
            self.category_code.as_feature(),
        ]
    }
}

/// Shape B: `[scaled_income, scaled_distance, weighted_score, category_code, keam_rank]`.
///
/// `total_score` travels alongside the vector for reporting and deliberately leaves out
/// both the weighted score and the rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankFeatures {
    pub scaled_income: f64,
    pub scaled_distance: f64,
    pub weighted_score: f64,
    pub category_code: CategoryCode,
    pub keam_rank: u64,
    pub total_score: f64,
}

impl RankFeatures {
    pub fn to_vector(&self) -> [f64; 5] {
        [
            self.scaled_income,
            self.scaled_distance,
            self.weighted_score,
            self.category_code.as_feature(),
            self.keam_rank as f64,
        ]
    }
}

/// Feature vector tagged with the shape it was assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FeatureVector {
    Sgpa(SgpaFeatures),
    Rank(RankFeatures),
}

impl FeatureVector {
    pub fn values(&self) -> [f64; 5] {
        match self {
            Self::Sgpa(features) => features.to_vector(),
            Self::Rank(features) => features.to_vector(),
        }
    }

    pub fn total_score(&self) -> f64 {
        match self {
            Self::Sgpa(features) => features.total_score,
            Self::Rank(features) => features.total_score,
        }
    }

    pub const fn pipeline(&self) -> PipelineKind {
        match self {
            Self::Sgpa(_) => PipelineKind::SgpaBased,
            Self::Rank(_) => PipelineKind::RankBased,
        }
    }
}

pub fn assemble_sgpa_vector(
    income: f64,
    sgpa: f64,
    district: &str,
    category_code: CategoryCode,
) -> SgpaFeatures {
    let income_score = income_score(income);
    let academic_score = (sgpa * SGPA_MULTIPLIER).ceil();
    let distance_score = distance_score(district);
    let total_score = income_score + academic_score + distance_score;

    SgpaFeatures {
        income_score,
        academic_score,
        distance_score,
        total_score,
        category_code,
    }
}

pub fn assemble_rank_vector(
    income: f64,
    district: &str,
    category_code: CategoryCode,
    keam_rank: u64,
) -> RankFeatures {
    let scaled_income = income_score(income) * RANK_INCOME_POINTS / INCOME_TABLE_POINTS;
    let scaled_distance = distance_score(district) * RANK_DISTANCE_POINTS / DISTANCE_TABLE_POINTS;
    let weighted_score = scaled_income * INCOME_WEIGHT + scaled_distance * DISTANCE_WEIGHT;
    let total_score = scaled_income + scaled_distance;

    RankFeatures {
        scaled_income,
        scaled_distance,
        weighted_score,
        category_code,
        keam_rank,
        total_score,
    }
}
