use std::sync::Arc;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::artifacts::{ArtifactError, ArtifactStore, ModelPair};
use super::category::{encode_category, EncoderError};
use super::classifier::ClassifierError;
use super::domain::{Academics, ApplicantProfile, Gender, PipelineKind};
use super::features::{assemble_rank_vector, assemble_sgpa_vector, FeatureVector};
use super::interpret::{interpret, ChanceBucket, PredictionResult};
use super::registry::ModelRegistry;
use super::request::profile_from_json;

/// Routes each applicant to the pipeline its semester is served by and runs inference.
///
/// The rank-based semester reads its model pair from the artifact store on every request,
/// keyed only by gender; every other semester must be present in the registry.
pub struct PredictionDispatcher<S> {
    registry: Arc<ModelRegistry>,
    store: Arc<S>,
    rank_semester: String,
}

/// Everything computed for one prediction; the HTTP response exposes only `result`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub pipeline: PipelineKind,
    pub features: FeatureVector,
    pub probability: f64,
    pub result: PredictionResult,
}

impl PredictionOutcome {
    pub fn chance(&self) -> ChanceBucket {
        ChanceBucket::from_probability(self.probability)
    }
}

impl<S> PredictionDispatcher<S>
where
    S: ArtifactStore + 'static,
{
    pub fn new(registry: Arc<ModelRegistry>, store: Arc<S>, rank_semester: impl Into<String>) -> Self {
        Self {
            registry,
            store,
            rank_semester: rank_semester.into(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn rank_semester(&self) -> &str {
        &self.rank_semester
    }

    pub fn pipeline_for(&self, semester: &str) -> PipelineKind {
        if semester == self.rank_semester {
            PipelineKind::RankBased
        } else {
            PipelineKind::SgpaBased
        }
    }

    /// Validates a raw request body and predicts for it.
    pub fn predict_json(&self, body: &Value) -> Result<PredictionOutcome, PredictionError> {
        let profile = profile_from_json(body, &self.rank_semester)?;
        self.predict(&profile)
    }

    pub fn predict(&self, profile: &ApplicantProfile) -> Result<PredictionOutcome, PredictionError> {
        let expected = self.pipeline_for(&profile.semester);
        if profile.pipeline() != expected {
            return Err(PredictionError::PipelineMismatch {
                semester: profile.semester.clone(),
                expected,
            });
        }

        let outcome = match profile.academics {
            Academics::RankBased { keam_rank } => self.predict_rank(profile, keam_rank)?,
            Academics::SgpaBased { sgpa } => self.predict_sgpa(profile, sgpa)?,
        };

        info!(
            gender = %profile.gender,
            semester = %profile.semester,
            pipeline = outcome.pipeline.label(),
            probability = outcome.probability,
            approved = outcome.result.approved,
            "prediction complete"
        );
        Ok(outcome)
    }

    fn predict_rank(
        &self,
        profile: &ApplicantProfile,
        keam_rank: u64,
    ) -> Result<PredictionOutcome, PredictionError> {
        let pair = self
            .store
            .load_pair(profile.gender, &self.rank_semester)?
            .ok_or_else(|| PredictionError::MissingArtifact {
                gender: profile.gender,
                semester: self.rank_semester.clone(),
            })?;

        let code = encode_category(&profile.category, PipelineKind::RankBased, &pair.encoder)?;
        let features = assemble_rank_vector(profile.income, &profile.district, code, keam_rank);
        let vector = FeatureVector::Rank(features);
        let prediction = run_inference(&pair, &vector)?;

        let approved = prediction.probability > 0.5;
        Ok(PredictionOutcome {
            pipeline: PipelineKind::RankBased,
            features: vector,
            probability: prediction.probability,
            result: interpret(
                prediction.probability,
                approved,
                features.total_score,
                PipelineKind::RankBased,
            ),
        })
    }

    fn predict_sgpa(
        &self,
        profile: &ApplicantProfile,
        sgpa: f64,
    ) -> Result<PredictionOutcome, PredictionError> {
        let pair = self
            .registry
            .lookup(profile.gender, &profile.semester)
            .ok_or_else(|| PredictionError::UnknownGenderOrSemester {
                gender: profile.gender.as_str().to_string(),
                semester: profile.semester.clone(),
            })?;

        let code = encode_category(&profile.category, PipelineKind::SgpaBased, &pair.encoder)?;
        let features = assemble_sgpa_vector(profile.income, sgpa, &profile.district, code);
        let vector = FeatureVector::Sgpa(features);
        let prediction = run_inference(pair, &vector)?;

        let approved = prediction.label == 1;
        Ok(PredictionOutcome {
            pipeline: PipelineKind::SgpaBased,
            features: vector,
            probability: prediction.probability,
            result: interpret(
                prediction.probability,
                approved,
                features.total_score,
                PipelineKind::SgpaBased,
            ),
        })
    }
}

fn run_inference(
    pair: &ModelPair,
    vector: &FeatureVector,
) -> Result<super::classifier::Prediction, PredictionError> {
    let values = vector.values();
    debug!(pipeline = vector.pipeline().label(), features = ?values, "running inference");
    Ok(pair.classifier.predict(&values)?)
}

/// Error raised while validating or serving a prediction.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("missing key: '{0}'")]
    MissingField(&'static str),
    #[error("invalid value for '{field}': {reason}")]
    InvalidFieldValue { field: &'static str, reason: String },
    #[error("invalid gender or semester: no model for gender '{gender}' and semester '{semester}'")]
    UnknownGenderOrSemester { gender: String, semester: String },
    #[error("semester '{semester}' is served by the {} pipeline", .expected.label())]
    PipelineMismatch {
        semester: String,
        expected: PipelineKind,
    },
    #[error("model files not found for {gender}/{semester}")]
    MissingArtifact { gender: Gender, semester: String },
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("category encoding failed: {0}")]
    Encoding(#[from] EncoderError),
    #[error("inference failed: {0}")]
    Inference(#[from] ClassifierError),
}

impl PredictionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::InvalidFieldValue { .. }
            | Self::UnknownGenderOrSemester { .. }
            | Self::PipelineMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::MissingArtifact { .. }
            | Self::Artifact(_)
            | Self::Encoding(_)
            | Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
