//! Hostel admission scoring: weightage tables, feature assembly, model dispatch.
//!
//! Two feature pipelines exist. The configured rank semester (S1 by default) scores
//! applicants on KEAM rank with a model pair read from disk per request; every other
//! semester scores on SGPA against a registry loaded once at startup.

pub mod artifacts;
pub mod category;
pub mod classifier;
pub mod dispatcher;
pub mod domain;
pub mod features;
pub mod interpret;
pub mod registry;
pub mod request;
pub mod router;
pub mod weightage;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactError, ArtifactStore, FilesystemArtifactStore, ModelPair};
pub use category::{encode_category, Category, CategoryCode, CategoryEncoder, EncoderError};
pub use classifier::{Classifier, ClassifierArtifact, ClassifierError, Prediction};
pub use dispatcher::{PredictionDispatcher, PredictionError, PredictionOutcome};
pub use domain::{Academics, ApplicantProfile, Gender, PipelineKind};
pub use features::{
    assemble_rank_vector, assemble_sgpa_vector, FeatureVector, RankFeatures, SgpaFeatures,
};
pub use interpret::{interpret, ChanceBucket, PredictionResponse, PredictionResult};
pub use registry::{ModelRegistry, RegistryError, RegistryKey};
pub use request::{profile_from_json, required_fields};
pub use router::prediction_router;
pub use weightage::{distance_score, income_score};
