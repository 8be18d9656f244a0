//! Reservation categories and the adapter over trained label encoders.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::PipelineKind;

/// Reservation category recognised by the scoring pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    General,
    Bpl,
    Sc,
    St,
    Obc,
    Oec,
    /// Only the rank-based models were trained with this label.
    Bh,
}

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Bpl => "BPL",
            Self::Sc => "SC",
            Self::St => "ST",
            Self::Obc => "OBC",
            Self::Oec => "OEC",
            Self::Bh => "BH",
        }
    }

    /// Categories a pipeline passes to its encoder untouched.
    pub const fn accepted_by(pipeline: PipelineKind) -> &'static [Category] {
        match pipeline {
            PipelineKind::SgpaBased => &[
                Self::Sc,
                Self::St,
                Self::Obc,
                Self::General,
                Self::Bpl,
                Self::Oec,
            ],
            PipelineKind::RankBased => &[
                Self::General,
                Self::Bpl,
                Self::Sc,
                Self::St,
                Self::Obc,
                Self::Oec,
                Self::Bh,
            ],
        }
    }

    /// Resolves a raw label for `pipeline`, coercing anything unrecognised to GENERAL.
    pub fn coerce(label: &str, pipeline: PipelineKind) -> Self {
        Self::accepted_by(pipeline)
            .iter()
            .copied()
            .find(|category| category.label() == label)
            .unwrap_or(Self::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer produced by one encoder instance. Codes from different encoders are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryCode(pub i64);

impl CategoryCode {
    pub fn as_feature(self) -> f64 {
        self.0 as f64
    }
}

/// Trained label encoder: a label's code is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    classes: Vec<String>,
}

impl CategoryEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn transform(&self, label: &str) -> Result<CategoryCode, EncoderError> {
        self.classes
            .iter()
            .position(|class| class == label)
            .map(|index| CategoryCode(index as i64))
            .ok_or_else(|| EncoderError::UnseenLabel(label.to_string()))
    }

    /// Fails when the fallback category itself cannot be encoded.
    pub fn ensure_default_encodable(&self) -> Result<(), EncoderError> {
        self.transform(Category::General.label())
            .map(|_| ())
            .map_err(|_| EncoderError::MissingDefault)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncoderError {
    #[error("category encoder has no code for label '{0}'")]
    UnseenLabel(String),
    #[error("category encoder cannot encode the GENERAL fallback")]
    MissingDefault,
}

/// Encodes `label` with `encoder` after applying the pipeline's coercion policy.
pub fn encode_category(
    label: &str,
    pipeline: PipelineKind,
    encoder: &CategoryEncoder,
) -> Result<CategoryCode, EncoderError> {
    let category = Category::coerce(label, pipeline);
    if category.label() != label {
        tracing::debug!(
            submitted = label,
            coerced = category.label(),
            "unrecognised category coerced"
        );
    }
    encoder.transform(category.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_encoder() -> CategoryEncoder {
        CategoryEncoder::new(["BPL", "GENERAL", "OBC", "OEC", "SC", "ST"])
    }

    #[test]
    fn known_labels_use_encoder_positions() {
        let encoder = sorted_encoder();
        assert_eq!(
            encode_category("SC", PipelineKind::SgpaBased, &encoder),
            Ok(CategoryCode(4))
        );
        assert_eq!(
            encode_category("BPL", PipelineKind::SgpaBased, &encoder),
            Ok(CategoryCode(0))
        );
    }

    #[test]
    fn unknown_labels_encode_as_general() {
        let encoder = sorted_encoder();
        let general = encoder.transform("GENERAL").expect("general encodes");
        for label in ["", "sc", "NRI", "General", "EWS"] {
            assert_eq!(
                encode_category(label, PipelineKind::SgpaBased, &encoder),
                Ok(general),
                "label {label:?}"
            );
        }
    }

    #[test]
    fn bh_is_only_accepted_by_rank_pipeline() {
        assert_eq!(Category::coerce("BH", PipelineKind::RankBased), Category::Bh);
        assert_eq!(Category::coerce("BH", PipelineKind::SgpaBased), Category::General);

        let encoder = CategoryEncoder::new(["BH", "BPL", "GENERAL", "OBC", "OEC", "SC", "ST"]);
        assert_eq!(
            encode_category("BH", PipelineKind::SgpaBased, &encoder),
            Ok(CategoryCode(2))
        );
        assert_eq!(
            encode_category("BH", PipelineKind::RankBased, &encoder),
            Ok(CategoryCode(0))
        );
    }

    #[test]
    fn codes_are_scoped_to_their_encoder() {
        let first = CategoryEncoder::new(["GENERAL", "SC"]);
        let second = CategoryEncoder::new(["SC", "GENERAL"]);
        assert_ne!(first.transform("SC"), second.transform("SC"));
    }

    #[test]
    fn missing_general_is_a_configuration_error() {
        let encoder = CategoryEncoder::new(["SC", "ST"]);
        assert_eq!(
            encoder.ensure_default_encodable(),
            Err(EncoderError::MissingDefault)
        );
        assert!(sorted_encoder().ensure_default_encodable().is_ok());
    }

    #[test]
    fn accepted_label_absent_from_encoder_is_reported() {
        let encoder = CategoryEncoder::new(["GENERAL", "SC"]);
        assert_eq!(
            encode_category("OBC", PipelineKind::SgpaBased, &encoder),
            Err(EncoderError::UnseenLabel("OBC".to_string()))
        );
    }
}
