use std::fmt;

use serde::{Deserialize, Serialize};

/// Applicant gender; hostels and their trained models are split along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Artifact scan order.
    pub const fn ordered() -> [Self; 2] {
        [Self::Female, Self::Male]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }

    /// Exact, lowercase match only; the artifact directories are named this way.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "female" => Some(Self::Female),
            "male" => Some(Self::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which feature pipeline a semester is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Income, SGPA and district scores; approval taken from the predicted label.
    SgpaBased,
    /// Scaled income and district scores plus KEAM rank; approval when probability > 0.5.
    RankBased,
}

impl PipelineKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SgpaBased => "sgpa_based",
            Self::RankBased => "rank_based",
        }
    }
}

/// Variant-specific attributes of a validated applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pipeline", rename_all = "snake_case")]
pub enum Academics {
    SgpaBased { sgpa: f64 },
    RankBased { keam_rank: u64 },
}

impl Academics {
    pub const fn pipeline(&self) -> PipelineKind {
        match self {
            Self::SgpaBased { .. } => PipelineKind::SgpaBased,
            Self::RankBased { .. } => PipelineKind::RankBased,
        }
    }
}

/// Validated applicant attributes. Only one pipeline's academic fields are ever present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub gender: Gender,
    pub semester: String,
    /// Raw label as submitted; coercion to GENERAL happens at encoding time.
    pub category: String,
    pub income: f64,
    pub district: String,
    pub academics: Academics,
}

impl ApplicantProfile {
    pub const fn pipeline(&self) -> PipelineKind {
        self.academics.pipeline()
    }
}
