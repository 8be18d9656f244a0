//! Validation of raw prediction requests into an [`ApplicantProfile`].

use serde_json::{Map, Value};

use super::dispatcher::PredictionError;
use super::domain::{Academics, ApplicantProfile, Gender, PipelineKind};

const MAX_SGPA: f64 = 10.0;

/// Required keys per pipeline, in the order they are reported when absent.
pub const fn required_fields(pipeline: PipelineKind) -> &'static [&'static str] {
    match pipeline {
        PipelineKind::RankBased => &[
            "gender",
            "semester",
            "income",
            "district",
            "keam_rank",
            "category",
        ],
        PipelineKind::SgpaBased => &[
            "gender", "semester", "income", "sgpa", "district", "category",
        ],
    }
}

/// Builds a validated profile from a JSON request body.
///
/// `semester` decides the pipeline, so it is resolved before the remaining fields. A JSON
/// `null` counts as absent.
pub fn profile_from_json(
    body: &Value,
    rank_semester: &str,
) -> Result<ApplicantProfile, PredictionError> {
    let fields = Fields::new(body)?;

    fields.require("gender")?;
    let semester = fields.string("semester")?;
    let pipeline = if semester == rank_semester {
        PipelineKind::RankBased
    } else {
        PipelineKind::SgpaBased
    };

    for &name in required_fields(pipeline) {
        fields.require(name)?;
    }

    let raw_gender = fields.string("gender")?;
    let income = fields.number("income")?;
    if income < 0.0 {
        return Err(invalid("income", "must not be negative"));
    }

    let academics = match pipeline {
        PipelineKind::RankBased => Academics::RankBased {
            keam_rank: fields.positive_integer("keam_rank")?,
        },
        PipelineKind::SgpaBased => {
            let sgpa = fields.number("sgpa")?;
            if !(0.0..=MAX_SGPA).contains(&sgpa) {
                return Err(invalid("sgpa", "must be between 0.0 and 10.0"));
            }
            Academics::SgpaBased { sgpa }
        }
    };
    let district = fields.string("district")?;
    let category = fields.string("category")?;

    let gender = match (Gender::parse(raw_gender), pipeline) {
        (Some(gender), _) => gender,
        (None, PipelineKind::SgpaBased) => {
            return Err(PredictionError::UnknownGenderOrSemester {
                gender: raw_gender.to_string(),
                semester: semester.to_string(),
            })
        }
        (None, PipelineKind::RankBased) => {
            return Err(invalid("gender", "must be 'male' or 'female'"));
        }
    };

    Ok(ApplicantProfile {
        gender,
        semester: semester.to_string(),
        category: category.to_string(),
        income,
        district: district.to_string(),
        academics,
    })
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PredictionError {
    PredictionError::InvalidFieldValue {
        field,
        reason: reason.into(),
    }
}

struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(body: &'a Value) -> Result<Self, PredictionError> {
        body.as_object()
            .map(|map| Self { map })
            .ok_or_else(|| invalid("body", "expected a JSON object"))
    }

    fn require(&self, name: &'static str) -> Result<&'a Value, PredictionError> {
        match self.map.get(name) {
            None | Some(Value::Null) => Err(PredictionError::MissingField(name)),
            Some(value) => Ok(value),
        }
    }

    fn string(&self, name: &'static str) -> Result<&'a str, PredictionError> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| invalid(name, "expected a string"))
    }

    fn number(&self, name: &'static str) -> Result<f64, PredictionError> {
        self.require(name)?
            .as_f64()
            .filter(|value| value.is_finite())
            .ok_or_else(|| invalid(name, "expected a number"))
    }

    fn positive_integer(&self, name: &'static str) -> Result<u64, PredictionError> {
        let value = self.require(name)?;
        match value.as_u64() {
            Some(0) => Err(invalid(name, "must be greater than 0")),
            Some(rank) => Ok(rank),
            None if value.as_i64().is_some() => Err(invalid(name, "must be greater than 0")),
            None => Err(invalid(name, "expected a positive integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sgpa_body() -> Value {
        json!({
            "gender": "female",
            "semester": "S3",
            "income": 180000,
            "sgpa": 8.4,
            "district": "Kollam",
            "category": "OBC"
        })
    }

    fn rank_body() -> Value {
        json!({
            "gender": "male",
            "semester": "S1",
            "income": 90000.5,
            "district": "Wayanad",
            "keam_rank": 4521,
            "category": "BH"
        })
    }

    #[test]
    fn builds_sgpa_profile() {
        let profile = profile_from_json(&sgpa_body(), "S1").expect("valid body");
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.semester, "S3");
        assert_eq!(profile.income, 180_000.0);
        assert_eq!(profile.academics, Academics::SgpaBased { sgpa: 8.4 });
        assert_eq!(profile.pipeline(), PipelineKind::SgpaBased);
    }

    #[test]
    fn builds_rank_profile_for_rank_semester() {
        let profile = profile_from_json(&rank_body(), "S1").expect("valid body");
        assert_eq!(profile.academics, Academics::RankBased { keam_rank: 4521 });
        assert_eq!(profile.category, "BH");
    }

    #[test]
    fn rank_semester_is_configurable() {
        let mut body = rank_body();
        body["semester"] = json!("S2");
        let profile = profile_from_json(&body, "S2").expect("valid body");
        assert_eq!(profile.pipeline(), PipelineKind::RankBased);
    }

    #[test]
    fn reports_first_missing_field_in_order() {
        let mut body = sgpa_body();
        let map = body.as_object_mut().expect("object");
        map.remove("district");
        map.remove("sgpa");
        match profile_from_json(&body, "S1") {
            Err(PredictionError::MissingField(field)) => assert_eq!(field, "sgpa"),
            other => panic!("expected missing sgpa, got {other:?}"),
        }
    }

    #[test]
    fn rank_variant_requires_keam_rank_not_sgpa() {
        let mut body = rank_body();
        body.as_object_mut().expect("object").remove("keam_rank");
        body["sgpa"] = json!(9.1);
        match profile_from_json(&body, "S1") {
            Err(PredictionError::MissingField(field)) => assert_eq!(field, "keam_rank"),
            other => panic!("expected missing keam_rank, got {other:?}"),
        }
    }

    #[test]
    fn null_counts_as_missing() {
        let mut body = sgpa_body();
        body["category"] = Value::Null;
        assert!(matches!(
            profile_from_json(&body, "S1"),
            Err(PredictionError::MissingField("category"))
        ));
    }

    #[test]
    fn rejects_non_numeric_income() {
        let mut body = sgpa_body();
        body["income"] = json!("two lakh");
        match profile_from_json(&body, "S1") {
            Err(PredictionError::InvalidFieldValue { field, .. }) => assert_eq!(field, "income"),
            other => panic!("expected invalid income, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut body = sgpa_body();
        body["sgpa"] = json!(10.5);
        assert!(matches!(
            profile_from_json(&body, "S1"),
            Err(PredictionError::InvalidFieldValue { field: "sgpa", .. })
        ));

        let mut body = sgpa_body();
        body["income"] = json!(-1);
        assert!(matches!(
            profile_from_json(&body, "S1"),
            Err(PredictionError::InvalidFieldValue { field: "income", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_keam_rank() {
        for rank in [json!(0), json!(-12), json!(12.5), json!("12")] {
            let mut body = rank_body();
            body["keam_rank"] = rank.clone();
            assert!(
                matches!(
                    profile_from_json(&body, "S1"),
                    Err(PredictionError::InvalidFieldValue {
                        field: "keam_rank",
                        ..
                    })
                ),
                "rank {rank}"
            );
        }
    }

    #[test]
    fn unknown_gender_is_reported_per_pipeline() {
        let mut body = sgpa_body();
        body["gender"] = json!("Female");
        match profile_from_json(&body, "S1") {
            Err(PredictionError::UnknownGenderOrSemester { gender, semester }) => {
                assert_eq!(gender, "Female");
                assert_eq!(semester, "S3");
            }
            other => panic!("expected unknown gender/semester, got {other:?}"),
        }

        let mut body = rank_body();
        body["gender"] = json!("other");
        assert!(matches!(
            profile_from_json(&body, "S1"),
            Err(PredictionError::InvalidFieldValue { field: "gender", .. })
        ));
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(matches!(
            profile_from_json(&json!([1, 2, 3]), "S1"),
            Err(PredictionError::InvalidFieldValue { field: "body", .. })
        ));
    }
}
