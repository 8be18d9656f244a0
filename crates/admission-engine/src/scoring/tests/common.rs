use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::scoring::artifacts::{ArtifactError, ArtifactStore, ModelPair};
use crate::scoring::category::CategoryEncoder;
use crate::scoring::classifier::{Classifier, ClassifierError, Prediction};
use crate::scoring::domain::Gender;
use crate::scoring::registry::ModelRegistry;
use crate::scoring::{prediction_router, PredictionDispatcher};

/// Classifier returning a canned prediction and remembering every vector it was given.
#[derive(Debug, Default)]
pub(super) struct FixedClassifier {
    label: i64,
    probability: f64,
    seen: Mutex<Vec<Vec<f64>>>,
}

impl FixedClassifier {
    pub(super) fn new(label: i64, probability: f64) -> Arc<Self> {
        Arc::new(Self {
            label,
            probability,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().expect("classifier mutex poisoned").clone()
    }
}

impl Classifier for FixedClassifier {
    fn predict(&self, features: &[f64]) -> Result<Prediction, ClassifierError> {
        self.seen
            .lock()
            .expect("classifier mutex poisoned")
            .push(features.to_vec());
        Ok(Prediction {
            label: self.label,
            probability: self.probability,
        })
    }
}

#[derive(Debug)]
pub(super) struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _features: &[f64]) -> Result<Prediction, ClassifierError> {
        Err(ClassifierError::NonFiniteOutput)
    }
}

pub(super) fn sgpa_encoder() -> CategoryEncoder {
    CategoryEncoder::new(["BPL", "GENERAL", "OBC", "OEC", "SC", "ST"])
}

pub(super) fn rank_encoder() -> CategoryEncoder {
    CategoryEncoder::new(["BH", "BPL", "GENERAL", "OBC", "OEC", "SC", "ST"])
}

pub(super) fn pair(classifier: Arc<dyn Classifier>, encoder: CategoryEncoder) -> ModelPair {
    ModelPair::new(classifier, encoder)
}

/// In-memory artifact store counting how often the rank pair is read.
#[derive(Default)]
pub(super) struct MemoryStore {
    pairs: Mutex<HashMap<(Gender, String), ModelPair>>,
    loads: AtomicUsize,
}

impl MemoryStore {
    pub(super) fn with(self, gender: Gender, semester: &str, pair: ModelPair) -> Self {
        self.pairs
            .lock()
            .expect("store mutex poisoned")
            .insert((gender, semester.to_string()), pair);
        self
    }

    pub(super) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ArtifactStore for MemoryStore {
    fn semesters(&self, gender: Gender) -> Result<Vec<String>, ArtifactError> {
        let guard = self.pairs.lock().expect("store mutex poisoned");
        Ok(guard
            .keys()
            .filter(|(owner, _)| *owner == gender)
            .map(|(_, semester)| semester.clone())
            .collect())
    }

    fn load_pair(&self, gender: Gender, semester: &str) -> Result<Option<ModelPair>, ArtifactError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let guard = self.pairs.lock().expect("store mutex poisoned");
        Ok(guard.get(&(gender, semester.to_string())).cloned())
    }
}

pub(super) struct UnreadableStore;

impl ArtifactStore for UnreadableStore {
    fn semesters(&self, _gender: Gender) -> Result<Vec<String>, ArtifactError> {
        Ok(Vec::new())
    }

    fn load_pair(&self, _gender: Gender, _semester: &str) -> Result<Option<ModelPair>, ArtifactError> {
        Err(ArtifactError::Io {
            path: PathBuf::from("MODELS/male/S1/hostel_admission_model.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        })
    }
}

pub(super) fn dispatcher<S>(registry: ModelRegistry, store: S) -> PredictionDispatcher<S>
where
    S: ArtifactStore + 'static,
{
    PredictionDispatcher::new(Arc::new(registry), Arc::new(store), "S1")
}

pub(super) fn router_with<S>(dispatcher: PredictionDispatcher<S>) -> axum::Router
where
    S: ArtifactStore + 'static,
{
    prediction_router(Arc::new(dispatcher))
}

pub(super) fn sgpa_request() -> Value {
    json!({
        "gender": "female",
        "semester": "S3",
        "income": 0,
        "sgpa": 10.0,
        "district": "Wayanad",
        "category": "OBC"
    })
}

pub(super) fn rank_request() -> Value {
    json!({
        "gender": "male",
        "semester": "S1",
        "income": 1600001,
        "district": "Trivandrum",
        "keam_rank": 1520,
        "category": "BH"
    })
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
