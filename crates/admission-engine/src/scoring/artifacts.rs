use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ModelConfig;

use super::category::{CategoryEncoder, EncoderError};
use super::classifier::{Classifier, ClassifierArtifact, ClassifierError};
use super::domain::Gender;

/// Trained classifier together with the category encoder it was fitted alongside.
#[derive(Debug, Clone)]
pub struct ModelPair {
    pub classifier: Arc<dyn Classifier>,
    pub encoder: Arc<CategoryEncoder>,
}

impl ModelPair {
    pub fn new(classifier: Arc<dyn Classifier>, encoder: CategoryEncoder) -> Self {
        Self {
            classifier,
            encoder: Arc::new(encoder),
        }
    }
}

/// Source of trained artifacts, keyed by gender and semester.
pub trait ArtifactStore: Send + Sync {
    /// Semester identifiers that have a directory under `gender`, in any order.
    fn semesters(&self, gender: Gender) -> Result<Vec<String>, ArtifactError>;

    /// `Ok(None)` when either artifact is absent; the pair is then simply not servable.
    fn load_pair(&self, gender: Gender, semester: &str) -> Result<Option<ModelPair>, ArtifactError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("rejected classifier {path}: {source}")]
    Classifier {
        path: PathBuf,
        #[source]
        source: ClassifierError,
    },
    #[error("rejected category encoder {path}: {source}")]
    Encoder {
        path: PathBuf,
        #[source]
        source: EncoderError,
    },
}

/// Reads `<root>/<gender>/<semester>/{classifier,encoder}` JSON exports from disk.
#[derive(Clone)]
pub struct FilesystemArtifactStore {
    root: PathBuf,
    classifier_file: String,
    encoder_file: String,
}

impl fmt::Debug for FilesystemArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilesystemArtifactStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FilesystemArtifactStore {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            root: config.artifact_root.clone(),
            classifier_file: config.classifier_file.clone(),
            encoder_file: config.encoder_file.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn semester_dir(&self, gender: Gender, semester: &str) -> PathBuf {
        self.root.join(gender.as_str()).join(semester)
    }

    fn read(path: &Path) -> Result<Option<String>, ArtifactError> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(raw)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl ArtifactStore for FilesystemArtifactStore {
    fn semesters(&self, gender: Gender) -> Result<Vec<String>, ArtifactError> {
        let gender_dir = self.root.join(gender.as_str());
        let entries = match fs::read_dir(&gender_dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ArtifactError::Io {
                    path: gender_dir,
                    source,
                })
            }
        };

        let mut semesters = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ArtifactError::Io {
                path: gender_dir.clone(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                semesters.push(name.to_string());
            }
        }
        Ok(semesters)
    }

    fn load_pair(&self, gender: Gender, semester: &str) -> Result<Option<ModelPair>, ArtifactError> {
        let dir = self.semester_dir(gender, semester);
        let classifier_path = dir.join(&self.classifier_file);
        let encoder_path = dir.join(&self.encoder_file);

        let (Some(classifier_raw), Some(encoder_raw)) =
            (Self::read(&classifier_path)?, Self::read(&encoder_path)?)
        else {
            return Ok(None);
        };

        let classifier =
            ClassifierArtifact::from_json(&classifier_raw).map_err(|source| ArtifactError::Parse {
                path: classifier_path.clone(),
                source,
            })?;
        classifier
            .validate()
            .map_err(|source| ArtifactError::Classifier {
                path: classifier_path,
                source,
            })?;

        let encoder: CategoryEncoder =
            serde_json::from_str(&encoder_raw).map_err(|source| ArtifactError::Parse {
                path: encoder_path.clone(),
                source,
            })?;
        encoder
            .ensure_default_encodable()
            .map_err(|source| ArtifactError::Encoder {
                path: encoder_path,
                source,
            })?;

        Ok(Some(ModelPair::new(Arc::new(classifier), encoder)))
    }
}
