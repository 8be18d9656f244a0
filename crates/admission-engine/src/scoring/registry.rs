use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use super::artifacts::{ArtifactError, ArtifactStore, ModelPair};
use super::domain::Gender;

/// Immutable (gender, semester) → model pair table built once before serving.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<(Gender, String), ModelPair>,
}

/// One servable (gender, semester) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryKey {
    pub gender: Gender,
    pub semester: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to load {gender}/{semester} artifacts: {source}")]
    Artifact {
        gender: Gender,
        semester: String,
        #[source]
        source: ArtifactError,
    },
    #[error("failed to list semesters for {gender}: {source}")]
    Scan {
        gender: Gender,
        #[source]
        source: ArtifactError,
    },
}

impl ModelRegistry {
    /// Scans every gender's semesters and registers the pairs whose artifacts are complete.
    /// Incomplete directories are skipped; unreadable or invalid artifacts abort the load.
    pub fn load<S>(store: &S) -> Result<Self, RegistryError>
    where
        S: ArtifactStore + ?Sized,
    {
        let mut entries = BTreeMap::new();

        for gender in Gender::ordered() {
            let mut semesters = store
                .semesters(gender)
                .map_err(|source| RegistryError::Scan { gender, source })?;
            semesters.sort();

            for semester in semesters {
                match store.load_pair(gender, &semester) {
                    Ok(Some(pair)) => {
                        debug!(%gender, %semester, "registered model pair");
                        entries.insert((gender, semester), pair);
                    }
                    Ok(None) => {
                        debug!(%gender, %semester, "skipping semester with incomplete artifacts");
                    }
                    Err(source) => {
                        return Err(RegistryError::Artifact {
                            gender,
                            semester,
                            source,
                        })
                    }
                }
            }
        }

        let registry = Self { entries };
        info!(
            servable = registry.len(),
            pairs = ?registry.servable_labels(),
            "model registry loaded"
        );
        Ok(registry)
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Gender, String, ModelPair)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(gender, semester, pair)| ((gender, semester), pair))
                .collect(),
        }
    }

    pub fn lookup(&self, gender: Gender, semester: &str) -> Option<&ModelPair> {
        self.entries.get(&(gender, semester.to_string()))
    }

    /// Servable combinations ordered by gender, then semester.
    pub fn servable(&self) -> Vec<RegistryKey> {
        self.entries
            .keys()
            .map(|(gender, semester)| RegistryKey {
                gender: *gender,
                semester: semester.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn servable_labels(&self) -> Vec<String> {
        self.entries
            .keys()
            .map(|(gender, semester)| format!("{gender}/{semester}"))
            .collect()
    }
}
