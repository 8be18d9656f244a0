use crate::cli::ModelDirArgs;
use admission_engine::config::{AppConfig, ModelConfig};
use admission_engine::error::AppError;
use admission_engine::scoring::{FilesystemArtifactStore, ModelRegistry, PredictionDispatcher};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type Dispatcher = PredictionDispatcher<FilesystemArtifactStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads configuration and applies the `--model-dir` override shared by every command.
pub(crate) fn load_config(overrides: &ModelDirArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = overrides.model_dir.clone() {
        config.models.artifact_root = dir;
    }
    Ok(config)
}

/// Scans the artifact tree once and wires the registry and store into a dispatcher.
/// Any unreadable or invalid artifact aborts startup.
pub(crate) fn build_dispatcher(models: &ModelConfig) -> Result<Arc<Dispatcher>, AppError> {
    let store = FilesystemArtifactStore::new(models);
    let registry = ModelRegistry::load(&store)?;
    if registry.is_empty() {
        warn!(
            root = %store.root().display(),
            "no complete model pairs found; only the rank semester can be served"
        );
    }
    info!(
        root = %store.root().display(),
        rank_semester = %models.rank_semester,
        servable = registry.len(),
        "prediction dispatcher ready"
    );

    Ok(Arc::new(PredictionDispatcher::new(
        Arc::new(registry),
        Arc::new(store),
        models.rank_semester.clone(),
    )))
}
