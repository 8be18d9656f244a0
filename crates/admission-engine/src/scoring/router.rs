use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::artifacts::ArtifactStore;
use super::dispatcher::{PredictionDispatcher, PredictionError};

/// Router builder exposing the prediction endpoints.
///
/// `POST /` is an alias of `/predict` for older clients that post to the root path.
pub fn prediction_router<S>(dispatcher: Arc<PredictionDispatcher<S>>) -> Router
where
    S: ArtifactStore + 'static,
{
    Router::new()
        .route("/predict", post(predict_handler::<S>))
        .route("/", post(predict_handler::<S>))
        .route("/api/v1/models", get(models_handler::<S>))
        .with_state(dispatcher)
}

/// Prediction reads artifacts from disk on the rank path, so it runs on the blocking pool.
pub(crate) async fn predict_handler<S>(
    State(dispatcher): State<Arc<PredictionDispatcher<S>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response
where
    S: ArtifactStore + 'static,
{
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(PredictionError::InvalidFieldValue {
                field: "body",
                reason: rejection.body_text(),
            })
        }
    };

    let prediction = tokio::task::spawn_blocking(move || dispatcher.predict_json(&body)).await;
    match prediction {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(outcome.result.response())).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(join) => {
            error!(error = %join, "prediction task did not complete");
            let payload = json!({
                "error": "prediction task did not complete",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn models_handler<S>(
    State(dispatcher): State<Arc<PredictionDispatcher<S>>>,
) -> Response
where
    S: ArtifactStore + 'static,
{
    let payload = json!({
        "rank_semester": dispatcher.rank_semester(),
        "servable": dispatcher.registry().servable(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn error_response(err: PredictionError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!(error = %err, "prediction failed");
    } else {
        warn!(error = %err, "rejected prediction request");
    }

    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
