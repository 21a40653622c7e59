//! Request handlers for the batch endpoints

use crate::core::stream::{Delivery, Pipeline};
use crate::domain::{failure_body, EndpointMode, Entity, RelayError};
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters accepted by `/transform` and `/sink`
#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    /// Entity property holding per-entity overrides
    pub service_config_property: Option<String>,
    /// Suffix appended to every resolved URL
    pub path: Option<String>,
}

pub async fn transform(
    State(pipeline): State<Arc<Pipeline>>,
    Query(query): Query<BatchQuery>,
    body: Bytes,
) -> Response {
    handle_batch(pipeline, EndpointMode::Transform, query, &body).await
}

pub async fn sink(
    State(pipeline): State<Arc<Pipeline>>,
    Query(query): Query<BatchQuery>,
    body: Bytes,
) -> Response {
    handle_batch(pipeline, EndpointMode::Sink, query, &body).await
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn handle_batch(
    pipeline: Arc<Pipeline>,
    mode: EndpointMode,
    query: BatchQuery,
    body: &[u8],
) -> Response {
    let entities: Vec<Entity> = match serde_json::from_slice(body) {
        Ok(entities) => entities,
        Err(e) => {
            tracing::warn!(mode = %mode, error = %e, "Rejecting batch that is not a JSON array of objects");
            return (
                StatusCode::BAD_REQUEST,
                Json(failure_body(
                    &format!("Request body must be a JSON array of objects: {e}"),
                    400,
                )),
            )
                .into_response();
        }
    };

    let options = pipeline.options(mode, query.service_config_property, query.path);

    match pipeline.delivery(mode) {
        Delivery::Streamed => match pipeline.open(entities, options).await {
            Ok(chunks) => json_response(Body::from_stream(chunks)),
            Err(e) => error_response(&e),
        },
        Delivery::Buffered => match pipeline.collect(entities, options).await {
            Ok(array) => json_response(Body::from(array)),
            Err(e) => error_response(&e),
        },
    }
}

fn json_response(body: Body) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Maps an error to its status code and JSON body
pub fn error_response(error: &RelayError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() && !matches!(error, RelayError::Aborted { .. }) {
        tracing::error!(error = %error, "Batch failed");
    }
    (status, Json(error.body())).into_response()
}
