//! HTTP API for the Keygate activation service.
//!
//! One router serves both validate routes (`/get-script` and its
//! `/activation` alias) plus the administrative mint route. Handlers run the
//! gate on the blocking pool so ledger and file I/O never stall the async
//! workers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use keygate_core::{ActivationGate, GateError};
use serde::Deserialize;
use tracing::info;

mod script;
pub use script::ScriptFile;

#[derive(Deserialize)]
struct ValidateParams {
    key: String,
}

#[derive(Deserialize)]
struct MintParams {
    comment: String,
}

/// Build the HTTP API router over the given gate.
pub fn build_router(gate: Arc<ActivationGate>) -> Router {
    Router::new()
        .route("/get-script", get(get_script))
        .route("/activation", get(get_script))
        .route("/create-key", post(create_key))
        .with_state(gate)
}

async fn get_script(
    State(gate): State<Arc<ActivationGate>>,
    Query(params): Query<ValidateParams>,
) -> Response {
    info!("Received get request for key: {}", params.key);
    match tokio::task::spawn_blocking(move || gate.validate(&params.key)).await {
        Ok(Ok(script)) => (StatusCode::OK, script).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("validation task failed: {e}"),
        )
            .into_response(),
    }
}

async fn create_key(
    State(gate): State<Arc<ActivationGate>>,
    Query(params): Query<MintParams>,
) -> Response {
    info!("Received create request with comment: {}", params.comment);
    match tokio::task::spawn_blocking(move || gate.mint(&params.comment)).await {
        Ok(Ok(minted)) => Json(minted).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("mint task failed: {e}"),
        )
            .into_response(),
    }
}

/// Maps the gate's failure taxonomy onto HTTP statuses.
fn error_response(err: &GateError) -> Response {
    let status = match err {
        GateError::KeyNotFound => StatusCode::NOT_FOUND,
        GateError::QuotaExceeded => StatusCode::FORBIDDEN,
        GateError::PayloadUnavailable(_)
        | GateError::DuplicateKey(_)
        | GateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}
