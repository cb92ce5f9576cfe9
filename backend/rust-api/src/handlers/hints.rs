use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{GenerationError, HintError};
use crate::extractors::AppJson;
use crate::metrics;
use crate::middlewares::trace::RequestTraceContext;
use crate::models::{HintRequest, HintResponse};
use crate::services::AppState;

pub const GENERATION_FAILED_MESSAGE: &str = "Could not generate a hint. Please try again.";

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    GenerationTimeout,
    Generation,
}

impl From<HintError> for ApiError {
    fn from(err: HintError) -> Self {
        match err {
            HintError::Validation(e) => ApiError::Validation(e.to_string()),
            HintError::Generation(GenerationError::Timeout(_)) => ApiError::GenerationTimeout,
            HintError::Generation(_) => ApiError::Generation,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::GenerationTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "generation_timeout",
                GENERATION_FAILED_MESSAGE.to_string(),
            ),
            ApiError::Generation => (
                StatusCode::BAD_GATEWAY,
                "generation_error",
                GENERATION_FAILED_MESSAGE.to_string(),
            ),
        };
        let json_response = json!({
            "error": error,
            "message": message,
            "status": status.as_u16()
        });
        (status, Json(json_response)).into_response()
    }
}

pub async fn request_hint(
    State(state): State<Arc<AppState>>,
    trace: Option<Extension<RequestTraceContext>>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<HintResponse>, ApiError> {
    let trace_id = trace
        .map(|Extension(ctx)| ctx.trace_id)
        .unwrap_or_else(|| "-".to_string());

    let request = HintRequest::try_from(body).map_err(|e| {
        tracing::info!("Invalid hint request (trace={}): {}", trace_id, e);
        metrics::record_hint_outcome("validation_error");
        ApiError::from(HintError::from(e))
    })?;

    tracing::info!(
        "Hint requested (trace={}): inventory_items={}",
        trace_id,
        request.inventory.len()
    );

    match state.hint_flow.generate(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Failed to generate hint (trace={}): {}", trace_id, e);
            Err(e.into())
        }
    }
}
