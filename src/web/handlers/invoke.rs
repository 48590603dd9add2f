use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::schedule::{TaskOutcome, TaskRequest, TaskType};
use crate::utils::http::HttpResponse;
use crate::AppContext;

pub fn invoke_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/:task_type/invoke", post(invoke))
        .with_state(ctx)
}

fn status_of(outcome: &TaskOutcome) -> (StatusCode, &'static str) {
    match outcome {
        TaskOutcome::Completed(_) => (StatusCode::OK, "Task completed"),
        TaskOutcome::Rejected(_) | TaskOutcome::Declined(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "Task rejected")
        }
        TaskOutcome::Failed(_) => (StatusCode::BAD_GATEWAY, "Task failed"),
    }
}

/// Run one adapter directly, bypassing the orchestrator.
pub async fn invoke(
    State(ctx): State<Arc<AppContext>>,
    Path(task_type): Path<String>,
    Json(params): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let task_type = match task_type.parse::<TaskType>() {
        Ok(task_type) => task_type,
        Err(e) => {
            let response = HttpResponse::new(404, "Unknown task type".to_string(), Value::String(e));
            return (StatusCode::NOT_FOUND, Json(response)).into_response();
        }
    };

    info!("Direct invocation of {}", task_type);
    match ctx.task_manager.invoke(task_type, TaskRequest::new(params)).await {
        Ok(outcome) => {
            let (status, message) = status_of(&outcome);
            let response = HttpResponse::new(status.as_u16(), message.to_string(), outcome.into_output());
            (status, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to invoke {}: {}", task_type, e);
            let response = HttpResponse::new(
                404,
                "Task type not registered".to_string(),
                Value::String(e.to_string()),
            );
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
    }
}
