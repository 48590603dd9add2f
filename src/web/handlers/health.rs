use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AppContext, VERSION};

pub fn health_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .with_state(ctx)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub worker_id: String,
    pub task_types: Vec<String>,
}

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        worker_id: ctx.worker_id.clone(),
        task_types: ctx
            .task_manager
            .registered_types()
            .iter()
            .map(|t| t.definition_name().to_string())
            .collect(),
    })
}
