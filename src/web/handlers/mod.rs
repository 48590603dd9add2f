use axum::Router;
use std::sync::Arc;
use crate::AppContext;

pub mod health;
pub mod invoke;

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .merge(health::health_router(ctx.clone()))
        .nest("/tasks", invoke::invoke_router(ctx))
}
