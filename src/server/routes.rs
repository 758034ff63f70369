use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use crate::AppContext;

pub fn create_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/teams", get(handlers::get_teams))
        .route("/api/dates", get(handlers::get_dates))
        .route("/api/predict", post(handlers::predict))
        .with_state(ctx)
}
