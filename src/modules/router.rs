use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;

use super::{auth, order, restaurant};
use crate::types::Context;
use std::sync::Arc;

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "timestamp": Utc::now() })),
    )
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth::get_router())
        .nest("/restaurants", restaurant::get_router())
        .nest("/orders", order::get_router())
}
