use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::repository::{self, SortBy};
use crate::types::Context;
use std::sync::Arc;

#[derive(Deserialize)]
struct Filters {
    cuisine: Option<String>,
    search: Option<String>,
    sort: Option<String>,
}

async fn get_restaurants(
    State(ctx): State<Arc<Context>>,
    Query(filters): Query<Filters>,
) -> impl IntoResponse {
    // Unrecognized sort keys fall back to the featured ordering.
    let sort = filters
        .sort
        .as_deref()
        .and_then(|sort| sort.parse::<SortBy>().ok())
        .unwrap_or_default();

    match repository::find_many(
        &ctx.db_conn.pool,
        repository::Filters {
            cuisine: filters.cuisine,
            search: filters.search,
            sort,
        },
    )
    .await
    {
        Ok(restaurants) => (StatusCode::OK, Json(json!(restaurants))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch restaurants" })),
        ),
    }
}

async fn get_restaurant_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let restaurant = match repository::find_by_id(&ctx.db_conn.pool, id.clone()).await {
        Ok(Some(restaurant)) => restaurant,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Restaurant not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch restaurant" })),
            )
        }
    };

    match repository::find_available_menu_items(&ctx.db_conn.pool, id).await {
        Ok(menu) => {
            let mut body = json!(restaurant);
            body["menu"] = json!(menu);
            (StatusCode::OK, Json(body))
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch menu" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_restaurants))
        .route("/:id", get(get_restaurant_by_id))
}
