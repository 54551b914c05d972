use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;

use super::repository::{self, OrderStatus};
use crate::{modules::auth::middleware::Auth, types::Context};
use std::sync::Arc;

#[derive(Deserialize, Clone)]
struct ItemPayload {
    menu_item_id: Option<String>,
    quantity: Option<i64>,
    price: Option<f64>,
}

#[derive(Deserialize)]
struct CreateOrderPayload {
    restaurant_id: Option<String>,
    items: Option<Vec<ItemPayload>>,
    subtotal: Option<f64>,
    delivery_fee: Option<f64>,
    service_fee: Option<f64>,
    total: Option<f64>,
    delivery_address: Option<String>,
    estimated_delivery: Option<String>,
}

async fn create_order(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Json(payload): Json<CreateOrderPayload>,
) -> impl IntoResponse {
    if payload.restaurant_id.is_none() {
        return missing_field("restaurant_id");
    }
    if payload.items.is_none() {
        return missing_field("items");
    }
    if payload.subtotal.is_none() {
        return missing_field("subtotal");
    }
    if payload.delivery_fee.is_none() {
        return missing_field("delivery_fee");
    }
    if payload.service_fee.is_none() {
        return missing_field("service_fee");
    }
    if payload.total.is_none() {
        return missing_field("total");
    }

    let items = payload.items.unwrap_or_default();
    if items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "items cannot be empty" })),
        );
    }

    let mut order_items = Vec::with_capacity(items.len());
    for item in items {
        let (Some(menu_item_id), Some(quantity), Some(price)) =
            (item.menu_item_id, item.quantity, item.price)
        else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "each item requires menu_item_id, quantity and price"
                })),
            );
        };
        if quantity < 1 || price < 0.0 {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "item quantity must be at least 1 and price cannot be negative"
                })),
            );
        }
        order_items.push((menu_item_id, quantity, price));
    }

    // The order header and every item row commit as one unit or not at all.
    let mut tx = match ctx.db_conn.pool.begin().await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::error!("Failed to start database transaction: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            );
        }
    };

    let order = match repository::create(
        &mut *tx,
        repository::CreateOrderPayload {
            user_id: auth.user_id,
            restaurant_id: payload.restaurant_id.unwrap_or_default(),
            subtotal: payload.subtotal.unwrap_or_default(),
            delivery_fee: payload.delivery_fee.unwrap_or_default(),
            service_fee: payload.service_fee.unwrap_or_default(),
            total: payload.total.unwrap_or_default(),
            delivery_address: payload.delivery_address.unwrap_or_default(),
            estimated_delivery: payload
                .estimated_delivery
                .unwrap_or_else(|| "30-40 minutes".to_string()),
        },
    )
    .await
    {
        Ok(order) => order,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            )
        }
    };

    for (menu_item_id, quantity, price) in order_items {
        if repository::create_item(
            &mut *tx,
            repository::CreateOrderItemPayload {
                order_id: order.id.clone(),
                menu_item_id,
                quantity,
                price,
            },
        )
        .await
        .is_err()
        {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create order" })),
            );
        }
    }

    if let Err(err) = tx.commit().await {
        tracing::error!("Failed to commit database transaction: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create order" })),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Order created successfully", "order_id": order.id })),
    )
}

fn missing_field(field: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("{} is required", field) })),
    )
}

async fn get_orders(State(ctx): State<Arc<Context>>, auth: Auth) -> impl IntoResponse {
    match repository::find_many_by_user_id(ctx.db_conn.clone(), auth.user_id).await {
        Ok(orders) => (StatusCode::OK, Json(json!(orders))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch orders" })),
        ),
    }
}

#[derive(Deserialize)]
struct UpdateStatusPayload {
    status: Option<String>,
}

async fn update_order_status(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<String>,
    auth: Auth,
    Json(payload): Json<UpdateStatusPayload>,
) -> impl IntoResponse {
    let Some(status) = payload.status else {
        return missing_field("status");
    };

    let Ok(status) = OrderStatus::from_str(status.as_str()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid status" })),
        );
    };

    match repository::update_status_by_id_and_user_id(
        &ctx.db_conn.pool,
        id.clone(),
        auth.user_id.clone(),
        status,
    )
    .await
    {
        Ok(true) => (),
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Order not found" })),
            )
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to update order status" })),
            )
        }
    }

    match repository::find_by_id_and_user_id(&ctx.db_conn.pool, id, auth.user_id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(json!(order))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Order not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch order" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(get_orders).post(create_order))
        .route("/:id/status", put(update_order_status))
}
