use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;
use std::str::FromStr;
use ulid::Ulid;

use crate::utils::database::DatabaseConnection;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum OrderStatus {
    Confirmed,
    Preparing,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl ToString for OrderStatus {
    fn to_string(&self) -> String {
        match self {
            OrderStatus::Confirmed => String::from("confirmed"),
            OrderStatus::Preparing => String::from("preparing"),
            OrderStatus::OnTheWay => String::from("on-the-way"),
            OrderStatus::Delivered => String::from("delivered"),
            OrderStatus::Cancelled => String::from("cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "on-the-way" => Ok(OrderStatus::OnTheWay),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("'{}' is not a valid OrderStatus", s)),
        }
    }
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub service_fee: f64,
    pub total: f64,
    pub delivery_address: String,
    pub estimated_delivery: String,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub price: f64,
}

/// An order item joined with the current name/image of its menu item. The
/// price stays the snapshot taken at order time.
#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct FullOrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub price: f64,
    pub name: String,
    pub image: String,
}

/// An order augmented with its restaurant name and line items, shaped for
/// display.
#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct FullOrder {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub service_fee: f64,
    pub total: f64,
    pub delivery_address: String,
    pub estimated_delivery: String,
    pub created_at: NaiveDateTime,
    pub restaurant_name: String,
    #[sqlx(skip)]
    pub items: Vec<FullOrderItem>,
}

pub struct CreateOrderPayload {
    pub user_id: String,
    pub restaurant_id: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub service_fee: f64,
    pub total: f64,
    pub delivery_address: String,
    pub estimated_delivery: String,
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateOrderPayload,
) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        "
        INSERT INTO orders (
            id, user_id, restaurant_id, status, subtotal, delivery_fee,
            service_fee, total, delivery_address, estimated_delivery, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.user_id)
    .bind(payload.restaurant_id)
    .bind(OrderStatus::Confirmed)
    .bind(payload.subtotal)
    .bind(payload.delivery_fee)
    .bind(payload.service_fee)
    .bind(payload.total)
    .bind(payload.delivery_address)
    .bind(payload.estimated_delivery)
    .bind(Utc::now().naive_utc())
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create an order: {}", err);
        Error::UnexpectedError
    })
}

pub struct CreateOrderItemPayload {
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub price: f64,
}

pub async fn create_item<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateOrderItemPayload,
) -> Result<OrderItem> {
    sqlx::query_as::<_, OrderItem>(
        "
        INSERT INTO order_items (id, order_id, menu_item_id, quantity, price)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.order_id)
    .bind(payload.menu_item_id)
    .bind(payload.quantity)
    .bind(payload.price)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create an order item: {}", err);
        Error::UnexpectedError
    })
}

/// Fetches a user's orders, newest first, each with its restaurant name and
/// joined line items.
pub async fn find_many_by_user_id(
    db_conn: DatabaseConnection,
    user_id: String,
) -> Result<Vec<FullOrder>> {
    let mut orders = sqlx::query_as::<_, FullOrder>(
        "
        SELECT orders.*, restaurants.name AS restaurant_name
        FROM orders
        JOIN restaurants ON restaurants.id = orders.restaurant_id
        WHERE orders.user_id = ?1
        ORDER BY orders.created_at DESC, orders.id DESC
        ",
    )
    .bind(user_id)
    .fetch_all(&db_conn.pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch orders: {}", err);
        Error::UnexpectedError
    })?;

    for order in orders.iter_mut() {
        order.items = sqlx::query_as::<_, FullOrderItem>(
            "
            SELECT order_items.*, menu_items.name AS name, menu_items.image AS image
            FROM order_items
            JOIN menu_items ON menu_items.id = order_items.menu_item_id
            WHERE order_items.order_id = ?1
            ",
        )
        .bind(order.id.clone())
        .fetch_all(&db_conn.pool)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch items for order {}: {}",
                order.id,
                err
            );
            Error::UnexpectedError
        })?;
    }

    Ok(orders)
}

pub async fn find_by_id_and_user_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: String,
    user_id: String,
) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1 AND user_id = ?2")
        .bind(id.clone())
        .bind(user_id)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch order by id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

/// Updates the status of an order owned by the given user. Returns false when
/// no such order exists; a non-owner is indistinguishable from a missing
/// order.
pub async fn update_status_by_id_and_user_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: String,
    user_id: String,
    status: OrderStatus,
) -> Result<bool> {
    sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2 AND user_id = ?3")
        .bind(status)
        .bind(id.clone())
        .bind(user_id)
        .execute(e)
        .await
        .map(|result| result.rows_affected() > 0)
        .map_err(|err| {
            tracing::error!("Error updating status for order {}: {}", id, err);
            Error::UnexpectedError
        })
}
