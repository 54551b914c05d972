use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;
use std::str::FromStr;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub image: String,
    pub rating: f64,
    pub review_count: i64,
    pub delivery_time: String,
    pub cuisine: String,
    pub distance: String,
    pub delivery_fee: f64,
    pub is_open: bool,
    pub featured: bool,
    pub price_range: String,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: String,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub enum SortBy {
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "distance")]
    Distance,
    #[serde(rename = "delivery_fee")]
    DeliveryFee,
    #[default]
    #[serde(rename = "featured")]
    Featured,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rating" => Ok(SortBy::Rating),
            "distance" => Ok(SortBy::Distance),
            "delivery_fee" => Ok(SortBy::DeliveryFee),
            "featured" => Ok(SortBy::Featured),
            _ => Err(format!("'{}' is not a valid SortBy", s)),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Filters {
    pub cuisine: Option<String>,
    pub search: Option<String>,
    pub sort: SortBy,
}

pub async fn find_many<'e, E: SqliteExecutor<'e>>(
    e: E,
    filters: Filters,
) -> Result<Vec<Restaurant>> {
    // The ORDER BY clause comes from a closed enum, never from request input.
    let order_by = match filters.sort {
        SortBy::Rating => "rating DESC",
        SortBy::Distance => "distance ASC",
        SortBy::DeliveryFee => "delivery_fee ASC",
        SortBy::Featured => "featured DESC, rating DESC",
    };

    let query = format!(
        "
        SELECT * FROM restaurants
        WHERE
            (?1 IS NULL OR cuisine = ?1)
            AND (?2 IS NULL OR name LIKE ?2 OR cuisine LIKE ?2)
        ORDER BY {}
        ",
        order_by
    );

    sqlx::query_as::<_, Restaurant>(query.as_str())
        .bind(filters.cuisine)
        .bind(filters.search.map(|search| format!("%{}%", search)))
        .fetch_all(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch restaurants: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    e: E,
    id: String,
) -> Result<Option<Restaurant>> {
    sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = ?1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to fetch restaurant by id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_available_menu_items<'e, E: SqliteExecutor<'e>>(
    e: E,
    restaurant_id: String,
) -> Result<Vec<MenuItem>> {
    sqlx::query_as::<_, MenuItem>(
        "SELECT * FROM menu_items WHERE restaurant_id = ?1 AND is_available = TRUE",
    )
    .bind(restaurant_id.clone())
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to fetch menu for restaurant {}: {}",
            restaurant_id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn count<'e, E: SqliteExecutor<'e>>(e: E) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants")
        .fetch_one(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to count restaurants: {}", err);
            Error::UnexpectedError
        })
}

pub struct CreateRestaurantPayload {
    pub name: String,
    pub image: String,
    pub rating: f64,
    pub review_count: i64,
    pub delivery_time: String,
    pub cuisine: String,
    pub distance: String,
    pub delivery_fee: f64,
    pub is_open: bool,
    pub featured: bool,
    pub price_range: String,
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateRestaurantPayload,
) -> Result<Restaurant> {
    sqlx::query_as::<_, Restaurant>(
        "
        INSERT INTO restaurants (
            id, name, image, rating, review_count, delivery_time,
            cuisine, distance, delivery_fee, is_open, featured, price_range
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.image)
    .bind(payload.rating)
    .bind(payload.review_count)
    .bind(payload.delivery_time)
    .bind(payload.cuisine)
    .bind(payload.distance)
    .bind(payload.delivery_fee)
    .bind(payload.is_open)
    .bind(payload.featured)
    .bind(payload.price_range)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a restaurant: {}", err);
        Error::UnexpectedError
    })
}

pub struct CreateMenuItemPayload {
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: String,
    pub is_available: bool,
}

pub async fn create_menu_item<'e, E: SqliteExecutor<'e>>(
    e: E,
    payload: CreateMenuItemPayload,
) -> Result<MenuItem> {
    sqlx::query_as::<_, MenuItem>(
        "
        INSERT INTO menu_items (
            id, restaurant_id, name, description, price, image, category, is_available
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.restaurant_id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.image)
    .bind(payload.category)
    .bind(payload.is_available)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a menu item: {}", err);
        Error::UnexpectedError
    })
}
