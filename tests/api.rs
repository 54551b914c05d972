use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

use quickeats_backend::app::App;
use quickeats_backend::modules::restaurant;
use quickeats_backend::types::{AppContext, AuthContext, Context};
use quickeats_backend::utils::database::{self, DatabaseConnection};

const SECRET: &str = "integration-test-secret";

async fn test_db() -> DatabaseConnection {
    // A single pooled connection keeps every query on the same in-memory
    // database.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    let db_conn = DatabaseConnection { pool };
    database::migrate(db_conn.clone()).await;
    database::seed(db_conn.clone()).await;

    db_conn
}

fn test_app(db_conn: DatabaseConnection) -> Router {
    let ctx = Arc::new(Context {
        app: AppContext {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        auth: AuthContext {
            secret: SECRET.to_string(),
        },
        db_conn,
    });

    App::with_context(ctx).into_router()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": password })),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn menu_item_of_first_restaurant(app: &Router) -> (Value, Value) {
    let (status, restaurants) = send(app, "GET", "/api/restaurants", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let restaurant = restaurants[0].clone();

    let (status, detail) = send(
        app,
        "GET",
        &format!("/api/restaurants/{}", restaurant["id"].as_str().unwrap()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (restaurant, detail["menu"][0].clone())
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app(test_db().await);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn register_names_the_missing_field() {
    let app = test_app(test_db().await);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is required");
}

#[tokio::test]
async fn register_flattens_validation_failures_into_an_error_message() {
    let app = test_app(test_db().await);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "not-an-email", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email address");
}

#[tokio::test]
async fn registering_the_same_email_twice_conflicts() {
    let app = test_app(test_db().await);

    let (status, body) = register(&app, "Ada", "ada@example.com", "correct-horse").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user"]["password_hash"].is_null());

    let (status, body) = register(&app, "Ada Again", "ada@example.com", "other-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn login_issues_a_token_that_authenticates() {
    let app = test_app(test_db().await);
    register(&app, "Ada", "ada@example.com", "correct-horse").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let token = login(&app, "ada@example.com", "correct-horse").await;

    let (status, body) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["password_hash"].is_null());
}

#[tokio::test]
async fn missing_and_invalid_tokens_are_reported_distinctly() {
    let app = test_app(test_db().await);

    let (status, body) = send(&app, "GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token is missing");

    let (status, body) = send(&app, "GET", "/api/orders", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token is invalid");
}

#[tokio::test]
async fn profile_update_is_partial_and_rejects_empty_payloads() {
    let app = test_app(test_db().await);
    register(&app, "Ada", "ada@example.com", "correct-horse").await;
    let token = login(&app, "ada@example.com", "correct-horse").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields to update");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile",
        Some(&token),
        Some(json!({ "phone": "555-0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "555-0000");
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn restaurants_support_sorting_filtering_and_search() {
    let db_conn = test_db().await;
    restaurant::repository::create(
        &db_conn.pool,
        restaurant::repository::CreateRestaurantPayload {
            name: "Hidden Gem".to_string(),
            image: String::new(),
            rating: 5.0,
            review_count: 12,
            delivery_time: "40-50 min".to_string(),
            cuisine: "Fusion".to_string(),
            distance: "5.0 km".to_string(),
            delivery_fee: 0.99,
            is_open: true,
            featured: false,
            price_range: "$".to_string(),
        },
    )
    .await
    .unwrap();
    let app = test_app(db_conn);

    // Default ordering: featured rows precede non-featured ones, ties broken
    // by rating descending.
    let (status, body) = send(&app, "GET", "/api/restaurants", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 4);
    assert!(listed[..3].iter().all(|r| r["featured"] == true));
    assert_eq!(listed[0]["name"], "Pasta Corner");
    assert_eq!(listed[3]["name"], "Hidden Gem");

    let (status, body) = send(&app, "GET", "/api/restaurants?sort=rating", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ratings: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rating"].as_f64().unwrap())
        .collect();
    assert!(ratings.windows(2).all(|pair| pair[0] >= pair[1]));

    let (status, body) = send(&app, "GET", "/api/restaurants?cuisine=Italian", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Pasta Corner");

    let (status, body) = send(&app, "GET", "/api/restaurants?search=asia", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Asian Fusion"]);
}

#[tokio::test]
async fn restaurant_detail_includes_its_menu() {
    let app = test_app(test_db().await);

    let (restaurant, menu_item) = menu_item_of_first_restaurant(&app).await;
    assert!(menu_item["name"].is_string());
    assert_eq!(menu_item["restaurant_id"], restaurant["id"]);

    let (status, body) = send(&app, "GET", "/api/restaurants/missing-id", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Restaurant not found");
}

#[tokio::test]
async fn create_order_persists_the_header_and_items_together() {
    let app = test_app(test_db().await);
    register(&app, "Ada", "ada@example.com", "correct-horse").await;
    let token = login(&app, "ada@example.com", "correct-horse").await;

    let (restaurant, menu_item) = menu_item_of_first_restaurant(&app).await;
    let menu_item_id = menu_item["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant["id"],
            "items": [{ "menu_item_id": menu_item_id, "quantity": 2, "price": 12.99 }],
            "subtotal": 25.98,
            "delivery_fee": 2.99,
            "service_fee": 1.50,
            "total": 30.47,
            "delivery_address": "1 Main St"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["order_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);

    let order = &orders[0];
    assert_eq!(order["id"].as_str().unwrap(), order_id);
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["restaurant_name"], restaurant["name"]);
    assert!((order["total"].as_f64().unwrap() - 30.47).abs() < 1e-9);
    assert_eq!(order["estimated_delivery"], "30-40 minutes");

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["menu_item_id"].as_str().unwrap(), menu_item_id);
    assert_eq!(items[0]["quantity"], 2);
    assert!((items[0]["price"].as_f64().unwrap() - 12.99).abs() < 1e-9);
    assert_eq!(items[0]["name"], menu_item["name"]);
    assert_eq!(items[0]["image"], menu_item["image"]);
}

#[tokio::test]
async fn create_order_validates_its_payload() {
    let app = test_app(test_db().await);
    register(&app, "Ada", "ada@example.com", "correct-horse").await;
    let token = login(&app, "ada@example.com", "correct-horse").await;

    let (restaurant, menu_item) = menu_item_of_first_restaurant(&app).await;
    let menu_item_id = menu_item["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant["id"],
            "items": [{ "menu_item_id": menu_item_id, "quantity": 1, "price": 12.99 }],
            "delivery_fee": 2.99,
            "service_fee": 1.50,
            "total": 30.47
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "subtotal is required");

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant["id"],
            "items": [],
            "subtotal": 0.0,
            "delivery_fee": 0.0,
            "service_fee": 0.0,
            "total": 0.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "items cannot be empty");

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant["id"],
            "items": [{ "menu_item_id": menu_item_id, "quantity": 0, "price": 12.99 }],
            "subtotal": 0.0,
            "delivery_fee": 0.0,
            "service_fee": 0.0,
            "total": 0.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn order_status_updates_respect_ownership() {
    let app = test_app(test_db().await);
    register(&app, "Ada", "ada@example.com", "correct-horse").await;
    register(&app, "Bob", "bob@example.com", "hunter2hunter2").await;
    let ada = login(&app, "ada@example.com", "correct-horse").await;
    let bob = login(&app, "bob@example.com", "hunter2hunter2").await;

    let (restaurant, menu_item) = menu_item_of_first_restaurant(&app).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&ada),
        Some(json!({
            "restaurant_id": restaurant["id"],
            "items": [{ "menu_item_id": menu_item["id"], "quantity": 1, "price": 12.99 }],
            "subtotal": 12.99,
            "delivery_fee": 2.99,
            "service_fee": 1.50,
            "total": 17.48
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["order_id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/orders/{}/status", order_id);

    // Another user's token sees the order as missing, not forbidden.
    let (status, body) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&bob),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");

    let (status, body) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&ada),
        Some(json!({ "status": "teleported" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status");

    let (status, body) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&ada),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "delivered");

    // No transition graph: any recognized status may follow any other.
    let (status, body) = send(
        &app,
        "PUT",
        &status_uri,
        Some(&ada),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
}

#[tokio::test]
async fn orders_are_listed_newest_first() {
    let app = test_app(test_db().await);
    register(&app, "Ada", "ada@example.com", "correct-horse").await;
    let token = login(&app, "ada@example.com", "correct-horse").await;

    let (restaurant, menu_item) = menu_item_of_first_restaurant(&app).await;
    let mut order_ids = Vec::new();
    for quantity in 1..=2 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({
                "restaurant_id": restaurant["id"],
                "items": [{ "menu_item_id": menu_item["id"], "quantity": quantity, "price": 12.99 }],
                "subtotal": 12.99,
                "delivery_fee": 2.99,
                "service_fee": 1.50,
                "total": 17.48
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        order_ids.push(body["order_id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|order| order["id"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec![order_ids[1].as_str(), order_ids[0].as_str()]);
}
