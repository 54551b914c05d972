use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::middleware::Auth;
use crate::{
    modules::user::repository,
    types::Context,
    utils::{self, validation},
};
use std::sync::Arc;

#[derive(Deserialize, Validate)]
struct RegisterPayload {
    name: Option<String>,
    #[validate(email(code = "INVALID_EMAIL", message = "Invalid email address"))]
    email: Option<String>,
    #[validate(length(
        min = 8,
        code = "PASSWORD_TOO_SHORT",
        message = "Password must be at least 8 characters"
    ))]
    password: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

async fn register(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<RegisterPayload>,
) -> impl IntoResponse {
    for (field, value) in [
        ("name", &payload.name),
        ("email", &payload.email),
        ("password", &payload.password),
    ] {
        if value.is_none() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("{} is required", field) })),
            );
        }
    }

    if let Err(errors) = payload.validate() {
        tracing::warn!("Failed to validate registration payload: {errors}");
        return validation::into_response(errors);
    }

    let email = payload.email.unwrap_or_default().to_lowercase();

    match repository::find_by_email(&ctx.db_conn.pool, email.clone()).await {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "User already exists" })),
            )
        }
        Ok(None) => (),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch user" })),
            )
        }
    };

    let password_hash = utils::password::hash(payload.password.unwrap_or_default().as_str());

    match repository::create(
        &ctx.db_conn.pool,
        repository::CreateUserPayload {
            name: payload.name.unwrap_or_default(),
            email,
            password_hash,
            phone: payload.phone.unwrap_or_default(),
            address: payload.address.unwrap_or_default(),
        },
    )
    .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({ "message": "User created successfully", "user": user })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create user" })),
        ),
    }
}

#[derive(Deserialize)]
struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email and password are required" })),
        );
    };

    let user = match repository::find_by_email(&ctx.db_conn.pool, email.to_lowercase()).await {
        Ok(user) => user,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch user" })),
            )
        }
    };

    // Unknown email and wrong password collapse into the same rejection so
    // accounts cannot be enumerated.
    let Some(user) = user.filter(|user| utils::password::verify(&password, &user.password_hash))
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        );
    };

    let token = utils::auth::issue(ctx.auth.secret.as_str(), user.id.clone());

    (StatusCode::OK, Json(json!({ "token": token, "user": user })))
}

async fn get_profile(State(ctx): State<Arc<Context>>, auth: Auth) -> impl IntoResponse {
    match repository::find_by_id(&ctx.db_conn.pool, auth.user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(json!(user))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch user" })),
        ),
    }
}

#[derive(Deserialize)]
struct UpdateProfilePayload {
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

async fn update_profile(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Json(payload): Json<UpdateProfilePayload>,
) -> impl IntoResponse {
    let update = repository::UpdateUserPayload {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
    };

    if update.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No fields to update" })),
        );
    }

    if repository::update_by_id(&ctx.db_conn.pool, auth.user_id.clone(), update)
        .await
        .is_err()
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update profile" })),
        );
    }

    match repository::find_by_id(&ctx.db_conn.pool, auth.user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(json!(user))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch user" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
}
