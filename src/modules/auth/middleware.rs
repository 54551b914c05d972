use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{async_trait, Json};
use axum::{
    extract::Extension,
    http,
    http::request::Parts,
    response::Response,
};
use serde_json::json;

use crate::types::Context;
use crate::utils;
use std::sync::Arc;

fn get_token_from_header(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Capability gate for protected routes: extracts the bearer token, verifies
/// it against the process-wide secret and exposes the authenticated user id.
/// A missing Authorization header is reported distinctly from a token that
/// fails verification.
#[derive(Clone)]
pub struct Auth {
    pub user_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        use axum::RequestPartsExt;
        let Extension(ctx) = parts.extract::<Extension<Arc<Context>>>().await.unwrap();
        let headers = parts.extract::<HeaderMap>().await.unwrap();

        let auth_header = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or(
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Token is missing"})),
                )
                    .into_response(),
            )?;

        let invalid = (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Token is invalid"})),
        );

        let token =
            get_token_from_header(auth_header).ok_or(invalid.clone().into_response())?;

        utils::auth::verify(ctx.auth.secret.as_str(), token)
            .map(|claims| Self {
                user_id: claims.sub,
            })
            .map_err(|_| invalid.clone().into_response())
    }
}
