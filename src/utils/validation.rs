use axum::{http::StatusCode, Json};
use serde_json::json;
use std::borrow::Cow;
use validator::ValidationErrors;

/// Collapses validator output into the same `{"error": "..."}` shape every
/// other failure response uses, surfacing the first field message.
pub fn into_response(errors: ValidationErrors) -> (StatusCode, Json<serde_json::Value>) {
    let message = errors
        .field_errors()
        .into_values()
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.clone())
        .unwrap_or(Cow::Borrowed("Invalid payload"));

    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}
