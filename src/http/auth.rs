use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::{failure, server_error, success, success_message, success_with, AppState};
use crate::admin::{AdminToken, AuthError};

#[derive(Debug, Deserialize)]
pub(super) struct VerifyRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatePasswordRequest {
    pub new_password: String,
}

pub(super) async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    match state.auth.verify(&request.password) {
        Ok(token) => success_with(
            StatusCode::OK,
            json!({ "authenticated": true, "token": token.0 }),
            "Authentication successful",
        ),
        Err(err @ AuthError::InvalidPassword) => {
            failure(StatusCode::UNAUTHORIZED, err.to_string())
        }
        Err(err @ AuthError::NotConfigured) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(err) => {
            error!(%err, "authentication failed");
            server_error()
        }
    }
}

pub(super) async fn check(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let authenticated = bearer_token(&headers)
        .map(|token| state.auth.check(&token))
        .unwrap_or(false);
    success(json!({ "authenticated": authenticated }))
}

pub(super) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(&token);
    }
    success_message("Logged out successfully")
}

pub(super) async fn update_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdatePasswordRequest>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return failure(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    match state.auth.update_password(&token, &request.new_password) {
        Ok(()) => success_message("Password updated successfully"),
        Err(err @ AuthError::Unauthorized) => failure(StatusCode::UNAUTHORIZED, err.to_string()),
        Err(err @ AuthError::PasswordTooShort) => failure(StatusCode::BAD_REQUEST, err.to_string()),
        Err(err) => {
            error!(%err, "password update failed");
            server_error()
        }
    }
}

/// Extract the admin capability token from an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> Option<AdminToken> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| AdminToken(token.trim().to_string()))
}
