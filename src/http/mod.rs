//! HTTP surface: uniform response envelope, route table, and probe
//! endpoints. Handlers translate service errors into envelope responses;
//! unexpected detail stays in the logs.

mod applications;
mod auth;
mod settings;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::admin::{AdminAuthService, SettingsService};
use crate::workflows::onboarding::{FieldErrors, OnboardingService};

/// Shared handler state; services are injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub onboarding: Arc<OnboardingService>,
    pub auth: Arc<AdminAuthService>,
    pub settings: Arc<SettingsService>,
    pub readiness: Arc<AtomicBool>,
}

/// Uniform response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

pub(crate) fn success(data: impl Serialize) -> Response {
    respond(StatusCode::OK, Some(data), None)
}

pub(crate) fn success_with(
    status: StatusCode,
    data: impl Serialize,
    message: impl Into<String>,
) -> Response {
    respond(status, Some(data), Some(message.into()))
}

pub(crate) fn success_message(message: impl Into<String>) -> Response {
    respond::<Value>(StatusCode::OK, None, Some(message.into()))
}

pub(crate) fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let envelope = Envelope {
        success: false,
        message: Some(message.into()),
        data: None,
        errors: None,
    };
    (status, Json(envelope)).into_response()
}

pub(crate) fn validation_failure(errors: FieldErrors) -> Response {
    let envelope = Envelope {
        success: false,
        message: Some("Validation failed".to_string()),
        data: None,
        errors: Some(errors),
    };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(envelope)).into_response()
}

pub(crate) fn server_error() -> Response {
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "An unexpected error occurred",
    )
}

fn respond<T: Serialize>(status: StatusCode, data: Option<T>, message: Option<String>) -> Response {
    let data = match data.map(|value| serde_json::to_value(&value)).transpose() {
        Ok(data) => data,
        Err(err) => {
            error!(%err, "failed to serialize response payload");
            return server_error();
        }
    };
    let envelope = Envelope {
        success: true,
        message,
        data,
        errors: None,
    };
    (status, Json(envelope)).into_response()
}

/// Assemble the portal API. CORS is open: the public form and the admin SPA
/// are served from other origins.
pub fn router(state: AppState) -> Router {
    // Every MethodRouter carries the envelope fallback so a wrong-verb
    // request still gets `{success: false, ...}` instead of a bare 405.
    Router::new()
        .route(
            "/applications/submit",
            post(applications::submit).fallback(method_not_allowed),
        )
        .route(
            "/applications/all",
            get(applications::list_all).fallback(method_not_allowed),
        )
        .route(
            "/applications/get/:id",
            get(applications::get_one).fallback(method_not_allowed),
        )
        .route(
            "/applications/update-status",
            post(applications::update_status).fallback(method_not_allowed),
        )
        .route(
            "/applications/update-notes",
            post(applications::update_notes).fallback(method_not_allowed),
        )
        .route(
            "/applications/stats",
            get(applications::stats).fallback(method_not_allowed),
        )
        .route(
            "/applications/pending-count",
            get(applications::pending_count).fallback(method_not_allowed),
        )
        .route(
            "/auth/verify",
            post(auth::verify).fallback(method_not_allowed),
        )
        .route("/auth/check", get(auth::check).fallback(method_not_allowed))
        .route(
            "/auth/logout",
            post(auth::logout).fallback(method_not_allowed),
        )
        .route(
            "/auth/update-password",
            post(auth::update_password).fallback(method_not_allowed),
        )
        .route(
            "/settings/frontend",
            get(settings::frontend)
                .post(settings::save_frontend)
                .fallback(method_not_allowed),
        )
        .route(
            "/settings/email-templates",
            get(settings::email_templates)
                .post(settings::update_email_template)
                .fallback(method_not_allowed),
        )
        .route(
            "/settings/smtp",
            get(settings::smtp)
                .post(settings::save_smtp)
                .fallback(method_not_allowed),
        )
        .route(
            "/settings/test-email",
            post(settings::test_email).fallback(method_not_allowed),
        )
        .route("/health", get(healthcheck).fallback(method_not_allowed))
        .route("/ready", get(readiness_endpoint).fallback(method_not_allowed))
        .fallback(not_found_endpoint)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Prometheus text endpoint; mounted by the binary next to the metric layer.
pub fn metrics_router(handle: Arc<PrometheusHandle>) -> Router {
    Router::new().route(
        "/metrics",
        get(move || async move {
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                handle.render(),
            )
        }),
    )
}

async fn healthcheck() -> Response {
    success_with(
        StatusCode::OK,
        json!({ "status": "ok", "timestamp": Utc::now().timestamp() }),
        "API is running",
    )
}

async fn readiness_endpoint(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Response {
    if state.readiness.load(Ordering::Relaxed) {
        success(json!({ "status": "ready" }))
    } else {
        failure(StatusCode::SERVICE_UNAVAILABLE, "initializing")
    }
}

async fn not_found_endpoint() -> Response {
    failure(StatusCode::NOT_FOUND, "Endpoint not found")
}

async fn method_not_allowed() -> Response {
    failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
