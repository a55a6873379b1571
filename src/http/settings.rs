use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use super::{failure, server_error, success, success_message, success_with, AppState};
use crate::admin::{SettingsError, SmtpSettingsUpdate};
use crate::workflows::onboarding::EmailTemplate;

#[derive(Debug, Default, Deserialize)]
pub(super) struct TestEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

pub(super) async fn frontend(State(state): State<AppState>) -> Response {
    match state.settings.frontend_settings() {
        Ok(settings) => success(settings),
        Err(err) => settings_failure(err),
    }
}

pub(super) async fn save_frontend(
    State(state): State<AppState>,
    Json(value): Json<Value>,
) -> Response {
    if !value.is_object() {
        return failure(StatusCode::BAD_REQUEST, "Invalid settings data");
    }
    match state.settings.save_frontend_settings(value.clone()) {
        Ok(()) => success_with(StatusCode::OK, value, "Settings saved successfully"),
        Err(err) => settings_failure(err),
    }
}

pub(super) async fn email_templates(State(state): State<AppState>) -> Response {
    match state.settings.email_templates() {
        Ok(templates) => success(templates),
        Err(err) => settings_failure(err),
    }
}

pub(super) async fn update_email_template(
    State(state): State<AppState>,
    Json(template): Json<EmailTemplate>,
) -> Response {
    match state.settings.update_email_template(template.clone()) {
        Ok(()) => success_with(StatusCode::OK, template, "Email template updated successfully"),
        Err(err) => settings_failure(err),
    }
}

pub(super) async fn smtp(State(state): State<AppState>) -> Response {
    match state.settings.smtp_settings() {
        Ok(settings) => success(settings),
        Err(err) => settings_failure(err),
    }
}

pub(super) async fn save_smtp(
    State(state): State<AppState>,
    Json(update): Json<SmtpSettingsUpdate>,
) -> Response {
    match state.settings.save_smtp_settings(update) {
        Ok(()) => success_message("SMTP settings saved successfully"),
        Err(err) => settings_failure(err),
    }
}

pub(super) async fn test_email(
    State(state): State<AppState>,
    request: Option<Json<TestEmailRequest>>,
) -> Response {
    let Json(request) = request.unwrap_or_default();
    let (recipient, delivered) = state.settings.send_test_email(request.email);
    if delivered {
        success_message(format!("Test email sent successfully to {recipient}"))
    } else {
        failure(
            StatusCode::BAD_REQUEST,
            "Failed to send test email. Check SMTP configuration.",
        )
    }
}

fn settings_failure(err: SettingsError) -> Response {
    match err {
        SettingsError::UnknownTemplate(_) => failure(StatusCode::NOT_FOUND, err.to_string()),
        SettingsError::MissingFields(_) => failure(StatusCode::BAD_REQUEST, err.to_string()),
        SettingsError::Repository(err) => {
            error!(%err, "settings operation failed");
            server_error()
        }
    }
}
