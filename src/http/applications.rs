use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::{failure, server_error, success, success_with, validation_failure, AppState};
use crate::workflows::onboarding::{
    ActionRequiredDetails, ApplicationId, OnboardingError, SubmissionInput,
};

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusRequest {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub details: Option<ActionRequiredDetails>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateNotesRequest {
    pub id: String,
    pub notes: String,
}

pub(super) async fn submit(
    State(state): State<AppState>,
    Json(input): Json<SubmissionInput>,
) -> Response {
    match state.onboarding.submit(input) {
        Ok(application) => success_with(
            StatusCode::CREATED,
            application,
            "Application submitted successfully",
        ),
        Err(err) => onboarding_failure(err),
    }
}

pub(super) async fn list_all(State(state): State<AppState>) -> Response {
    match state.onboarding.list_all() {
        Ok(applications) => success(applications),
        Err(err) => onboarding_failure(err),
    }
}

pub(super) async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.onboarding.get(&ApplicationId(id)) {
        Ok(application) => success(application),
        Err(err) => onboarding_failure(err),
    }
}

pub(super) async fn update_status(
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response {
    let id = ApplicationId(request.id);
    match state
        .onboarding
        .change_status(&id, &request.status, request.details)
    {
        Ok(application) => {
            success_with(StatusCode::OK, application, "Application status updated successfully")
        }
        Err(err) => onboarding_failure(err),
    }
}

pub(super) async fn update_notes(
    State(state): State<AppState>,
    Json(request): Json<UpdateNotesRequest>,
) -> Response {
    let id = ApplicationId(request.id);
    match state.onboarding.update_notes(&id, &request.notes) {
        Ok(application) => success_with(StatusCode::OK, application, "Notes updated successfully"),
        Err(err) => onboarding_failure(err),
    }
}

pub(super) async fn stats(State(state): State<AppState>) -> Response {
    match state.onboarding.stats() {
        Ok(stats) => success(stats),
        Err(err) => onboarding_failure(err),
    }
}

pub(super) async fn pending_count(State(state): State<AppState>) -> Response {
    match state.onboarding.pending_count() {
        Ok(count) => success(json!({ "count": count })),
        Err(err) => onboarding_failure(err),
    }
}

fn onboarding_failure(err: OnboardingError) -> Response {
    match err {
        OnboardingError::Validation(errors) => validation_failure(errors),
        OnboardingError::NotFound => failure(StatusCode::NOT_FOUND, "Application not found"),
        OnboardingError::InvalidStatus(_) => {
            failure(StatusCode::BAD_REQUEST, "Invalid status value")
        }
        OnboardingError::Repository(err) => {
            error!(%err, "application operation failed");
            server_error()
        }
    }
}
