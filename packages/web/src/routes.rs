use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::{debug, info, warn};

use api::mail::sanitize::{is_valid_string, sanitize_body, sanitize_subject};
use api::Project;

use crate::error::AppError;
use crate::state::AppState;

/// Listing used by pages that degrade to empty when the catalog is unavailable.
async fn listing(state: &AppState) -> Vec<Project> {
    state.projects.all_projects().await.unwrap_or_else(|e| {
        warn!("Serving empty project listing: {e}");
        Vec::new()
    })
}

pub async fn home_handler(State(state): State<AppState>) -> Html<String> {
    let projects = listing(&state).await;
    let featured = projects.choose(&mut rand::thread_rng()).cloned();

    Html(ui::render_home(featured))
}

pub async fn projects_handler(State(state): State<AppState>) -> Html<String> {
    Html(ui::render_projects(listing(&state).await))
}

pub async fn project_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id: i64 = id.trim().parse().map_err(|_| AppError::NotFound)?;

    match state.projects.project_by_id(id).await? {
        Some(project) => Ok(Html(ui::render_project(project))),
        None => Err(AppError::NotFound),
    }
}

pub async fn contact_handler() -> Html<String> {
    Html(ui::render_contact())
}

pub async fn acknowledgements_handler() -> Html<String> {
    Html(ui::render_acknowledgements())
}

pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(ui::render_not_found()))
}

/// `POST /mail` takes a JSON object with `subject` and `message`. Field values
/// stay untyped so wrong types are a validation failure.
pub async fn mail_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<&'static str, AppError> {
    debug!("Mail request received");

    let Json(request) = payload.map_err(|e| {
        debug!("Rejected mail request: {e}");
        AppError::InvalidRequest
    })?;
    let Some(fields) = request.as_object() else {
        debug!("Rejected mail request: body is not a JSON object");
        return Err(AppError::InvalidRequest);
    };

    let subject = fields.get("subject");
    let message = fields.get("message");
    if !(is_valid_string(subject) && is_valid_string(message)) {
        return Err(AppError::InvalidRequest);
    }
    let (Some(subject), Some(message)) = (sanitize_subject(subject), sanitize_body(message)) else {
        return Err(AppError::InvalidRequest);
    };

    state.mailer.send_email(&subject, &message).await?;
    info!("Email sent");

    Ok("Email sent successfully.")
}
