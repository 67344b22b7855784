use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use api::{MailError, ProjectError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request format.")]
    InvalidRequest,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Projects(#[from] ProjectError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidRequest | AppError::Mail(MailError::InvalidMessage) => {
                (StatusCode::BAD_REQUEST, "Invalid request format.").into_response()
            }
            AppError::Mail(e) => {
                tracing::error!("Error sending email: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error sending email.").into_response()
            }
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Html(ui::render_not_found())).into_response()
            }
            AppError::Projects(e) => {
                tracing::error!("{e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(ui::render_server_error()),
                )
                    .into_response()
            }
        }
    }
}
