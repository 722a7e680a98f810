//! Application error type shared by handlers and repositories.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Target missing or not owned by the requester. Both cases look the
    /// same to the client so identifiers cannot be probed.
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("bad upload: {0}")]
    Upload(String),

    #[error("password hashing failed")]
    PasswordHash,
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>404 Not Found</h1>".to_string()),
            )
                .into_response(),
            AppError::Upload(reason) => {
                (StatusCode::BAD_REQUEST, Html(format!("<h1>400</h1><p>{reason}</p>")))
                    .into_response()
            }
            other => {
                tracing::Span::current().record("error", tracing::field::display(&other));
                tracing::error!("request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>500 Something went wrong</h1>".to_string()),
                )
                    .into_response()
            }
        }
    }
}
