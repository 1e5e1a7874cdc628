use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::fmt;

/// Business error taxonomy shared by the services and repositories.
///
/// The first four variants are recoverable, caller-fixable outcomes and are
/// surfaced as form or banner errors. `Internal` covers everything else
/// (store unavailable, template failure); its detail is logged but never
/// shown to the client.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    /// The message shown to the user. Internal errors are kept opaque.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::NotFound(m)
            | AppError::Unauthorized(m) => m,
            AppError::Internal(_) => "An unexpected error occurred",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(m) => write!(f, "validation error: {}", m),
            AppError::Conflict(m) => write!(f, "conflict: {}", m),
            AppError::NotFound(m) => write!(f, "not found: {}", m),
            AppError::Unauthorized(m) => write!(f, "unauthorized: {}", m),
            AppError::Internal(m) => write!(f, "internal error: {}", m),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // A unique-index violation means a concurrent request won the
        // check-then-act race; surface it as the same conflict the
        // pre-check would have reported.
        if let sqlx::Error::Database(ref db) = err {
            if db.code().as_deref() == Some("23505") {
                return AppError::Conflict("a record with this value already exists".to_string());
            }
            if db.code().as_deref() == Some("23503") {
                return AppError::Conflict("record is referenced by other records".to_string());
            }
        }
        AppError::Internal(err.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // A missing or stale session sends the browser back to login.
            AppError::Unauthorized(_) => Redirect::to("/login").into_response(),
            AppError::NotFound(m) => {
                (StatusCode::NOT_FOUND, Html(error_page(&m))).into_response()
            }
            AppError::Validation(m) => {
                (StatusCode::BAD_REQUEST, Html(error_page(&m))).into_response()
            }
            AppError::Conflict(m) => {
                (StatusCode::CONFLICT, Html(error_page(&m))).into_response()
            }
            AppError::Internal(m) => {
                log::error!("internal error: {}", m);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(error_page("An unexpected error occurred")),
                )
                    .into_response()
            }
        }
    }
}

fn error_page(message: &str) -> String {
    let escaped = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!DOCTYPE html><html><head><title>Back Office</title>\
         <link rel=\"stylesheet\" href=\"/static/style.css\"></head>\
         <body><main class=\"error-page\"><h1>Something went wrong</h1>\
         <p>{}</p><p><a href=\"/dashboard\">Back to dashboard</a></p>\
         </main></body></html>",
        escaped
    )
}
