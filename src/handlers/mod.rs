pub mod auth;
pub mod roles;
pub mod users;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::middleware::{get_current_user, CurrentUser};
use crate::AppState;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    current_user: CurrentUser,
    total_users: i64,
    active_users: i64,
    role_count: usize,
    role_breakdown: Vec<RoleCount>,
}

struct RoleCount {
    name: String,
    count: i64,
}

#[derive(Template)]
#[template(path = "access_denied.html")]
struct AccessDeniedTemplate;

pub async fn dashboard(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    let total_users = state.users.total_users().await?;
    let active_users = state.users.active_users().await?;
    let role_count = state.roles.list_roles().await?.len();
    let role_breakdown = state
        .users
        .users_count_grouped_by_role()
        .await?
        .into_iter()
        .map(|(name, count)| RoleCount { name, count })
        .collect();

    let template = DashboardTemplate {
        current_user,
        total_users,
        active_users,
        role_count,
        role_breakdown,
    };
    Ok(render(&template)?.into_response())
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

pub(crate) fn access_denied() -> Response {
    match AccessDeniedTemplate.render() {
        Ok(body) => (StatusCode::FORBIDDEN, Html(body)).into_response(),
        Err(_) => StatusCode::FORBIDDEN.into_response(),
    }
}

/// Redirect carrying a flash message in the query string.
pub(crate) fn flash_redirect(path: &str, key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?{}={}", path, key, urlencoding::encode(message)))
}

/// Optional form fields arrive as empty strings; normalize them away.
pub(crate) fn empty_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
