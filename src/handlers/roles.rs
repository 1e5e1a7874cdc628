use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::handlers::{access_denied, flash_redirect, render};
use crate::middleware::{get_current_user, CurrentUser};
use crate::models::Role;
use crate::AppState;

#[derive(Template)]
#[template(path = "roles/list.html")]
struct RolesListTemplate {
    current_user: CurrentUser,
    roles: Vec<RoleRow>,
    flash_success: String,
    flash_error: String,
}

struct RoleRow {
    id: i32,
    name: String,
    user_count: i64,
}

#[derive(Template)]
#[template(path = "roles/form.html")]
struct RoleFormTemplate {
    current_user: CurrentUser,
    form: RoleFormContext,
    error: String,
    is_new: bool,
}

struct RoleFormContext {
    id: i32,
    name: String,
}

#[derive(Template)]
#[template(path = "roles/detail.html")]
struct RoleDetailTemplate {
    current_user: CurrentUser,
    role: RoleDetailContext,
    user_count: i64,
}

struct RoleDetailContext {
    id: i32,
    name: String,
    created_at: String,
    updated_at: String,
}

impl RoleDetailContext {
    fn from_role(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
            created_at: role.created_at.format("%Y-%m-%d %H:%M").to_string(),
            updated_at: role.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct RolesListQuery {
    success: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct RoleForm {
    name: String,
}

pub async fn roles_list(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<RolesListQuery>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_view_roles {
        return Ok(access_denied());
    }

    // Pair every role with how many users currently hold it.
    let mut rows = Vec::new();
    for role in state.roles.list_roles().await? {
        let user_count = state.users.users_by_role(role.id).await?;
        rows.push(RoleRow {
            id: role.id,
            name: role.name,
            user_count,
        });
    }

    let template = RolesListTemplate {
        current_user,
        roles: rows,
        flash_success: query.success.unwrap_or_default(),
        flash_error: query.error.unwrap_or_default(),
    };
    Ok(render(&template)?.into_response())
}

pub async fn role_form(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_roles {
        return Ok(access_denied());
    }

    let template = RoleFormTemplate {
        current_user,
        form: RoleFormContext {
            id: 0,
            name: String::new(),
        },
        error: String::new(),
        is_new: true,
    };
    Ok(render(&template)?.into_response())
}

pub async fn create_role(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<RoleForm>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_roles {
        return Ok(access_denied());
    }

    match state.roles.create_role(&form.name).await {
        Ok(role) => {
            log::info!(
                "role '{}' (id {}) created by '{}'",
                role.name,
                role.id,
                current_user.login
            );
            Ok(flash_redirect(
                "/roles",
                "success",
                &format!("role '{}' created", role.name),
            )
            .into_response())
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            let template = RoleFormTemplate {
                current_user,
                form: RoleFormContext {
                    id: 0,
                    name: form.name,
                },
                error: message,
                is_new: true,
            };
            Ok(render(&template)?.into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn role_detail(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(role_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_view_roles {
        return Ok(access_denied());
    }

    let role = match state.roles.get_role(role_id).await? {
        Some(role) => role,
        None => return Ok(flash_redirect("/roles", "error", "role not found").into_response()),
    };
    let user_count = state.users.users_by_role(role.id).await?;

    let template = RoleDetailTemplate {
        current_user,
        role: RoleDetailContext::from_role(&role),
        user_count,
    };
    Ok(render(&template)?.into_response())
}

pub async fn role_edit_form(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(role_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_roles {
        return Ok(access_denied());
    }

    let role = match state.roles.get_role(role_id).await? {
        Some(role) => role,
        None => return Ok(flash_redirect("/roles", "error", "role not found").into_response()),
    };

    let template = RoleFormTemplate {
        current_user,
        form: RoleFormContext {
            id: role.id,
            name: role.name,
        },
        error: String::new(),
        is_new: false,
    };
    Ok(render(&template)?.into_response())
}

pub async fn update_role(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(role_id): Path<i32>,
    Form(form): Form<RoleForm>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_roles {
        return Ok(access_denied());
    }

    match state.roles.update_role(role_id, &form.name).await {
        Ok(role) => {
            log::info!(
                "role '{}' (id {}) updated by '{}'",
                role.name,
                role.id,
                current_user.login
            );
            Ok(flash_redirect(
                "/roles",
                "success",
                &format!("role '{}' updated", role.name),
            )
            .into_response())
        }
        Err(AppError::NotFound(message)) => {
            Ok(flash_redirect("/roles", "error", &message).into_response())
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            let template = RoleFormTemplate {
                current_user,
                form: RoleFormContext {
                    id: role_id,
                    name: form.name,
                },
                error: message,
                is_new: false,
            };
            Ok(render(&template)?.into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn delete_role(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(role_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_roles {
        return Ok(access_denied());
    }

    match state.roles.delete_role(role_id).await {
        Ok(_) => {
            log::info!("role id {} deleted by '{}'", role_id, current_user.login);
            Ok(flash_redirect("/roles", "success", "role deleted").into_response())
        }
        Err(AppError::NotFound(message)) | Err(AppError::Conflict(message)) => {
            Ok(flash_redirect("/roles", "error", &message).into_response())
        }
        Err(err) => Err(err),
    }
}
