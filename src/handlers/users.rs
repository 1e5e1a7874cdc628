use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::handlers::{access_denied, empty_to_none, flash_redirect, render};
use crate::middleware::{get_current_user, CurrentUser};
use crate::models::{CreateUser, Role, UserRecord, UserUpdate};
use crate::AppState;

const PAGE_SIZE: usize = 10;

#[derive(Template)]
#[template(path = "users/list.html")]
struct UsersListTemplate {
    current_user: CurrentUser,
    users: Vec<UserRow>,
    roles: Vec<Role>,
    search: String,
    role_filter: i32,
    active_filter: String,
    page: usize,
    total_pages: usize,
    prev_page: usize,
    next_page: usize,
    has_prev: bool,
    has_next: bool,
    total_items: usize,
    filter_query: String,
    flash_success: String,
    flash_error: String,
}

/// Row shape for the list view, with per-target access flags resolved in
/// the handler so the template stays declarative.
struct UserRow {
    id: i32,
    full_name: String,
    login: String,
    email: String,
    role_name: String,
    is_active: bool,
    can_edit: bool,
    can_delete: bool,
    can_toggle: bool,
}

#[derive(Template)]
#[template(path = "users/form.html")]
struct UserFormTemplate {
    current_user: CurrentUser,
    form: UserFormContext,
    roles: Vec<Role>,
    error: String,
    is_new: bool,
    can_change_role: bool,
}

struct UserFormContext {
    id: i32,
    login: String,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    address: String,
    gender: String,
    role_id: i32,
    is_active: bool,
}

impl UserFormContext {
    fn empty() -> Self {
        Self {
            id: 0,
            login: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            address: String::new(),
            gender: String::new(),
            role_id: 0,
            is_active: true,
        }
    }

    fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
            gender: user.gender.clone().unwrap_or_default(),
            role_id: user.role_id,
            is_active: user.is_active,
        }
    }

    fn from_form(id: i32, login: &str, form: &UserForm, role_id: i32, is_active: bool) -> Self {
        Self {
            id,
            login: login.to_string(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
            phone_number: form.phone_number.clone().unwrap_or_default(),
            address: form.address.clone().unwrap_or_default(),
            gender: form.gender.clone().unwrap_or_default(),
            role_id,
            is_active,
        }
    }
}

#[derive(Template)]
#[template(path = "users/detail.html")]
struct UserDetailTemplate {
    current_user: CurrentUser,
    user: UserDetailContext,
    can_edit: bool,
    can_delete: bool,
    can_toggle: bool,
}

struct UserDetailContext {
    id: i32,
    login: String,
    full_name: String,
    email: String,
    phone_number: String,
    address: String,
    gender: String,
    role_name: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl UserDetailContext {
    fn from_record(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone().unwrap_or_else(|| "—".to_string()),
            address: user.address.clone().unwrap_or_else(|| "—".to_string()),
            gender: user.gender.clone().unwrap_or_else(|| "—".to_string()),
            role_name: user.role_name.clone(),
            is_active: user.is_active,
            created_at: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
            updated_at: user.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct UsersListQuery {
    search: Option<String>,
    role_id: Option<String>,
    active: Option<String>,
    page: Option<usize>,
    success: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct UserForm {
    login: Option<String>,
    password: Option<String>,
    password_confirm: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    role_id: Option<i32>,
    is_active: Option<String>,
}

/// Managers never see the Admin role in assignment dropdowns.
fn available_roles(current_user: &CurrentUser, roles: Vec<Role>) -> Vec<Role> {
    if current_user.is_admin {
        roles
    } else {
        roles.into_iter().filter(|r| !r.is_admin()).collect()
    }
}

pub async fn users_list(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(query): Query<UsersListQuery>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_view_users {
        return Ok(access_denied());
    }

    let mut users = state.users.list_users().await?;
    let roles = state.roles.list_roles().await?;

    let search = query.search.unwrap_or_default().trim().to_string();
    let role_filter: i32 = query
        .role_id
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let active_filter = query.active.unwrap_or_default();

    if !search.is_empty() {
        let needle = search.to_lowercase();
        users.retain(|u| {
            u.login.to_lowercase().contains(&needle)
                || u.email.to_lowercase().contains(&needle)
                || u.first_name.to_lowercase().contains(&needle)
                || u.last_name.to_lowercase().contains(&needle)
                || u.full_name().to_lowercase().contains(&needle)
        });
    }
    if role_filter > 0 {
        users.retain(|u| u.role_id == role_filter);
    }
    match active_filter.as_str() {
        "true" => users.retain(|u| u.is_active),
        "false" => users.retain(|u| !u.is_active),
        _ => {}
    }

    // Page-size-10 slice over the filtered set.
    let total_items = users.len();
    let total_pages = std::cmp::max(1, (total_items + PAGE_SIZE - 1) / PAGE_SIZE);
    let page = query.page.unwrap_or(1).clamp(1, total_pages);
    let rows: Vec<UserRow> = users
        .iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(|u| {
            let modifiable = current_user.may_modify(u);
            UserRow {
                id: u.id,
                full_name: u.full_name(),
                login: u.login.clone(),
                email: u.email.clone(),
                role_name: u.role_name.clone(),
                is_active: u.is_active,
                can_edit: current_user.can_edit_users && modifiable,
                can_delete: current_user.can_manage_users,
                can_toggle: current_user.can_edit_users && modifiable,
            }
        })
        .collect();

    // Query-string tail reused by the pagination links.
    let mut filter_parts = Vec::new();
    if !search.is_empty() {
        filter_parts.push(format!("search={}", urlencoding::encode(&search)));
    }
    if role_filter > 0 {
        filter_parts.push(format!("role_id={}", role_filter));
    }
    if active_filter == "true" || active_filter == "false" {
        filter_parts.push(format!("active={}", active_filter));
    }
    let filter_query = filter_parts.join("&");

    let template = UsersListTemplate {
        current_user,
        users: rows,
        roles,
        search,
        role_filter,
        active_filter,
        page,
        total_pages,
        prev_page: page.saturating_sub(1),
        next_page: page + 1,
        has_prev: page > 1,
        has_next: page < total_pages,
        total_items,
        filter_query,
        flash_success: query.success.unwrap_or_default(),
        flash_error: query.error.unwrap_or_default(),
    };
    Ok(render(&template)?.into_response())
}

pub async fn user_form(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_users {
        return Ok(access_denied());
    }

    let roles = available_roles(&current_user, state.roles.list_roles().await?);

    let template = UserFormTemplate {
        form: UserFormContext::empty(),
        roles,
        error: String::new(),
        is_new: true,
        can_change_role: true,
        current_user,
    };
    Ok(render(&template)?.into_response())
}

pub async fn create_user(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_users {
        return Ok(access_denied());
    }

    let login = form.login.clone().unwrap_or_default();
    let role_id = form.role_id.unwrap_or(0);
    let is_active = form.is_active.is_some();

    // Password confirmation is a purely presentational concern, checked
    // here rather than in the service.
    let password = form.password.clone().unwrap_or_default();
    if password != form.password_confirm.clone().unwrap_or_default() {
        let roles = available_roles(&current_user, state.roles.list_roles().await?);
        let template = UserFormTemplate {
            form: UserFormContext::from_form(0, &login, &form, role_id, is_active),
            roles,
            error: "passwords do not match".to_string(),
            is_new: true,
            can_change_role: true,
            current_user,
        };
        return Ok(render(&template)?.into_response());
    }

    let input = CreateUser {
        login: login.clone(),
        password,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        phone_number: empty_to_none(form.phone_number.clone()),
        address: empty_to_none(form.address.clone()),
        gender: empty_to_none(form.gender.clone()),
        role_id,
        is_active,
    };

    match state.users.create_user(input).await {
        Ok(user) => {
            log::info!(
                "user '{}' (id {}) created by '{}'",
                user.login,
                user.id,
                current_user.login
            );
            Ok(flash_redirect(
                "/users",
                "success",
                &format!("user '{}' created", user.full_name()),
            )
            .into_response())
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            let roles = available_roles(&current_user, state.roles.list_roles().await?);
            let template = UserFormTemplate {
                form: UserFormContext::from_form(0, &login, &form, role_id, is_active),
                roles,
                error: message,
                is_new: true,
                can_change_role: true,
                current_user,
            };
            Ok(render(&template)?.into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn user_detail(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_view_users {
        return Ok(access_denied());
    }

    let user = match state.users.get_user(user_id).await? {
        Some(user) => user,
        None => return Ok(flash_redirect("/users", "error", "user not found").into_response()),
    };

    let modifiable = current_user.may_modify(&user);
    let template = UserDetailTemplate {
        user: UserDetailContext::from_record(&user),
        can_edit: current_user.can_edit_users && modifiable,
        can_delete: current_user.can_manage_users,
        can_toggle: current_user.can_edit_users && modifiable,
        current_user,
    };
    Ok(render(&template)?.into_response())
}

pub async fn user_edit_form(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_edit_users {
        return Ok(access_denied());
    }

    let user = match state.users.get_user(user_id).await? {
        Some(user) => user,
        None => return Ok(flash_redirect("/users", "error", "user not found").into_response()),
    };

    if !current_user.may_modify(&user) {
        return Ok(flash_redirect(
            "/users",
            "error",
            "you are not allowed to edit administrators",
        )
        .into_response());
    }

    let roles = available_roles(&current_user, state.roles.list_roles().await?);

    let template = UserFormTemplate {
        form: UserFormContext::from_record(&user),
        roles,
        error: String::new(),
        is_new: false,
        can_change_role: current_user.is_admin,
        current_user,
    };
    Ok(render(&template)?.into_response())
}

pub async fn update_user(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_edit_users {
        return Ok(access_denied());
    }

    let existing = match state.users.get_user(user_id).await? {
        Some(user) => user,
        None => return Ok(flash_redirect("/users", "error", "user not found").into_response()),
    };

    if !current_user.may_modify(&existing) {
        return Ok(flash_redirect(
            "/users",
            "error",
            "you are not allowed to edit administrators",
        )
        .into_response());
    }

    // Only admins change role assignments; everyone else keeps the
    // target's current role no matter what was submitted.
    let role_id = if current_user.is_admin {
        form.role_id.unwrap_or(existing.role_id)
    } else {
        existing.role_id
    };
    let is_active = form.is_active.is_some();

    let update = UserUpdate {
        id: user_id,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        phone_number: empty_to_none(form.phone_number.clone()),
        address: empty_to_none(form.address.clone()),
        gender: empty_to_none(form.gender.clone()),
        role_id,
        is_active,
    };

    match state.users.update_user(update).await {
        Ok(user) => {
            log::info!(
                "user '{}' (id {}) updated by '{}'",
                user.login,
                user.id,
                current_user.login
            );
            Ok(flash_redirect(
                "/users",
                "success",
                &format!("user '{}' updated", user.full_name()),
            )
            .into_response())
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            let roles = available_roles(&current_user, state.roles.list_roles().await?);
            let template = UserFormTemplate {
                form: UserFormContext::from_form(
                    user_id,
                    &existing.login,
                    &form,
                    role_id,
                    is_active,
                ),
                roles,
                error: message,
                is_new: false,
                can_change_role: current_user.is_admin,
                current_user,
            };
            Ok(render(&template)?.into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn delete_user(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_manage_users {
        return Ok(access_denied());
    }

    if current_user.id == user_id {
        return Ok(
            flash_redirect("/users", "error", "you cannot delete your own account")
                .into_response(),
        );
    }

    match state.users.delete_user(user_id).await {
        Ok(_) => {
            log::info!("user id {} deleted by '{}'", user_id, current_user.login);
            Ok(flash_redirect("/users", "success", "user deleted").into_response())
        }
        Err(AppError::NotFound(message)) | Err(AppError::Conflict(message)) => {
            Ok(flash_redirect("/users", "error", &message).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn activate_user(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_edit_users {
        return Ok(access_denied());
    }

    let target = match state.users.get_user(user_id).await? {
        Some(user) => user,
        None => return Ok(flash_redirect("/users", "error", "user not found").into_response()),
    };
    if !current_user.may_modify(&target) {
        return Ok(access_denied());
    }

    match state.users.activate_user(user_id).await {
        Ok(_) => {
            log::info!("user id {} activated by '{}'", user_id, current_user.login);
            Ok(flash_redirect("/users", "success", "user activated").into_response())
        }
        Err(AppError::NotFound(message)) | Err(AppError::Conflict(message)) => {
            Ok(flash_redirect("/users", "error", &message).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn deactivate_user(
    cookies: Cookies,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    let current_user = get_current_user(&cookies, &state)
        .await
        .ok_or_else(|| AppError::unauthorized("login required"))?;

    if !current_user.can_edit_users {
        return Ok(access_denied());
    }

    if current_user.id == user_id {
        return Ok(flash_redirect(
            "/users",
            "error",
            "you cannot deactivate your own account",
        )
        .into_response());
    }

    let target = match state.users.get_user(user_id).await? {
        Some(user) => user,
        None => return Ok(flash_redirect("/users", "error", "user not found").into_response()),
    };
    if !current_user.may_modify(&target) {
        return Ok(access_denied());
    }

    match state.users.deactivate_user(user_id).await {
        Ok(_) => {
            log::warn!("user id {} deactivated by '{}'", user_id, current_user.login);
            Ok(flash_redirect("/users", "success", "user deactivated").into_response())
        }
        Err(AppError::NotFound(message)) | Err(AppError::Conflict(message)) => {
            Ok(flash_redirect("/users", "error", &message).into_response())
        }
        Err(err) => Err(err),
    }
}
