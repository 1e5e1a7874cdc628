use askama::Template;
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};

use crate::error::AppError;
use crate::handlers::render;
use crate::middleware::{get_current_user, AUTH_COOKIE};
use crate::utils::create_token;
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    login: String,
    password: String,
}

pub async fn login_page(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    // Already signed in? Straight to the dashboard.
    if get_current_user(&cookies, &state).await.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let template = LoginTemplate {
        error: String::new(),
    };
    Ok(render(&template)?.into_response())
}

pub async fn login(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.auth.authenticate(&form.login, &form.password).await {
        Ok(user) => {
            let token = create_token(&state.config.jwt_secret, user.id, user.login.clone())
                .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))?;

            let cookie = Cookie::build((AUTH_COOKIE, token))
                .path("/")
                .http_only(true)
                .max_age(time::Duration::hours(24))
                .build();
            cookies.add(cookie);

            log::info!("user '{}' signed in", user.login);
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(AppError::Unauthorized(message)) => {
            log::warn!("failed sign-in attempt for '{}'", form.login);
            let template = LoginTemplate { error: message };
            Ok((StatusCode::UNAUTHORIZED, render(&template)?).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
    Redirect::to("/login")
}
