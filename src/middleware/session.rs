use tower_cookies::Cookies;

use crate::models::{is_admin_role, is_manager_role, UserRecord};
use crate::utils::verify_token;
use crate::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// The resolved identity behind the session cookie, with the access flags
/// the templates and handlers check. Admin has full access; Manager reads
/// everything but only gets limited write access.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub login: String,
    pub full_name: String,
    pub email: String,
    pub role_id: i32,
    pub role_name: String,
    // Helper flags for templates
    pub is_admin: bool,
    pub is_manager: bool,
    pub can_view_users: bool,
    pub can_edit_users: bool,
    pub can_manage_users: bool,
    pub can_view_roles: bool,
    pub can_manage_roles: bool,
}

impl CurrentUser {
    pub fn from_record(user: &UserRecord) -> Self {
        let is_admin = is_admin_role(&user.role_name);
        let is_manager = is_manager_role(&user.role_name);

        Self {
            id: user.id,
            login: user.login.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            role_id: user.role_id,
            role_name: user.role_name.clone(),
            is_admin,
            is_manager,
            can_view_users: is_admin || is_manager,
            can_edit_users: is_admin || is_manager,
            can_manage_users: is_admin,
            can_view_roles: is_admin || is_manager,
            can_manage_roles: is_admin,
        }
    }

    /// Managers may not touch Admin-role users at all.
    pub fn may_modify(&self, target: &UserRecord) -> bool {
        self.is_admin || (self.is_manager && !is_admin_role(&target.role_name))
    }
}

/// Resolves the current user from the auth cookie, re-reading the store on
/// every request so deleted or deactivated accounts lose their session
/// immediately.
pub async fn get_current_user(cookies: &Cookies, state: &AppState) -> Option<CurrentUser> {
    let token = cookies.get(AUTH_COOKIE)?.value().to_string();

    let claims = verify_token(&state.config.jwt_secret, &token).ok()?;
    let user_id = claims.sub.parse::<i32>().ok()?;

    let user = state.auth.get_user_by_id(user_id).await.ok()??;
    if !user.is_active {
        return None;
    }

    Some(CurrentUser::from_record(&user))
}
