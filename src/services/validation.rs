use crate::error::AppError;

/// Field must be non-empty after trimming.
pub fn required(value: &str, message: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(())
}

pub fn max_length(value: &str, max: usize, message: &str) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::validation(message));
    }
    Ok(())
}

/// Login shape: 3-50 characters, letters/digits/underscore only.
pub fn login_shape(login: &str) -> Result<(), AppError> {
    let len = login.chars().count();
    if !(3..=50).contains(&len) {
        return Err(AppError::validation(
            "login must be between 3 and 50 characters",
        ));
    }
    if !login.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::validation(
            "login may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

pub fn password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 6 {
        return Err(AppError::validation(
            "password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Structural email check: a single '@' with a non-empty local part and
/// domain, no whitespace. Deliverability is not our problem.
pub fn email_shape(email: &str) -> Result<(), AppError> {
    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    };
    if !valid {
        return Err(AppError::validation("invalid email format"));
    }
    Ok(())
}
