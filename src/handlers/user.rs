use crate::dtos::user::{ChangePasswordRequest, LoginRequest, LoginResponse, UserResponse};
use crate::auth::jwt::{sign_token, SESSION_HOURS};
use crate::error::AppError;
use axum::{extract::State, Json};
use crate::state::AppState;
use crate::middleware::auth::AuthContext;
use crate::services::visibility::Scope;
use axum::extract::Extension;

const MIN_PASSWORD_LEN: usize = 3;

pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>
) -> Result<Json<LoginResponse>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let mut users = state.records.users().await?;
    if users.is_empty() {
        // Nothing cached yet; the sheet may have come back since startup
        state.records.refresh_users_from_cloud().await?;
        users = state.records.users().await?;
    }
    if users.is_empty() {
        return Err(AppError::unavailable("No employee data loaded yet, please retry"));
    }

    let user = users
        .iter()
        .find(|u| u.matches_credentials(payload.username.trim(), &payload.password))
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    let token = sign_token(user, &state.jwt_secret)?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: (SESSION_HOURS * 60 * 60) as usize,
        user: UserResponse::from(user),
    }))
}

// Authenticated endpoint: returns the cached profile for the id in AuthContext
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>
) -> Result<Json<UserResponse>, AppError> {
    let user = state.records.find_user(&auth.user_id).await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserResponse::from(&user)))
}

// Employees the caller may pick in report filters
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.records.users().await?;
    let scope = Scope::new(&auth.viewer(), &users);
    Ok(Json(scope.employees(&users).into_iter().map(UserResponse::from).collect()))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.records.find_user(&auth.user_id).await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    validate_password_change(user.password.as_deref(), &req)?;

    if !state.records.update_user_password(&user.id, &req.new_password).await? {
        return Err(AppError::not_found("User not found"));
    }
    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(UserResponse::from(&user)))
}

fn validate_password_change(stored: Option<&str>, req: &ChangePasswordRequest) -> Result<(), AppError> {
    if stored != Some(req.current_password.as_str()) {
        return Err(AppError::validation("Current password is incorrect"));
    }
    if req.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("New password is too short"));
    }
    if req.new_password != req.confirm_password {
        return Err(AppError::validation("Password confirmation does not match"));
    }
    if req.new_password == req.current_password {
        return Err(AppError::validation("New password must differ from the current one"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(current: &str, new: &str, confirm: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            current_password: current.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn password_change_rules() {
        let stored = Some("old");
        assert!(validate_password_change(stored, &req("old", "new1", "new1")).is_ok());
        assert!(validate_password_change(stored, &req("bad", "new1", "new1")).is_err());
        assert!(validate_password_change(stored, &req("old", "ab", "ab")).is_err());
        assert!(validate_password_change(stored, &req("old", "new1", "new2")).is_err());
        assert!(validate_password_change(stored, &req("old", "old", "old")).is_err());
        assert!(validate_password_change(None, &req("", "new1", "new1")).is_err());
    }
}
