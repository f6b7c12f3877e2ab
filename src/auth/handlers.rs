use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, PublicUser,
            RegisterRequest, UpdateProfileRequest, UserResponse,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{NewUser, ProfileChanges},
    },
    error::ApiError,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 50;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
        .route("/auth/change-password", put(change_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required_name(value: &str, field: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

fn check_optional_name(value: &Option<String>, field: &str) -> Result<(), ApiError> {
    if let Some(v) = value {
        if v.trim().len() > MAX_NAME_LEN {
            return Err(ApiError::Validation(format!(
                "{field} must be at most {MAX_NAME_LEN} characters"
            )));
        }
    }
    Ok(())
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "register rejected: invalid email");
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("register rejected: password too short");
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let first_name = required_name(&payload.first_name, "First name")?;
    let last_name = required_name(&payload.last_name, "Last name")?;

    // Hash before taking the store lock; the duplicate check itself lives
    // inside the store's critical section.
    let password_hash = hash_password(&payload.password)?;

    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            password_hash,
            first_name,
            last_name,
            role: payload.role.unwrap_or_default(),
        })
        .await?;

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password produce the same response so callers
    // cannot enumerate accounts.
    let user = state
        .users
        .find_by_email(&payload.email)
        .await
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::InvalidCredentials
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

#[instrument(skip(state))]
async fn me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(identity.id)
        .await
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse {
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    check_optional_name(&payload.first_name, "First name")?;
    check_optional_name(&payload.last_name, "Last name")?;

    let user = state
        .users
        .update_profile(
            identity.id,
            ProfileChanges {
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                location: payload.location,
                language: payload.language,
            },
        )
        .await?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(UserResponse {
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
async fn change_password(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.current_password.is_empty() {
        return Err(ApiError::Validation("Current password is required".into()));
    }
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user = state
        .users
        .find_by_id(identity.id)
        .await
        .ok_or(ApiError::UserNotFound)?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change-password rejected: wrong current password");
        return Err(ApiError::InvalidCurrentPassword);
    }

    let password_hash = hash_password(&payload.new_password)?;
    state
        .users
        .update_password_hash(user.id, password_hash)
        .await?;

    info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn name_validation() {
        assert_eq!(required_name("  Ann ", "First name").unwrap(), "Ann");
        assert!(required_name("", "First name").is_err());
        assert!(required_name("   ", "First name").is_err());
        assert!(required_name(&"x".repeat(51), "First name").is_err());
        assert!(check_optional_name(&None, "First name").is_ok());
        assert!(check_optional_name(&Some("x".repeat(51)), "First name").is_err());
    }
}
