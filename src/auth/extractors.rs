use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity attached to a request after the bearer token is verified and the
/// claimed user is resolved against the credential store.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

async fn identify(parts: &Parts, state: &AppState) -> Result<Identity, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingToken)?;

    // Expect "Bearer <token>"; anything else counts as no token at all.
    let token = header.strip_prefix("Bearer ").ok_or(ApiError::MissingToken)?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::InvalidToken
    })?;

    // Tokens are stateless, so re-check that the claimed user still exists.
    let user = state
        .users
        .find_by_id(claims.sub)
        .await
        .ok_or(ApiError::UserNotFound)?;

    Ok(Identity {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

/// Required authentication: rejects with 401/403 unless a valid bearer token
/// resolves to a live user.
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        identify(parts, state).await.map(AuthUser)
    }
}

/// Optional authentication: any failure along the way just means the request
/// proceeds anonymously. Used by endpoints that personalize for logged-in
/// callers but still serve everyone else.
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(identify(parts, state).await.ok()))
    }
}
