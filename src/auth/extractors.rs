use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    response::ApiError,
    state::AppState,
    users::repo::{User, ROLE_ADMIN},
};

use super::jwt::JwtKeys;

/// First gate: bearer token must verify and resolve to a live user.
///
/// The user is looked up fresh on every request by the token's email claim;
/// soft-deleted users are rejected even if their token is still valid.
pub struct AuthUser(pub User);

/// Second gate: stacks on [`AuthUser`] and additionally requires the
/// `"Admin"` role. Mount it on admin-only routes; everything else takes
/// `AuthUser` alone.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Access denied, token missing!".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Access denied, token missing!".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Forbidden("Invalid or expired token".into())
        })?;

        let user = User::find_by_email(&state.db, &claims.email)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| {
                warn!(email = %claims.email, "token resolved to no usable user");
                ApiError::Forbidden("Invalid or expired token".into())
            })?;

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            warn!(user_id = %user.id, role = %user.role, "admin route refused");
            return Err(ApiError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}
