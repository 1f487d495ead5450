use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    response::{ApiError, ApiResponse},
    state::AppState,
    users::repo::{NewUser, User, ROLE_ADMIN, ROLE_USER},
};

use super::{
    dto::{LoginData, LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Give a valid email".into()));
    }

    // Existence check before insert; uniqueness is not a DB constraint.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("This email already exists".into()));
    }

    let hash = password::hash_password(&payload.password)?;

    let role = match payload.role.as_deref() {
        Some(ROLE_ADMIN) => ROLE_ADMIN,
        _ => ROLE_USER,
    };

    let user = User::create(
        &state.db,
        &NewUser {
            email: payload.email,
            password_hash: hash,
            role: role.into(),
            name: payload.name,
            address: payload.address,
            phone: payload.phone,
            image: payload.image,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(ApiResponse::ok("User registered successfully", user))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid email or password".into())
        })?;

    if user.is_deleted {
        warn!(user_id = %user.id, "login refused for deleted user");
        return Err(ApiError::Forbidden("User is deleted".into()));
    }

    let ok = password::verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(ApiResponse::ok(
        "User logged in successfully",
        LoginData { user, token },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
        assert!(is_valid_email("UPPER@CASE.NET"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plain"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@no-local.com"));
        assert!(!is_valid_email("two@@ats.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }
}
