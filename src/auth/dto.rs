use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Request body for user registration. Profile fields are optional; block
/// and delete flags are server-controlled and ignored if sent.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload returned on successful login. The user's password hash is never
/// serialized.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
}
