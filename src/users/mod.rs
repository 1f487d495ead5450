pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-users", get(handlers::get_users))
        .route("/get-userData", get(handlers::get_user_data))
}
