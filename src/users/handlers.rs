use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;

use crate::{
    auth::extractors::AdminUser,
    response::{ApiError, ApiResponse},
    search::UserSearch,
    state::AppState,
};

use super::repo::{self, UserCard, UserListing};

/// GET /get-users — admin only, optional `search`/`recent` filters.
#[instrument(skip(state, _admin))]
pub async fn get_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<UserSearch>,
) -> Result<Json<ApiResponse<Vec<UserListing>>>, ApiError> {
    let users = repo::list(&state.db, &params).await?;
    Ok(ApiResponse::ok("All users retrieved successfully", users))
}

/// GET /get-userData — admin only, minimal projection.
#[instrument(skip(state, _admin))]
pub async fn get_user_data(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<UserCard>>>, ApiError> {
    let cards = repo::list_cards(&state.db).await?;
    Ok(ApiResponse::ok("User data retrieved successfully", cards))
}
