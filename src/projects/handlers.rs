use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    response::{ApiError, ApiResponse},
    search::ProjectSearch,
    state::AppState,
    users,
};

use super::{
    dto::{AssignUserRequest, InsertedCount, UploadFileRequest},
    repo::{self, Attachment, NewProject, Project},
    services,
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/add-projects", post(add_projects))
        .route("/addProject", post(add_project))
        .route("/get-projects", get(get_projects))
        .route("/get-project/:id", get(get_project))
        .route("/get-projects/:assignedId", get(get_projects_by_assignee))
        .route("/upload-file/:id", post(upload_file))
        .route("/asignUser/:projectId", patch(assign_user))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid project ID format".into()))
}

/// POST /add-projects — admin bulk insert.
#[instrument(skip(state, _admin, payload))]
pub async fn add_projects(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<Vec<NewProject>>,
) -> Result<Json<ApiResponse<InsertedCount>>, ApiError> {
    let inserted_count = repo::insert_many(&state.db, &payload).await?;
    info!(count = inserted_count, "projects bulk inserted");
    Ok(ApiResponse::ok(
        "All projects added successfully",
        InsertedCount { inserted_count },
    ))
}

/// POST /addProject — single insert; bumps the assignee's counter when the
/// body names one.
#[instrument(skip(state, user, payload))]
pub async fn add_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<NewProject>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = repo::insert_one(&state.db, &payload).await?;

    if let Some(assignee) = project.assigned_user_id {
        let bumped = users::repo::increment_assign(&state.db, assignee).await?;
        if !bumped {
            warn!(%assignee, "assignee not found, counter not bumped");
        }
    }

    info!(project_id = %project.id, by = %user.id, "project added");
    Ok(ApiResponse::ok("Project added successfully", project))
}

/// GET /get-projects — token required, optional `search`/`startDate`.
#[instrument(skip(state, _user))]
pub async fn get_projects(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ProjectSearch>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = repo::list(&state.db, &params).await?;
    Ok(ApiResponse::ok(
        "All projects retrieved successfully",
        projects,
    ))
}

/// GET /get-project/:id — 400 on malformed id, 404 on miss.
#[instrument(skip(state, _user))]
pub async fn get_project(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let id = parse_id(&id)?;
    let project = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    Ok(ApiResponse::ok("Project retrieved successfully", project))
}

/// GET /get-projects/:assignedId — open listing of a user's assignments.
#[instrument(skip(state))]
pub async fn get_projects_by_assignee(
    State(state): State<AppState>,
    Path(assigned_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let assigned_id = parse_id(&assigned_id)?;
    let projects = repo::list_by_assignee(&state.db, assigned_id).await?;
    Ok(ApiResponse::ok(
        "Assigned projects retrieved successfully",
        projects,
    ))
}

/// POST /upload-file/:id — admin only; stores the file and appends its link
/// to the project's attachment list.
#[instrument(skip(state, _admin, payload))]
pub async fn upload_file(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UploadFileRequest>,
) -> Result<Json<ApiResponse<Attachment>>, ApiError> {
    let id = parse_id(&id)?;
    let attachment = services::attach_file(&state, id, payload).await?;
    Ok(ApiResponse::ok(
        "File uploaded and link saved successfully",
        attachment,
    ))
}

/// PATCH /asignUser/:projectId — overwrite the assignee, bump their counter.
#[instrument(skip(state, _admin, payload))]
pub async fn assign_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(project_id): Path<String>,
    Json(payload): Json<AssignUserRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let project_id = parse_id(&project_id)?;

    let updated = repo::assign_user(&state.db, project_id, payload.user_id).await?;
    if !updated {
        return Err(ApiError::NotFound("Project not found".into()));
    }

    let bumped = users::repo::increment_assign(&state.db, payload.user_id).await?;
    if !bumped {
        warn!(user_id = %payload.user_id, "assignee not found, counter not bumped");
    }

    info!(%project_id, user_id = %payload.user_id, "project assigned");
    Ok(ApiResponse::ok("User assigned successfully", ()))
}
