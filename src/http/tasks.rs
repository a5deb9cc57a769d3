use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};

use crate::models::airdrop::{TaskRequest, TaskView};
use crate::state::AppState;
use crate::store::airdrops;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/airdrops/{id}/tasks", post(create_task))
        .route("/api/tasks/{id}", patch(update_task).delete(delete_task))
}

async fn create_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskView>), HttpError> {
    let Path(airdrop_id) = path?;
    let Json(request) = payload?;
    let new = request.into_new()?;
    let task = airdrops::create_task(&state.database, airdrop_id, new).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<TaskView>, HttpError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let patch = request.into_patch()?;
    let task = airdrops::update_task(&state.database, id, patch).await?;
    Ok(Json(task.into()))
}

async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(id) = path?;
    airdrops::delete_task(&state.database, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
