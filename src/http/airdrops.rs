use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::models::airdrop::{AirdropRequest, AirdropView, StatusRequest};
use crate::state::AppState;
use crate::store::airdrops;

use super::{HttpError, ListQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/airdrops", get(list_airdrops).post(create_airdrop))
        .route(
            "/api/airdrops/{id}",
            patch(update_airdrop).delete(delete_airdrop),
        )
        .route("/api/airdrops/{id}/status", patch(update_status))
}

async fn list_airdrops(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AirdropView>>, HttpError> {
    let airdrops = airdrops::list_airdrops(&state.database, query.filter()).await?;
    let views = airdrops
        .into_iter()
        .map(|(model, tasks)| AirdropView::new(model, tasks))
        .collect();
    Ok(Json(views))
}

async fn create_airdrop(
    State(state): State<AppState>,
    payload: Result<Json<AirdropRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AirdropView>), HttpError> {
    let Json(request) = payload?;
    let new = request.into_new()?;
    let (model, tasks) = airdrops::create_airdrop(&state.database, new).await?;
    Ok((StatusCode::CREATED, Json(AirdropView::new(model, tasks))))
}

async fn update_airdrop(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AirdropRequest>, JsonRejection>,
) -> Result<Json<AirdropView>, HttpError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let patch = request.into_patch()?;
    let (model, tasks) = airdrops::update_airdrop(&state.database, id, patch).await?;
    Ok(Json(AirdropView::new(model, tasks)))
}

async fn update_status(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<AirdropView>, HttpError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let status = request.into_status()?;
    let (model, tasks) = airdrops::set_airdrop_status(&state.database, id, status).await?;
    Ok(Json(AirdropView::new(model, tasks)))
}

async fn delete_airdrop(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(id) = path?;
    airdrops::delete_airdrop(&state.database, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
