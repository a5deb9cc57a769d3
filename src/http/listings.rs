//! Faucet and waitlist handlers. Both collections share these handlers; the
//! route group decides which table a request targets.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};

use crate::models::listing::{ListingRequest, ListingView};
use crate::state::AppState;
use crate::store::listings::{self, ListingKind};

use super::{HttpError, ListQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(collection("/api/faucets", ListingKind::Faucet))
        .merge(collection("/api/waitlists", ListingKind::Waitlist))
}

fn collection(base: &str, kind: ListingKind) -> Router<AppState> {
    Router::new()
        .route(base, get(list_listings).post(create_listing))
        .route(
            &format!("{base}/{{id}}"),
            patch(update_listing).delete(delete_listing),
        )
        .layer(Extension(kind))
}

async fn list_listings(
    State(state): State<AppState>,
    Extension(kind): Extension<ListingKind>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ListingView>>, HttpError> {
    let listings = listings::list_listings(&state.database, kind, query.filter()).await?;
    Ok(Json(listings.into_iter().map(ListingView::from).collect()))
}

async fn create_listing(
    State(state): State<AppState>,
    Extension(kind): Extension<ListingKind>,
    payload: Result<Json<ListingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ListingView>), HttpError> {
    let Json(request) = payload?;
    let new = request.into_new()?;
    let created = listings::create_listing(&state.database, kind, new).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_listing(
    State(state): State<AppState>,
    Extension(kind): Extension<ListingKind>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ListingRequest>, JsonRejection>,
) -> Result<Json<ListingView>, HttpError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let patch = request.into_patch()?;
    let updated = listings::update_listing(&state.database, kind, id, patch).await?;
    Ok(Json(updated.into()))
}

async fn delete_listing(
    State(state): State<AppState>,
    Extension(kind): Extension<ListingKind>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(id) = path?;
    listings::delete_listing(&state.database, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
