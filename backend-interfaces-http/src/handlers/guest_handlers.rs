use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::guest_commands;
use backend_application::dtos::{GuestDetail, ResetResult, ScopedRequest, SearchQuery};
use backend_application::queries::{guest_queries, souvenir_queries};
use backend_application::AppState;
use backend_domain::{EventScope, Guest, GuestId, GuestInput, GuestListQuery, GuestPatch, SouvenirTakeView};

use crate::error::HttpError;
use crate::middleware::{optional_operator, require_operator};

pub async fn list_guests(
    State(state): State<AppState>,
    Query(query): Query<GuestListQuery>,
) -> Result<Json<Vec<Guest>>, HttpError> {
    let guests = guest_queries::list_guests(&state, query).await?;
    Ok(Json(guests))
}

pub async fn search_guests(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Guest>>, HttpError> {
    let guests = guest_queries::search_guests(&state, query.q, query.limit).await?;
    Ok(Json(guests))
}

pub async fn get_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GuestId>,
) -> Result<Json<GuestDetail>, HttpError> {
    let viewer = optional_operator(&state, &headers).await?;
    let detail = guest_queries::get_guest_detail(&state, viewer.as_ref(), id).await?;
    Ok(Json(detail))
}

pub async fn guest_souvenirs(
    State(state): State<AppState>,
    Path(id): Path<GuestId>,
) -> Result<Json<Vec<SouvenirTakeView>>, HttpError> {
    let takes = souvenir_queries::guest_takes(&state, id).await?;
    Ok(Json(takes))
}

pub async fn create_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(scope): Query<ScopedRequest>,
    Json(payload): Json<GuestInput>,
) -> Result<Json<Guest>, HttpError> {
    require_operator(&state, &headers).await?;
    let guest =
        guest_commands::create_guest(&state, EventScope::expecting(scope.event_id), payload).await?;
    Ok(Json(guest))
}

pub async fn update_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GuestId>,
    Query(scope): Query<ScopedRequest>,
    Json(payload): Json<GuestPatch>,
) -> Result<Json<Guest>, HttpError> {
    require_operator(&state, &headers).await?;
    let guest =
        guest_commands::update_guest(&state, EventScope::expecting(scope.event_id), id, payload).await?;
    Ok(Json(guest))
}

pub async fn delete_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<GuestId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<Guest>, HttpError> {
    require_operator(&state, &headers).await?;
    let guest = guest_commands::delete_guest(&state, id, scope).await?;
    Ok(Json(guest))
}

pub async fn purge_guests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<ResetResult>, HttpError> {
    require_operator(&state, &headers).await?;
    let result = guest_commands::purge_guests(&state, scope).await?;
    Ok(Json(result))
}
