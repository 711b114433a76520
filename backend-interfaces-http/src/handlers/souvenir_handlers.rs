use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::souvenir_commands;
use backend_application::dtos::{
    GiveSouvenirRequest,
    GiveToNewGuestRequest,
    GuestCreatedWithSouvenir,
    ResetResult,
    ScopedRequest,
};
use backend_application::queries::souvenir_queries;
use backend_application::AppState;
use backend_domain::{
    EventScope,
    Souvenir,
    SouvenirGiven,
    SouvenirId,
    SouvenirInput,
    SouvenirPatch,
    SouvenirSummary,
    SouvenirTakeView,
    TakeId,
};

use crate::error::HttpError;
use crate::middleware::require_operator;

pub async fn list_souvenirs(
    State(state): State<AppState>,
) -> Result<Json<Vec<SouvenirSummary>>, HttpError> {
    let souvenirs = souvenir_queries::list_souvenirs(&state).await?;
    Ok(Json(souvenirs))
}

pub async fn get_souvenir(
    State(state): State<AppState>,
    Path(id): Path<SouvenirId>,
) -> Result<Json<SouvenirSummary>, HttpError> {
    let souvenir = souvenir_queries::get_souvenir(&state, id).await?;
    Ok(Json(souvenir))
}

pub async fn create_souvenir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(scope): Query<ScopedRequest>,
    Json(payload): Json<SouvenirInput>,
) -> Result<Json<Souvenir>, HttpError> {
    require_operator(&state, &headers).await?;
    let souvenir =
        souvenir_commands::create_souvenir(&state, EventScope::expecting(scope.event_id), payload)
            .await?;
    Ok(Json(souvenir))
}

pub async fn update_souvenir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<SouvenirId>,
    Query(scope): Query<ScopedRequest>,
    Json(payload): Json<SouvenirPatch>,
) -> Result<Json<Souvenir>, HttpError> {
    require_operator(&state, &headers).await?;
    let souvenir = souvenir_commands::update_souvenir(
        &state,
        EventScope::expecting(scope.event_id),
        id,
        payload,
    )
    .await?;
    Ok(Json(souvenir))
}

pub async fn delete_souvenir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<SouvenirId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<Souvenir>, HttpError> {
    require_operator(&state, &headers).await?;
    let souvenir = souvenir_commands::delete_souvenir(&state, id, scope).await?;
    Ok(Json(souvenir))
}

pub async fn give_souvenir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<SouvenirId>,
    Json(payload): Json<GiveSouvenirRequest>,
) -> Result<Json<SouvenirGiven>, HttpError> {
    let operator = require_operator(&state, &headers).await?;
    let given = souvenir_commands::give_souvenir(&state, &operator, id, payload).await?;
    Ok(Json(given))
}

pub async fn give_to_new_guest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<SouvenirId>,
    Json(payload): Json<GiveToNewGuestRequest>,
) -> Result<Json<GuestCreatedWithSouvenir>, HttpError> {
    let operator = require_operator(&state, &headers).await?;
    let created = souvenir_commands::give_to_new_guest(&state, &operator, id, payload).await?;
    Ok(Json(created))
}

pub async fn reset_souvenir(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<SouvenirId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<ResetResult>, HttpError> {
    require_operator(&state, &headers).await?;
    let result = souvenir_commands::reset_souvenir(&state, id, scope).await?;
    Ok(Json(result))
}

pub async fn remove_take(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(take_id): Path<TakeId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<SouvenirTakeView>, HttpError> {
    require_operator(&state, &headers).await?;
    let take = souvenir_commands::remove_take(&state, take_id, scope).await?;
    Ok(Json(take))
}
