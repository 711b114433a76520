use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::event_commands;
use backend_application::queries::event_queries;
use backend_application::AppState;
use backend_domain::{Event, EventActivation, EventId, EventInput, EventPatch, EventStats};

use crate::error::HttpError;
use crate::middleware::require_operator;

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, HttpError> {
    let events = event_queries::list_events(&state).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, HttpError> {
    let event = event_queries::get_event(&state, id).await?;
    Ok(Json(event))
}

/// Terminals poll this on start and after every `event_change`.
pub async fn get_active_event(State(state): State<AppState>) -> Result<Json<Event>, HttpError> {
    let event = event_queries::active_event(&state).await?;
    Ok(Json(event))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<EventStats>, HttpError> {
    let stats = event_queries::dashboard_stats(&state).await?;
    Ok(Json(stats))
}

pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EventInput>,
) -> Result<Json<Event>, HttpError> {
    require_operator(&state, &headers).await?;
    let event = event_commands::create_event(&state, payload).await?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<EventId>,
    Json(payload): Json<EventPatch>,
) -> Result<Json<Event>, HttpError> {
    require_operator(&state, &headers).await?;
    let event = event_commands::update_event(&state, id, payload).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<EventId>,
) -> Result<Json<Event>, HttpError> {
    require_operator(&state, &headers).await?;
    let event = event_commands::delete_event(&state, id).await?;
    Ok(Json(event))
}

pub async fn activate_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<EventId>,
) -> Result<Json<EventActivation>, HttpError> {
    require_operator(&state, &headers).await?;
    let activation = event_commands::activate_event(&state, id).await?;
    Ok(Json(activation))
}
