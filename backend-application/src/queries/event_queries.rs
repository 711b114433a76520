use crate::{AppError, AppState};
use backend_domain::{Event, EventId, EventScope, EventStats};

pub async fn list_events(state: &AppState) -> Result<Vec<Event>, AppError> {
    Ok(state.event_repo.list_events().await?)
}

pub async fn get_event(state: &AppState, id: EventId) -> Result<Event, AppError> {
    Ok(state.event_repo.get_event(id).await?)
}

pub async fn active_event(state: &AppState) -> Result<Event, AppError> {
    state
        .event_repo
        .active_event()
        .await?
        .ok_or_else(|| AppError::NotFound("no active event".to_string()))
}

pub async fn dashboard_stats(state: &AppState) -> Result<EventStats, AppError> {
    Ok(state.event_repo.event_stats(EventScope::active()).await?)
}
