use serde_json::json;
use tracing::info;

use crate::commands::publish;
use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text,
    BroadcastKind,
    Event,
    EventActivation,
    EventId,
    EventInput,
    EventPatch,
};

pub async fn create_event(state: &AppState, mut input: EventInput) -> Result<Event, AppError> {
    input.name = normalize_optional_text(Some(input.name))
        .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?;
    input.date = normalize_optional_text(input.date);
    input.location = normalize_optional_text(input.location);

    let event = state.event_repo.create_event(input).await?;
    info!(event = %event.id, name = %event.name, "event created");
    Ok(event)
}

/// Settings and branding changes of the active event are pushed as `config`.
pub async fn update_event(
    state: &AppState,
    id: EventId,
    mut patch: EventPatch,
) -> Result<Event, AppError> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(
            normalize_optional_text(Some(name))
                .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?,
        );
    }
    if let Some(settings) = &patch.settings {
        if settings.checkin_popup_timeout_ms == 0 {
            return Err(AppError::BadRequest(
                "checkinPopupTimeoutMs must be greater than 0".to_string(),
            ));
        }
    }

    let event = state.event_repo.update_event(id, patch).await?;
    info!(event = %event.id, active = event.is_active, "event updated");
    if event.is_active {
        publish(state, BroadcastKind::Config, &event);
    }
    Ok(event)
}

pub async fn delete_event(state: &AppState, id: EventId) -> Result<Event, AppError> {
    let event = state.event_repo.delete_event(id).await?;
    info!(event = %event.id, was_active = event.is_active, "event deleted");
    if event.is_active {
        publish(
            state,
            BroadcastKind::EventChange,
            &json!({ "eventId": null, "previousEventId": event.id, "event": null }),
        );
    }
    Ok(event)
}

/// Flips the active-event pointer and tells every client to drop cached
/// per-event state.
pub async fn activate_event(state: &AppState, id: EventId) -> Result<EventActivation, AppError> {
    let activation = state.event_repo.activate_event(id).await?;
    info!(
        event = %activation.event.id,
        previous = ?activation.previous_event_id,
        "active event switched"
    );
    publish(
        state,
        BroadcastKind::EventChange,
        &json!({
            "eventId": activation.event.id,
            "previousEventId": activation.previous_event_id,
            "event": activation.event,
        }),
    );
    Ok(activation)
}
