use serde_json::json;
use tracing::info;

use crate::commands::publish;
use crate::dtos::{ResetResult, ScopedRequest};
use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text,
    BroadcastKind,
    EventScope,
    Guest,
    GuestId,
    GuestInput,
    GuestPatch,
};

pub async fn create_guest(
    state: &AppState,
    scope: EventScope,
    input: GuestInput,
) -> Result<Guest, AppError> {
    let input = normalize_guest_input(input)?;
    let guest = state.guest_repo.create_guest(scope, input).await?;
    info!(guest = %guest.id, code = %guest.guest_code, queue = guest.queue_number, "guest created");
    publish_guest_update(state, "created", &guest);
    Ok(guest)
}

pub async fn update_guest(
    state: &AppState,
    scope: EventScope,
    id: GuestId,
    mut patch: GuestPatch,
) -> Result<Guest, AppError> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(
            normalize_optional_text(Some(name))
                .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?,
        );
    }
    if let Some(code) = patch.guest_code.take() {
        patch.guest_code = Some(
            normalize_optional_text(Some(code))
                .ok_or_else(|| AppError::BadRequest("guestId must not be empty".to_string()))?,
        );
    }

    let guest = state.guest_repo.update_guest(scope, id, patch).await?;
    info!(guest = %guest.id, "guest updated");
    publish_guest_update(state, "updated", &guest);
    Ok(guest)
}

pub async fn delete_guest(
    state: &AppState,
    id: GuestId,
    payload: ScopedRequest,
) -> Result<Guest, AppError> {
    let guest = state
        .guest_repo
        .delete_guest(EventScope::expecting(payload.event_id), id)
        .await?;
    info!(guest = %guest.id, code = %guest.guest_code, "guest deleted");
    publish_guest_update(state, "deleted", &guest);
    Ok(guest)
}

/// Removes every guest of the active event together with their history.
pub async fn purge_guests(state: &AppState, payload: ScopedRequest) -> Result<ResetResult, AppError> {
    let scope = EventScope::expecting(payload.event_id);
    let removed = state.guest_repo.purge_guests(scope).await?;
    info!(removed, "guests purged");
    publish(state, BroadcastKind::GuestUpdate, &json!({ "action": "purged", "removed": removed }));
    Ok(ResetResult { removed })
}

pub(crate) fn normalize_guest_input(mut input: GuestInput) -> Result<GuestInput, AppError> {
    input.name = normalize_optional_text(Some(input.name))
        .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?;
    input.guest_code = normalize_optional_text(input.guest_code);
    Ok(input)
}

pub(crate) fn publish_guest_update(state: &AppState, action: &str, guest: &Guest) {
    publish(
        state,
        BroadcastKind::GuestUpdate,
        &json!({ "action": action, "guest": guest }),
    );
}
