use serde_json::json;
use tracing::{info, warn};

use crate::commands::guest_commands::{normalize_guest_input, publish_guest_update};
use crate::commands::publish;
use crate::dtos::{GiveSouvenirRequest, GiveToNewGuestRequest, GuestCreatedWithSouvenir, ResetResult, ScopedRequest};
use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text,
    BroadcastKind,
    CheckinAttempt,
    EventScope,
    GiveOutcome,
    GuestView,
    OperatorIdentity,
    Souvenir,
    SouvenirGiven,
    SouvenirId,
    SouvenirInput,
    SouvenirPatch,
    SouvenirTakeView,
    StoreError,
    TakeId,
};

pub async fn create_souvenir(
    state: &AppState,
    scope: EventScope,
    mut input: SouvenirInput,
) -> Result<Souvenir, AppError> {
    input.name = normalize_optional_text(Some(input.name))
        .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?;
    input.description = normalize_optional_text(input.description);
    let souvenir = state.souvenir_repo.create_souvenir(scope, input).await?;
    info!(souvenir = %souvenir.id, quantity = souvenir.quantity, "souvenir created");
    Ok(souvenir)
}

pub async fn update_souvenir(
    state: &AppState,
    scope: EventScope,
    id: SouvenirId,
    mut patch: SouvenirPatch,
) -> Result<Souvenir, AppError> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(
            normalize_optional_text(Some(name))
                .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?,
        );
    }
    let souvenir = state.souvenir_repo.update_souvenir(scope, id, patch).await?;
    info!(souvenir = %souvenir.id, quantity = souvenir.quantity, "souvenir updated");
    Ok(souvenir)
}

pub async fn delete_souvenir(
    state: &AppState,
    id: SouvenirId,
    payload: ScopedRequest,
) -> Result<Souvenir, AppError> {
    let souvenir = state
        .souvenir_repo
        .delete_souvenir(EventScope::expecting(payload.event_id), id)
        .await?;
    info!(souvenir = %souvenir.id, "souvenir deleted");
    Ok(souvenir)
}

pub async fn give_souvenir(
    state: &AppState,
    operator: &OperatorIdentity,
    souvenir_id: SouvenirId,
    payload: GiveSouvenirRequest,
) -> Result<SouvenirGiven, AppError> {
    let scope = EventScope::expecting(payload.event_id);
    let outcome = state
        .souvenir_repo
        .give_souvenir(scope, souvenir_id, payload.guest_id, Some(operator.name.clone()))
        .await;

    match outcome {
        Ok(GiveOutcome::Given(given)) => {
            state.metrics.record_souvenir();
            info!(
                souvenir = %souvenir_id,
                guest = %given.guest.id,
                remaining = given.remaining,
                "souvenir given"
            );
            publish(state, BroadcastKind::SouvenirGiven, &given);
            Ok(given)
        }
        Ok(GiveOutcome::AlreadyTaken { guest, history }) => {
            warn!(souvenir = %souvenir_id, guest = %guest.id, prior = history.len(), "souvenir already taken");
            Err(AppError::AlreadyTaken {
                guest: Box::new(guest),
                history,
            })
        }
        Err(StoreError::SoldOut) => Err(sold_out(state, souvenir_id)),
        Err(err) => Err(err.into()),
    }
}

fn sold_out(state: &AppState, souvenir_id: SouvenirId) -> AppError {
    state.metrics.record_sold_out();
    warn!(souvenir = %souvenir_id, "souvenir sold out");
    AppError::SoldOut(format!("souvenir {} is sold out", souvenir_id))
}

/// Registers a walk-in guest at the souvenir desk and hands over the souvenir.
/// When the event requires check-in first, the new guest is admitted by the
/// same operator. Broadcasts go out only once the whole unit is stored.
pub async fn give_to_new_guest(
    state: &AppState,
    operator: &OperatorIdentity,
    souvenir_id: SouvenirId,
    payload: GiveToNewGuestRequest,
) -> Result<GuestCreatedWithSouvenir, AppError> {
    let scope = EventScope::expecting(payload.event_id);
    let input = normalize_guest_input(payload.guest)?;
    let attempt = CheckinAttempt {
        operator_id: Some(operator.id),
        operator_name: Some(operator.name.clone()),
        counter_name: operator.counter_name.clone(),
    };

    let walk_in = match state
        .souvenir_repo
        .give_to_new_guest(scope, souvenir_id, input, attempt, Some(operator.name.clone()))
        .await
    {
        Ok(walk_in) => walk_in,
        Err(StoreError::SoldOut) => return Err(sold_out(state, souvenir_id)),
        Err(err) => return Err(err.into()),
    };

    info!(
        guest = %walk_in.guest.id,
        code = %walk_in.guest.guest_code,
        souvenir = %souvenir_id,
        "walk-in guest registered at the souvenir desk"
    );
    publish_guest_update(state, "created", &walk_in.guest);
    if let Some(admitted) = walk_in.admission.filter(|admitted| !admitted.is_duplicate()) {
        state.metrics.record_checkin();
        let view = GuestView::new(admitted.guest, admitted.checkins, Some(operator.id));
        publish(state, BroadcastKind::Checkin, &view);
    }
    state.metrics.record_souvenir();
    publish(state, BroadcastKind::SouvenirGiven, &walk_in.given);

    let created = GuestCreatedWithSouvenir {
        guest: walk_in.guest,
        given: walk_in.given,
    };
    publish(state, BroadcastKind::GuestCreatedSouvenir, &created);
    Ok(created)
}

pub async fn remove_take(
    state: &AppState,
    take_id: TakeId,
    payload: ScopedRequest,
) -> Result<SouvenirTakeView, AppError> {
    let take = state
        .souvenir_repo
        .remove_take(EventScope::expecting(payload.event_id), take_id)
        .await?;
    info!(take = %take_id, guest = %take.take.guest_id, "souvenir take removed");
    publish(state, BroadcastKind::SouvenirRemoved, &take);
    if let Ok(guest) = state
        .guest_repo
        .get_guest(EventScope::expecting(payload.event_id), take.take.guest_id)
        .await
    {
        publish_guest_update(state, "updated", &guest);
    }
    Ok(take)
}

pub async fn reset_souvenir(
    state: &AppState,
    id: SouvenirId,
    payload: ScopedRequest,
) -> Result<ResetResult, AppError> {
    let removed = state
        .souvenir_repo
        .reset_souvenir(EventScope::expecting(payload.event_id), id)
        .await?;
    info!(souvenir = %id, removed, "souvenir reset");
    publish(state, BroadcastKind::SouvenirReset, &json!({ "souvenirId": id, "removed": removed }));
    Ok(ResetResult { removed })
}
