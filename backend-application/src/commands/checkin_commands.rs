use tracing::{info, warn};

use crate::dtos::{
    CheckinContext,
    CodeCheckinRequest,
    LookupCheckinRequest,
    LookupOutcome,
    QrCheckinRequest,
    UncheckinRequest,
};
use crate::commands::guest_commands::publish_guest_update;
use crate::commands::publish;
use crate::{AppError, AppState};
use backend_domain::{
    extract_qr_identifier,
    normalize_optional_text,
    BroadcastKind,
    CheckinAttempt,
    EventScope,
    GuestId,
    GuestInput,
    GuestTarget,
    GuestView,
    OperatorIdentity,
    StoreError,
};

const LOOKUP_CANDIDATE_LIMIT: usize = 20;

pub async fn checkin_by_code(
    state: &AppState,
    operator: Option<&OperatorIdentity>,
    payload: CodeCheckinRequest,
) -> Result<GuestView, AppError> {
    let code = normalize_optional_text(Some(payload.code))
        .ok_or_else(|| AppError::BadRequest("code must not be empty".to_string()))?;
    let scope = EventScope::expecting(payload.context.event_id);
    let attempt = build_attempt(operator, &payload.context);

    match admit(state, scope, GuestTarget::Code(code.clone()), attempt.clone(), operator).await {
        Err(AppError::NotFound(message)) => {
            let Some(name) = normalize_optional_text(payload.name) else {
                return Err(AppError::NotFound(message));
            };
            if !auto_create_enabled(state, scope).await? {
                return Err(AppError::NotFound(message));
            }
            auto_create_guest(state, scope, &code, name).await?;
            admit(state, scope, GuestTarget::Code(code), attempt, operator).await
        }
        other => other,
    }
}

pub async fn checkin_by_guest_id(
    state: &AppState,
    operator: Option<&OperatorIdentity>,
    guest_id: GuestId,
    context: CheckinContext,
) -> Result<GuestView, AppError> {
    let scope = EventScope::expecting(context.event_id);
    let attempt = build_attempt(operator, &context);
    admit(state, scope, GuestTarget::Id(guest_id), attempt, operator).await
}

pub async fn checkin_by_qr(
    state: &AppState,
    operator: Option<&OperatorIdentity>,
    payload: QrCheckinRequest,
) -> Result<GuestView, AppError> {
    let code = extract_qr_identifier(&payload.payload)
        .ok_or_else(|| AppError::BadRequest("qr payload carries no identifier".to_string()))?;
    let scope = EventScope::expecting(payload.context.event_id);
    let attempt = build_attempt(operator, &payload.context);
    admit(state, scope, GuestTarget::Code(code), attempt, operator).await
}

/// Admits only when the query resolves to exactly one guest.
pub async fn checkin_by_lookup(
    state: &AppState,
    operator: Option<&OperatorIdentity>,
    payload: LookupCheckinRequest,
) -> Result<LookupOutcome, AppError> {
    let query = normalize_optional_text(Some(payload.query))
        .ok_or_else(|| AppError::BadRequest("query must not be empty".to_string()))?;
    let scope = EventScope::expecting(payload.context.event_id);
    let mut candidates = state
        .guest_repo
        .search_guests(scope, &query, LOOKUP_CANDIDATE_LIMIT)
        .await?;

    match candidates.len() {
        0 => Err(AppError::NotFound(format!("no guest matches '{}'", query))),
        1 => {
            let guest = candidates.remove(0);
            let attempt = build_attempt(operator, &payload.context);
            let view = admit(state, scope, GuestTarget::Id(guest.id), attempt, operator).await?;
            Ok(LookupOutcome::Admitted { guest: view })
        }
        _ => Ok(LookupOutcome::Multiple { candidates }),
    }
}

pub async fn uncheckin(
    state: &AppState,
    operator: &OperatorIdentity,
    guest_id: GuestId,
    payload: UncheckinRequest,
) -> Result<GuestView, AppError> {
    let account = state
        .operator_repo
        .get_account(operator.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("operator no longer exists".to_string()))?;
    if !state
        .credentials
        .verify_password(&account.password_hash, &payload.password)
    {
        warn!(operator = %operator.id, guest = %guest_id, "uncheck-in rejected: bad password");
        return Err(AppError::Unauthorized("password does not match".to_string()));
    }

    let reason = payload.reason.trim();
    if reason.chars().count() < state.config.min_reversal_reason_len {
        return Err(AppError::BadRequest(format!(
            "reason must be at least {} characters",
            state.config.min_reversal_reason_len
        )));
    }

    let outcome = state
        .ledger
        .reverse(EventScope::expecting(payload.event_id), guest_id, operator, reason)
        .await?;
    state.metrics.record_reversal();
    info!(
        guest = %outcome.guest.id,
        operator = %operator.id,
        reason = %outcome.reversal.reason,
        "check-in reversed"
    );

    let view = GuestView::new(outcome.guest, outcome.checkins, Some(operator.id));
    publish(state, BroadcastKind::Uncheckin, &view);
    Ok(view)
}

async fn admit(
    state: &AppState,
    scope: EventScope,
    target: GuestTarget,
    attempt: CheckinAttempt,
    viewer: Option<&OperatorIdentity>,
) -> Result<GuestView, AppError> {
    let outcome = state.ledger.admit(scope, target, attempt).await?;
    let viewer_id = viewer.map(|identity| identity.id);

    if outcome.is_duplicate() {
        state.metrics.record_duplicate();
        let message = outcome
            .message
            .clone()
            .unwrap_or_else(|| "already checked in".to_string());
        warn!(guest = %outcome.guest.id, code = %outcome.guest.guest_code, "duplicate check-in");
        return Ok(GuestView::new(outcome.guest, outcome.checkins, viewer_id).duplicate(message));
    }

    state.metrics.record_checkin();
    info!(
        guest = %outcome.guest.id,
        code = %outcome.guest.guest_code,
        count = outcome.checkins.len(),
        "guest checked in"
    );
    let view = GuestView::new(outcome.guest, outcome.checkins, viewer_id);
    publish(state, BroadcastKind::Checkin, &view);
    Ok(view)
}

fn build_attempt(operator: Option<&OperatorIdentity>, context: &CheckinContext) -> CheckinAttempt {
    let counter_name = normalize_optional_text(context.counter_name.clone())
        .or_else(|| operator.and_then(|identity| identity.counter_name.clone()));
    CheckinAttempt {
        operator_id: operator.map(|identity| identity.id),
        operator_name: operator.map(|identity| identity.name.clone()),
        counter_name,
    }
}

async fn auto_create_enabled(state: &AppState, scope: EventScope) -> Result<bool, AppError> {
    let event = state.event_repo.scoped_event(scope).await?;
    Ok(event.settings.auto_create_guest)
}

async fn auto_create_guest(
    state: &AppState,
    scope: EventScope,
    code: &str,
    name: String,
) -> Result<(), AppError> {
    let input = GuestInput {
        guest_code: Some(code.to_string()),
        name,
        ..GuestInput::default()
    };
    match state.guest_repo.create_guest(scope, input).await {
        Ok(guest) => {
            info!(guest = %guest.id, code = %guest.guest_code, "guest auto-created at check-in");
            publish_guest_update(state, "created", &guest);
            Ok(())
        }
        // Another terminal created the same code first; admit against that guest.
        Err(StoreError::DuplicateGuestId(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
