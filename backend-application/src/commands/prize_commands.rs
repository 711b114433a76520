use rand::seq::SliceRandom;
use serde_json::json;
use tracing::{info, warn};

use crate::commands::publish;
use crate::dtos::{CollectPrizeRequest, ResetResult, ScopedRequest};
use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text,
    BroadcastKind,
    EventScope,
    Guest,
    GuestId,
    OperatorIdentity,
    Prize,
    PrizeDrawResult,
    PrizeId,
    PrizeInput,
    PrizePatch,
    PrizeWinnerView,
    StoreError,
    WinnerId,
};

pub async fn create_prize(
    state: &AppState,
    scope: EventScope,
    mut input: PrizeInput,
) -> Result<Prize, AppError> {
    input.name = normalize_optional_text(Some(input.name))
        .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?;
    if input.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }
    let prize = state.prize_repo.create_prize(scope, input).await?;
    info!(prize = %prize.id, name = %prize.name, quantity = prize.quantity, "prize created");
    Ok(prize)
}

pub async fn update_prize(
    state: &AppState,
    scope: EventScope,
    id: PrizeId,
    mut patch: PrizePatch,
) -> Result<Prize, AppError> {
    if let Some(name) = patch.name.take() {
        patch.name = Some(
            normalize_optional_text(Some(name))
                .ok_or_else(|| AppError::BadRequest("name must not be empty".to_string()))?,
        );
    }
    if patch.quantity == Some(0) {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }
    let prize = state.prize_repo.update_prize(scope, id, patch).await?;
    info!(prize = %prize.id, quantity = prize.quantity, "prize updated");
    Ok(prize)
}

pub async fn delete_prize(
    state: &AppState,
    id: PrizeId,
    payload: ScopedRequest,
) -> Result<Prize, AppError> {
    let prize = state
        .prize_repo
        .delete_prize(EventScope::expecting(payload.event_id), id)
        .await?;
    info!(prize = %prize.id, "prize deleted");
    Ok(prize)
}

/// Picks one guest uniformly from the current eligible pool and records the
/// win. The store re-validates quantity and eligibility at insert time; a
/// guest who lost eligibility in between triggers a fresh selection.
pub async fn draw_prize(
    state: &AppState,
    id: PrizeId,
    payload: ScopedRequest,
) -> Result<PrizeDrawResult, AppError> {
    let scope = EventScope::expecting(payload.event_id);

    for attempt in 0..=state.config.draw_retry_limit {
        let pool = state.prize_repo.draw_pool(scope, id).await?;
        if pool.remaining == 0 {
            return Err(sold_out(state, &pool.prize));
        }
        let Some(guest_id) = pick_uniform(&pool.candidates) else {
            warn!(prize = %id, "draw found no eligible guests");
            return Err(AppError::NoEligibleGuests(format!(
                "no eligible guests for prize '{}'",
                pool.prize.name
            )));
        };

        match state.prize_repo.record_winner(scope, id, guest_id).await {
            Ok(result) => {
                state.metrics.record_draw();
                info!(
                    prize = %id,
                    guest = %guest_id,
                    remaining = result.remaining,
                    pool = pool.candidates.len(),
                    "prize drawn"
                );
                publish(state, BroadcastKind::PrizeDraw, &result);
                return Ok(result);
            }
            Err(StoreError::GuestIneligible) => {
                warn!(prize = %id, guest = %guest_id, attempt, "picked guest lost eligibility, reselecting");
            }
            Err(StoreError::SoldOut) => return Err(sold_out(state, &pool.prize)),
            Err(err) => return Err(err.into()),
        }
    }

    Err(AppError::Conflict(format!(
        "draw for prize {} kept losing races; treat as sold out",
        id
    )))
}

/// Collecting twice returns the existing collection without a second push.
pub async fn collect_prize(
    state: &AppState,
    operator: &OperatorIdentity,
    winner_id: WinnerId,
    payload: CollectPrizeRequest,
) -> Result<PrizeWinnerView, AppError> {
    let collected_by = normalize_optional_text(payload.collected_by_name)
        .unwrap_or_else(|| operator.name.clone());
    let outcome = state
        .prize_repo
        .collect_prize(EventScope::expecting(payload.event_id), winner_id, &collected_by)
        .await?;

    if outcome.newly_collected {
        info!(winner = %winner_id, by = %collected_by, "prize collected");
        publish(state, BroadcastKind::PrizeCollected, &outcome.winner);
    }
    Ok(outcome.winner)
}

pub async fn uncollect_prize(
    state: &AppState,
    winner_id: WinnerId,
    payload: ScopedRequest,
) -> Result<PrizeWinnerView, AppError> {
    let winner = state
        .prize_repo
        .uncollect_prize(EventScope::expecting(payload.event_id), winner_id)
        .await?;
    info!(winner = %winner_id, "prize collection undone");
    publish(state, BroadcastKind::PrizeUncollected, &winner);
    Ok(winner)
}

/// Deletes the winners of this prize only.
pub async fn reset_prize(
    state: &AppState,
    id: PrizeId,
    payload: ScopedRequest,
) -> Result<ResetResult, AppError> {
    let removed = state
        .prize_repo
        .reset_prize(EventScope::expecting(payload.event_id), id)
        .await?;
    info!(prize = %id, removed, "prize reset");
    publish(state, BroadcastKind::PrizeReset, &json!({ "prizeId": id, "removed": removed }));
    Ok(ResetResult { removed })
}

fn pick_uniform(candidates: &[Guest]) -> Option<GuestId> {
    candidates
        .choose(&mut rand::thread_rng())
        .map(|guest| guest.id)
}

fn sold_out(state: &AppState, prize: &Prize) -> AppError {
    state.metrics.record_sold_out();
    warn!(prize = %prize.id, quantity = prize.quantity, "prize sold out");
    AppError::SoldOut(format!("prize '{}' is sold out", prize.name))
}
