use crate::dtos::EligiblePool;
use crate::{AppError, AppState};
use backend_domain::{EventScope, PrizeId, PrizeSummary, PrizeWinnerView};

pub async fn list_prizes(state: &AppState) -> Result<Vec<PrizeSummary>, AppError> {
    Ok(state.prize_repo.list_prizes(EventScope::active()).await?)
}

pub async fn get_prize(state: &AppState, id: PrizeId) -> Result<PrizeSummary, AppError> {
    Ok(state.prize_repo.get_prize(EventScope::active(), id).await?)
}

pub async fn list_winners(state: &AppState, id: PrizeId) -> Result<Vec<PrizeWinnerView>, AppError> {
    Ok(state.prize_repo.list_winners(EventScope::active(), id).await?)
}

/// Who a draw would pick from right now. Read live, never cached.
pub async fn eligible_pool(state: &AppState, id: PrizeId) -> Result<EligiblePool, AppError> {
    let pool = state.prize_repo.draw_pool(EventScope::active(), id).await?;
    Ok(EligiblePool {
        remaining: pool.remaining,
        count: pool.candidates.len(),
        candidates: pool.candidates,
    })
}
