use crate::dtos::GuestDetail;
use crate::{AppError, AppState};
use backend_domain::{
    normalize_optional_text,
    EventScope,
    Guest,
    GuestId,
    GuestListQuery,
    GuestView,
    OperatorIdentity,
};

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 200;

pub async fn list_guests(state: &AppState, query: GuestListQuery) -> Result<Vec<Guest>, AppError> {
    let guests = state.guest_repo.list_guests(EventScope::active(), query).await?;
    Ok(guests)
}

/// Matches external code, name or phone within the active event.
pub async fn search_guests(
    state: &AppState,
    query: Option<String>,
    limit: Option<usize>,
) -> Result<Vec<Guest>, AppError> {
    let query = normalize_optional_text(query)
        .ok_or_else(|| AppError::BadRequest("q must not be empty".to_string()))?;
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
    let guests = state
        .guest_repo
        .search_guests(EventScope::active(), &query, limit)
        .await?;
    Ok(guests)
}

pub async fn get_guest_detail(
    state: &AppState,
    viewer: Option<&OperatorIdentity>,
    id: GuestId,
) -> Result<GuestDetail, AppError> {
    let scope = EventScope::active();
    let ledger = state.guest_repo.guest_ledger(scope, id).await?;
    let souvenir_takes = state.souvenir_repo.guest_takes(scope, id).await?;
    Ok(GuestDetail {
        view: GuestView::new(ledger.guest, ledger.checkins, viewer.map(|identity| identity.id)),
        reversals: ledger.reversals,
        souvenir_takes,
    })
}
