use crate::{AppError, AppState};
use backend_domain::{EventScope, GuestId, SouvenirId, SouvenirSummary, SouvenirTakeView};

pub async fn list_souvenirs(state: &AppState) -> Result<Vec<SouvenirSummary>, AppError> {
    Ok(state.souvenir_repo.list_souvenirs(EventScope::active()).await?)
}

pub async fn get_souvenir(state: &AppState, id: SouvenirId) -> Result<SouvenirSummary, AppError> {
    Ok(state.souvenir_repo.get_souvenir(EventScope::active(), id).await?)
}

pub async fn guest_takes(state: &AppState, guest_id: GuestId) -> Result<Vec<SouvenirTakeView>, AppError> {
    Ok(state.souvenir_repo.guest_takes(EventScope::active(), guest_id).await?)
}
