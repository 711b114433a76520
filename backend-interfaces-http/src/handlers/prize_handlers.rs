use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::prize_commands;
use backend_application::dtos::{CollectPrizeRequest, EligiblePool, ResetResult, ScopedRequest};
use backend_application::queries::prize_queries;
use backend_application::AppState;
use backend_domain::{
    EventScope,
    Prize,
    PrizeDrawResult,
    PrizeId,
    PrizeInput,
    PrizePatch,
    PrizeSummary,
    PrizeWinnerView,
    WinnerId,
};

use crate::error::HttpError;
use crate::middleware::require_operator;

pub async fn list_prizes(State(state): State<AppState>) -> Result<Json<Vec<PrizeSummary>>, HttpError> {
    let prizes = prize_queries::list_prizes(&state).await?;
    Ok(Json(prizes))
}

pub async fn get_prize(
    State(state): State<AppState>,
    Path(id): Path<PrizeId>,
) -> Result<Json<PrizeSummary>, HttpError> {
    let prize = prize_queries::get_prize(&state, id).await?;
    Ok(Json(prize))
}

pub async fn list_winners(
    State(state): State<AppState>,
    Path(id): Path<PrizeId>,
) -> Result<Json<Vec<PrizeWinnerView>>, HttpError> {
    let winners = prize_queries::list_winners(&state, id).await?;
    Ok(Json(winners))
}

pub async fn eligible_pool(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<PrizeId>,
) -> Result<Json<EligiblePool>, HttpError> {
    require_operator(&state, &headers).await?;
    let pool = prize_queries::eligible_pool(&state, id).await?;
    Ok(Json(pool))
}

pub async fn create_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(scope): Query<ScopedRequest>,
    Json(payload): Json<PrizeInput>,
) -> Result<Json<Prize>, HttpError> {
    require_operator(&state, &headers).await?;
    let prize =
        prize_commands::create_prize(&state, EventScope::expecting(scope.event_id), payload).await?;
    Ok(Json(prize))
}

pub async fn update_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<PrizeId>,
    Query(scope): Query<ScopedRequest>,
    Json(payload): Json<PrizePatch>,
) -> Result<Json<Prize>, HttpError> {
    require_operator(&state, &headers).await?;
    let prize =
        prize_commands::update_prize(&state, EventScope::expecting(scope.event_id), id, payload).await?;
    Ok(Json(prize))
}

pub async fn delete_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<PrizeId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<Prize>, HttpError> {
    require_operator(&state, &headers).await?;
    let prize = prize_commands::delete_prize(&state, id, scope).await?;
    Ok(Json(prize))
}

pub async fn draw_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<PrizeId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<PrizeDrawResult>, HttpError> {
    require_operator(&state, &headers).await?;
    let result = prize_commands::draw_prize(&state, id, scope).await?;
    Ok(Json(result))
}

pub async fn reset_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<PrizeId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<ResetResult>, HttpError> {
    require_operator(&state, &headers).await?;
    let result = prize_commands::reset_prize(&state, id, scope).await?;
    Ok(Json(result))
}

pub async fn collect_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(winner_id): Path<WinnerId>,
    Json(payload): Json<CollectPrizeRequest>,
) -> Result<Json<PrizeWinnerView>, HttpError> {
    let operator = require_operator(&state, &headers).await?;
    let winner = prize_commands::collect_prize(&state, &operator, winner_id, payload).await?;
    Ok(Json(winner))
}

pub async fn uncollect_prize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(winner_id): Path<WinnerId>,
    Query(scope): Query<ScopedRequest>,
) -> Result<Json<PrizeWinnerView>, HttpError> {
    require_operator(&state, &headers).await?;
    let winner = prize_commands::uncollect_prize(&state, winner_id, scope).await?;
    Ok(Json(winner))
}
