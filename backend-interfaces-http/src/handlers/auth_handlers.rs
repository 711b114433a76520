use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::auth_commands;
use backend_application::queries::operator_queries;
use backend_application::AppState;
use backend_domain::{LoginRequest, LoginResponse, Operator, OperatorIdentity, OperatorInput};

use crate::error::HttpError;
use crate::middleware::require_operator;

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let response = auth_commands::login(&state, payload).await?;
    Ok(Json(response))
}

/// Echoes the resolved identity, counter override included.
pub async fn whoami(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OperatorIdentity>, HttpError> {
    let identity = require_operator(&state, &headers).await?;
    Ok(Json(identity))
}

pub async fn list_operators(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Operator>>, HttpError> {
    require_operator(&state, &headers).await?;
    let operators = operator_queries::list_operators(&state).await?;
    Ok(Json(operators))
}

pub async fn create_operator(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<OperatorInput>,
) -> Result<Json<Operator>, HttpError> {
    require_operator(&state, &headers).await?;
    let operator = auth_commands::create_operator(&state, payload).await?;
    Ok(Json(operator))
}
