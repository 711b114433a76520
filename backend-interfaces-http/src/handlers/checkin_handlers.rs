use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use backend_application::commands::checkin_commands;
use backend_application::dtos::{
    CheckinContext,
    CodeCheckinRequest,
    LookupCheckinRequest,
    QrCheckinRequest,
    UncheckinRequest,
};
use backend_application::AppState;
use backend_domain::{GuestId, GuestView};

use crate::error::HttpError;
use crate::middleware::{optional_operator, require_operator};

/// A duplicate admission is not an error, but terminals key off the 409.
pub fn admission_response(view: GuestView) -> Response {
    let status = if view.duplicate {
        StatusCode::CONFLICT
    } else {
        StatusCode::OK
    };
    (status, Json(view)).into_response()
}

pub async fn checkin_by_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CodeCheckinRequest>,
) -> Result<Response, HttpError> {
    let operator = optional_operator(&state, &headers).await?;
    let view = checkin_commands::checkin_by_code(&state, operator.as_ref(), payload).await?;
    Ok(admission_response(view))
}

pub async fn checkin_by_guest_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(guest_id): Path<GuestId>,
    Json(context): Json<CheckinContext>,
) -> Result<Response, HttpError> {
    let operator = optional_operator(&state, &headers).await?;
    let view =
        checkin_commands::checkin_by_guest_id(&state, operator.as_ref(), guest_id, context).await?;
    Ok(admission_response(view))
}

pub async fn checkin_by_qr(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<QrCheckinRequest>,
) -> Result<Response, HttpError> {
    let operator = optional_operator(&state, &headers).await?;
    let view = checkin_commands::checkin_by_qr(&state, operator.as_ref(), payload).await?;
    Ok(admission_response(view))
}

pub async fn checkin_by_lookup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LookupCheckinRequest>,
) -> Result<Response, HttpError> {
    let operator = optional_operator(&state, &headers).await?;
    let outcome = checkin_commands::checkin_by_lookup(&state, operator.as_ref(), payload).await?;
    Ok(Json(outcome).into_response())
}

pub async fn uncheckin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(guest_id): Path<GuestId>,
    Json(payload): Json<UncheckinRequest>,
) -> Result<Json<GuestView>, HttpError> {
    let operator = require_operator(&state, &headers).await?;
    let view = checkin_commands::uncheckin(&state, &operator, guest_id, payload).await?;
    Ok(Json(view))
}
