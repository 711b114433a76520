use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use backend_application::commands::display_commands;
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::require_operator;

pub async fn publish_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, HttpError> {
    require_operator(&state, &headers).await?;
    let delivered = display_commands::publish_preview(&state, payload)?;
    Ok(Json(json!({ "delivered": delivered })))
}
