use axum::http::HeaderMap;

use backend_application::commands::auth_commands;
use backend_application::AppState;
use backend_domain::{normalize_optional_text, OperatorIdentity};

use crate::HttpError;

pub const COUNTER_HEADER: &str = "x-counter-name";

/// Admin routes: a valid bearer session is mandatory.
pub async fn require_operator(state: &AppState, headers: &HeaderMap) -> Result<OperatorIdentity, HttpError> {
    optional_operator(state, headers)
        .await?
        .ok_or_else(|| HttpError::unauthorized("missing bearer token"))
}

/// Check-in routes: anonymous callers pass, but a token that is present must be valid.
pub async fn optional_operator(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<OperatorIdentity>, HttpError> {
    let Some(token) = extract_bearer(headers) else {
        return Ok(None);
    };
    let mut identity = auth_commands::authenticate(state, &token).await?;
    if let Some(counter) = counter_override(headers) {
        identity.counter_name = Some(counter);
    }
    Ok(Some(identity))
}

pub fn counter_override(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(COUNTER_HEADER)?.to_str().ok()?;
    normalize_optional_text(Some(value.to_string()))
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
