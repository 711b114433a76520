use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::error;

use backend_application::AppError;

/// Every failure leaves as JSON `{ "error": <code>, "message": <text>, ...context }`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
    context: Map<String, Value>,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            context: Map::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Unauthorized(message) => HttpError::unauthorized(message),
            AppError::BadRequest(message) => HttpError::bad_request(message),
            AppError::NotFound(message) => HttpError::new(StatusCode::NOT_FOUND, "not_found", message),
            AppError::SoldOut(message) => HttpError::new(StatusCode::CONFLICT, "sold_out", message),
            AppError::NoEligibleGuests(message) => {
                HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, "no_eligible_guests", message)
            }
            AppError::AlreadyTaken { guest, history } => HttpError::new(
                StatusCode::CONFLICT,
                "already_taken",
                "souvenir already taken by this guest",
            )
            .with("guest", json!(guest))
            .with("history", json!(history)),
            AppError::Precondition(message) => {
                HttpError::new(StatusCode::PRECONDITION_FAILED, "precondition_failed", message)
            }
            AppError::StaleEvent { expected, active } => HttpError::new(
                StatusCode::CONFLICT,
                "stale_event",
                format!("event {} is no longer active (active event is {})", expected, active),
            )
            .with("expectedEventId", json!(expected))
            .with("activeEventId", json!(active)),
            AppError::Conflict(message) => HttpError::new(StatusCode::CONFLICT, "conflict", message),
            AppError::Internal(err) => {
                error!("internal error: {:#}", err);
                HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error")
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut body = self.context;
        body.insert("error".to_string(), Value::String(self.code.to_string()));
        body.insert("message".to_string(), Value::String(self.message));
        (self.status, Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::EventId;

    #[test]
    fn app_errors_map_to_statuses() {
        let cases = [
            (AppError::Unauthorized("x".to_string()), StatusCode::UNAUTHORIZED),
            (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (AppError::SoldOut("x".to_string()), StatusCode::CONFLICT),
            (AppError::NoEligibleGuests("x".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Precondition("x".to_string()), StatusCode::PRECONDITION_FAILED),
            (AppError::Conflict("x".to_string()), StatusCode::CONFLICT),
            (
                AppError::Internal(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status(), status);
        }
    }

    #[test]
    fn stale_event_carries_both_event_ids() {
        let err = HttpError::from(AppError::StaleEvent {
            expected: EventId(1),
            active: EventId(2),
        });
        assert_eq!(err.code(), "stale_event");
        assert_eq!(err.context["expectedEventId"], json!(1));
        assert_eq!(err.context["activeEventId"], json!(2));
    }
}
